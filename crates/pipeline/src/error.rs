use innkeep_core::bulk::{PayloadError, ServiceKind, Wholesaler};

/// Failure of the activity-log store itself.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Activity log store unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a domain processor.
///
/// The `Display` text is stored verbatim in the record's `error_message`.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl ProcessError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// The wholesaler header could not be mapped to a processor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("Missing x-wholesaler-id header")]
    MissingHeader,

    #[error("{0}")]
    UnknownWholesaler(String),

    #[error("Wholesaler '{wholesaler}' is not supported for {service_kind} ingestion")]
    Unsupported {
        service_kind: ServiceKind,
        wholesaler: Wholesaler,
    },
}

/// Why a batch was refused before any background work started.
#[derive(Debug, thiserror::Error)]
pub enum AcceptError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// The audit record could not be opened; no job was spawned.
    #[error("Failed to open activity log: {0}")]
    Acceptance(#[source] StoreError),
}
