//! Table-driven mapping from (domain, wholesaler) to a domain processor.
//!
//! Resolved once per request; no call site branches on the wholesaler.

use std::collections::HashMap;
use std::sync::Arc;

use innkeep_core::bulk::{ServiceKind, Wholesaler, SUPPORTED_ROUTES};
use innkeep_db::DbPool;

use crate::error::RouteError;
use crate::processor::{DomainProcessor, StagingProcessor};

#[derive(Default, Clone)]
pub struct WholesalerRouter {
    routes: HashMap<(ServiceKind, Wholesaler), Arc<dyn DomainProcessor>>,
}

impl WholesalerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the processor for one pair.
    pub fn with(
        mut self,
        service_kind: ServiceKind,
        wholesaler: Wholesaler,
        processor: Arc<dyn DomainProcessor>,
    ) -> Self {
        self.routes.insert((service_kind, wholesaler), processor);
        self
    }

    /// Register a processor for every pair in [`SUPPORTED_ROUTES`].
    pub fn supported<F>(make: F) -> Self
    where
        F: Fn(ServiceKind, Wholesaler) -> Arc<dyn DomainProcessor>,
    {
        SUPPORTED_ROUTES
            .iter()
            .flat_map(|(kind, wholesalers)| wholesalers.iter().map(move |w| (*kind, *w)))
            .fold(Self::new(), |router, (kind, w)| router.with(kind, w, make(kind, w)))
    }

    /// Production wiring: a [`StagingProcessor`] per supported pair.
    pub fn staging(pool: &DbPool) -> Self {
        Self::supported(|kind, w| -> Arc<dyn DomainProcessor> {
            Arc::new(StagingProcessor::new(pool.clone(), kind, w))
        })
    }

    pub fn resolve(
        &self,
        service_kind: ServiceKind,
        wholesaler: Wholesaler,
    ) -> Result<Arc<dyn DomainProcessor>, RouteError> {
        self.routes
            .get(&(service_kind, wholesaler))
            .cloned()
            .ok_or(RouteError::Unsupported {
                service_kind,
                wholesaler,
            })
    }

    /// Parse the raw `x-wholesaler-id` header value and resolve it.
    pub fn resolve_header(
        &self,
        service_kind: ServiceKind,
        header: Option<&str>,
    ) -> Result<(Wholesaler, Arc<dyn DomainProcessor>), RouteError> {
        let raw = header
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(RouteError::MissingHeader)?;
        let wholesaler = Wholesaler::parse_header(raw).map_err(RouteError::UnknownWholesaler)?;
        let processor = self.resolve(service_kind, wholesaler)?;
        Ok((wholesaler, processor))
    }

    /// Registered pairs, sorted.
    pub fn routes(&self) -> Vec<(ServiceKind, Wholesaler)> {
        let mut pairs: Vec<_> = self.routes.keys().copied().collect();
        pairs.sort();
        pairs
    }
}

impl std::fmt::Debug for WholesalerRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WholesalerRouter")
            .field("routes", &self.routes())
            .finish()
    }
}
