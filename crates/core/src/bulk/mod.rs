//! Bulk-ingestion vocabulary: which domain a batch targets, how it changes
//! existing data, and which upstream wholesaler sent it.

pub mod rows;
pub mod validation;

use serde::{Deserialize, Serialize};

pub use rows::{BulkBatch, PlanRow, PriceRow, RoomRow, StockRow};
pub use validation::{validate_payload, BatchViolations, FieldViolation, PayloadError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Service kind strings as stored in `bulk_activity_logs.service_kind`.
pub const SERVICE_ROOM: &str = "ROOM";
pub const SERVICE_PLAN: &str = "PLAN";
pub const SERVICE_PRICE: &str = "PRICE";
pub const SERVICE_STOCK: &str = "STOCK";

/// All valid service kind strings.
pub const VALID_SERVICE_KINDS: &[&str] = &[SERVICE_ROOM, SERVICE_PLAN, SERVICE_PRICE, SERVICE_STOCK];

/// Change type strings as stored in `bulk_activity_logs.change_type`.
pub const CHANGE_MASTER: &str = "Master";
pub const CHANGE_DIFFERENTIAL: &str = "Differential";

// ---------------------------------------------------------------------------
// ServiceKind
// ---------------------------------------------------------------------------

/// The business domain a bulk batch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceKind {
    Room,
    Plan,
    Price,
    Stock,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [Self::Room, Self::Plan, Self::Price, Self::Stock];

    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            SERVICE_ROOM => Ok(Self::Room),
            SERVICE_PLAN => Ok(Self::Plan),
            SERVICE_PRICE => Ok(Self::Price),
            SERVICE_STOCK => Ok(Self::Stock),
            _ => Err(format!(
                "Invalid service kind '{s}'. Must be one of: {}",
                VALID_SERVICE_KINDS.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Room => SERVICE_ROOM,
            Self::Plan => SERVICE_PLAN,
            Self::Price => SERVICE_PRICE,
            Self::Stock => SERVICE_STOCK,
        }
    }

    /// Room and plan feeds are full masters; price and stock feeds are deltas.
    pub fn change_type(&self) -> ChangeType {
        match self {
            Self::Room | Self::Plan => ChangeType::Master,
            Self::Price | Self::Stock => ChangeType::Differential,
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChangeType
// ---------------------------------------------------------------------------

/// Whether a batch replaces the wholesaler's data set or patches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Master,
    Differential,
}

impl ChangeType {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            CHANGE_MASTER => Ok(Self::Master),
            CHANGE_DIFFERENTIAL => Ok(Self::Differential),
            _ => Err(format!(
                "Invalid change type '{s}'. Must be one of: {CHANGE_MASTER}, {CHANGE_DIFFERENTIAL}"
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => CHANGE_MASTER,
            Self::Differential => CHANGE_DIFFERENTIAL,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Wholesaler
// ---------------------------------------------------------------------------

/// Upstream wholesaler whose feed is being ingested.
///
/// The discriminant is the id sent in the `x-wholesaler-id` header and
/// stored in `bulk_activity_logs.wholesaler_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wholesaler {
    Tl = 1,
    Temairazu = 2,
    Neppan = 3,
    Rakutsu = 4,
    Beds24 = 5,
}

impl Wholesaler {
    pub const ALL: [Wholesaler; 5] = [
        Self::Tl,
        Self::Temairazu,
        Self::Neppan,
        Self::Rakutsu,
        Self::Beds24,
    ];

    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tl => "tl",
            Self::Temairazu => "temairazu",
            Self::Neppan => "neppan",
            Self::Rakutsu => "rakutsu",
            Self::Beds24 => "beds24",
        }
    }

    /// Parse a header value: either the numeric id or the case-insensitive name.
    pub fn parse_header(value: &str) -> Result<Self, String> {
        let value = value.trim();
        let found = match value.parse::<i16>() {
            Ok(id) => Self::from_id(id),
            Err(_) => Self::ALL
                .into_iter()
                .find(|w| w.name().eq_ignore_ascii_case(value)),
        };
        found.ok_or_else(|| format!("Unknown wholesaler '{value}'"))
    }

    /// Whether this wholesaler feeds the given domain.
    pub fn supports(&self, kind: ServiceKind) -> bool {
        supported_wholesalers(kind).contains(self)
    }
}

impl std::fmt::Display for Wholesaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which wholesalers feed which domain. Price ingestion is the narrowest.
pub const SUPPORTED_ROUTES: &[(ServiceKind, &[Wholesaler])] = &[
    (
        ServiceKind::Room,
        &[Wholesaler::Tl, Wholesaler::Temairazu, Wholesaler::Neppan, Wholesaler::Rakutsu],
    ),
    (
        ServiceKind::Plan,
        &[Wholesaler::Tl, Wholesaler::Temairazu, Wholesaler::Neppan, Wholesaler::Rakutsu],
    ),
    (ServiceKind::Price, &[Wholesaler::Tl, Wholesaler::Temairazu]),
    (
        ServiceKind::Stock,
        &[Wholesaler::Tl, Wholesaler::Temairazu, Wholesaler::Neppan],
    ),
];

/// Wholesalers supported for one domain.
pub fn supported_wholesalers(kind: ServiceKind) -> &'static [Wholesaler] {
    SUPPORTED_ROUTES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, ws)| *ws)
        .unwrap_or(&[])
}
