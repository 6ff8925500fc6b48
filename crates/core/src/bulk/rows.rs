//! Canonical row shapes for each bulk domain.
//!
//! Every field a wholesaler must send is an `Option` marked `required`, so a
//! missing field surfaces as a per-row violation rather than a decode error
//! that would reject the whole batch.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ServiceKind;

/// Property, room and plan codes: short ASCII identifiers.
pub static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("code pattern is a valid regex"));

/// One room master row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RoomRow {
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub property_code: Option<String>,
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub room_code: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(required, range(min = 1, max = 50))]
    pub capacity: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// One rate-plan master row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlanRow {
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub property_code: Option<String>,
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub plan_code: Option<String>,
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub room_code: Option<String>,
    #[validate(required, length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(required, range(min = 1, max = 365))]
    pub min_stay: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub meal_type: Option<String>,
}

/// One nightly price delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PriceRow {
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub property_code: Option<String>,
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub plan_code: Option<String>,
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub room_code: Option<String>,
    #[validate(required)]
    pub date: Option<NaiveDate>,
    #[validate(required, range(min = 1, max = 20))]
    pub adult_count: Option<i32>,
    #[validate(required, range(min = 0, max = 100_000_000))]
    pub amount: Option<i64>,
}

/// One nightly inventory delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StockRow {
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub property_code: Option<String>,
    #[validate(required, length(min = 1, max = 20), regex(path = *CODE_PATTERN))]
    pub room_code: Option<String>,
    #[validate(required)]
    pub date: Option<NaiveDate>,
    #[validate(required, range(min = 0, max = 9999))]
    pub stock: Option<i32>,
    #[serde(default)]
    pub closed: Option<bool>,
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn date_field(value: &Option<NaiveDate>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

impl RoomRow {
    pub fn property(&self) -> &str {
        field(&self.property_code)
    }

    pub fn entity_key(&self) -> String {
        field(&self.room_code).to_string()
    }
}

impl PlanRow {
    pub fn property(&self) -> &str {
        field(&self.property_code)
    }

    pub fn entity_key(&self) -> String {
        field(&self.plan_code).to_string()
    }
}

impl PriceRow {
    pub fn property(&self) -> &str {
        field(&self.property_code)
    }

    pub fn entity_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            field(&self.plan_code),
            field(&self.room_code),
            date_field(&self.date),
            self.adult_count.unwrap_or_default()
        )
    }
}

impl StockRow {
    pub fn property(&self) -> &str {
        field(&self.property_code)
    }

    pub fn entity_key(&self) -> String {
        format!("{}:{}", field(&self.room_code), date_field(&self.date))
    }
}

/// A validated, immutable batch for exactly one domain.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkBatch {
    Room(Vec<RoomRow>),
    Plan(Vec<PlanRow>),
    Price(Vec<PriceRow>),
    Stock(Vec<StockRow>),
}

impl BulkBatch {
    pub fn service_kind(&self) -> ServiceKind {
        match self {
            Self::Room(_) => ServiceKind::Room,
            Self::Plan(_) => ServiceKind::Plan,
            Self::Price(_) => ServiceKind::Price,
            Self::Stock(_) => ServiceKind::Stock,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Room(rows) => rows.len(),
            Self::Plan(rows) => rows.len(),
            Self::Price(rows) => rows.len(),
            Self::Stock(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct property codes touched by the batch, sorted.
    pub fn property_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = match self {
            Self::Room(rows) => rows.iter().map(|r| r.property().to_string()).collect(),
            Self::Plan(rows) => rows.iter().map(|r| r.property().to_string()).collect(),
            Self::Price(rows) => rows.iter().map(|r| r.property().to_string()).collect(),
            Self::Stock(rows) => rows.iter().map(|r| r.property().to_string()).collect(),
        };
        codes.sort();
        codes.dedup();
        codes
    }
}
