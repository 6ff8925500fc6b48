//! Payload validator: pure structural validation of an inbound batch.
//!
//! Every element is checked and every violation is reported, keyed by the
//! element's index in the submitted array. Feeds routinely carry hundreds of
//! rows, so the caller gets the complete list in one response.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use super::rows::{BulkBatch, PlanRow, PriceRow, RoomRow, StockRow};
use super::ServiceKind;

/// Field name used for violations that concern the whole element.
pub const ELEMENT_FIELD: &str = "element";

// ---------------------------------------------------------------------------
// Violation types
// ---------------------------------------------------------------------------

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// All violations in a batch, keyed by element index.
///
/// Serializes as a JSON object whose keys are the stringified indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchViolations(BTreeMap<usize, Vec<FieldViolation>>);

impl BatchViolations {
    pub fn push(&mut self, index: usize, violation: FieldViolation) {
        self.0.entry(index).or_default().push(violation);
    }

    pub fn extend(&mut self, index: usize, violations: impl IntoIterator<Item = FieldViolation>) {
        self.0.entry(index).or_default().extend(violations);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of offending elements.
    pub fn element_count(&self) -> usize {
        self.0.len()
    }

    /// Number of individual violations across all elements.
    pub fn violation_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn get(&self, index: usize) -> Option<&[FieldViolation]> {
        self.0.get(&index).map(Vec::as_slice)
    }

    pub fn indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.keys().copied()
    }
}

impl std::fmt::Display for BatchViolations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} violation(s) in {} element(s)",
            self.violation_count(),
            self.element_count()
        )
    }
}

/// Why a payload was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    /// The body could not be read as a JSON array at all.
    #[error("Malformed payload: {0}")]
    Malformed(String),

    /// The body parsed but one or more elements broke field constraints.
    #[error("Payload failed validation: {0}")]
    Invalid(BatchViolations),
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a raw request body as a batch for `kind`.
///
/// An empty array is valid and yields an empty batch.
pub fn validate_payload(kind: ServiceKind, raw: &[u8]) -> Result<BulkBatch, PayloadError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| PayloadError::Malformed(format!("body is not valid JSON: {e}")))?;

    let Value::Array(elements) = value else {
        return Err(PayloadError::Malformed(format!(
            "body must be a JSON array of {kind} rows"
        )));
    };

    match kind {
        ServiceKind::Room => decode_rows::<RoomRow>(elements).map(BulkBatch::Room),
        ServiceKind::Plan => decode_rows::<PlanRow>(elements).map(BulkBatch::Plan),
        ServiceKind::Price => decode_rows::<PriceRow>(elements).map(BulkBatch::Price),
        ServiceKind::Stock => decode_rows::<StockRow>(elements).map(BulkBatch::Stock),
    }
}

fn decode_rows<T>(elements: Vec<Value>) -> Result<Vec<T>, PayloadError>
where
    T: DeserializeOwned + Validate,
{
    let mut rows = Vec::with_capacity(elements.len());
    let mut violations = BatchViolations::default();

    for (index, element) in elements.into_iter().enumerate() {
        match decode_element::<T>(element) {
            Ok(row) => rows.push(row),
            Err(found) => violations.extend(index, found),
        }
    }

    if violations.is_empty() {
        Ok(rows)
    } else {
        Err(PayloadError::Invalid(violations))
    }
}

/// Decode and validate one object element.
///
/// When the object does not decode as a whole, each key is decoded on its
/// own so the offending fields are named. Those fields are dropped and the
/// remainder is still validated, so one bad value does not hide the
/// element's other violations.
fn decode_element<T>(element: Value) -> Result<T, Vec<FieldViolation>>
where
    T: DeserializeOwned + Validate,
{
    let Value::Object(mut fields) = element else {
        return Err(vec![FieldViolation::new(ELEMENT_FIELD, "type", "must be a JSON object")]);
    };

    if let Ok(row) = T::deserialize(&Value::Object(fields.clone())) {
        return match row.validate() {
            Ok(()) => Ok(row),
            Err(errors) => Err(field_violations(&errors)),
        };
    }

    let mut found = Vec::new();
    let mut mistyped = Vec::new();
    for (name, value) in &fields {
        let single = Map::from_iter([(name.clone(), value.clone())]);
        if let Err(e) = T::deserialize(&Value::Object(single)) {
            found.push(FieldViolation::new(name.clone(), "type", e.to_string()));
            mistyped.push(name.clone());
        }
    }
    for name in &mistyped {
        fields.remove(name);
    }

    match T::deserialize(&Value::Object(fields)) {
        Ok(row) => {
            if let Err(errors) = row.validate() {
                // A mistyped field was present; do not also call it missing.
                found.extend(
                    field_violations(&errors)
                        .into_iter()
                        .filter(|v| !(v.rule == "required" && mistyped.contains(&v.field))),
                );
            }
        }
        Err(e) => found.push(FieldViolation::new(ELEMENT_FIELD, "decode", e.to_string())),
    }
    found.sort();
    Err(found)
}

/// Flatten `validator` errors into sorted field violations.
fn field_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter()
                .map(move |e| FieldViolation::new(field.clone(), e.code.to_string(), describe(e)))
        })
        .collect();
    out.sort();
    out
}

fn describe(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let min = param(error, "min");
    let max = param(error, "max");

    match &*error.code {
        "required" => "is required".to_string(),
        "length" => match (min, max) {
            (Some(min), Some(max)) => format!("must be between {min} and {max} characters"),
            (Some(min), None) => format!("must be at least {min} characters"),
            (None, Some(max)) => format!("must be at most {max} characters"),
            (None, None) => "has an invalid length".to_string(),
        },
        "range" => match (min, max) {
            (Some(min), Some(max)) => format!("must be between {min} and {max}"),
            (Some(min), None) => format!("must be at least {min}"),
            (None, Some(max)) => format!("must be at most {max}"),
            (None, None) => "is out of range".to_string(),
        },
        "regex" => "must contain only letters, digits, '-' or '_'".to_string(),
        other => format!("failed the '{other}' check"),
    }
}

/// Render a numeric constraint parameter without a trailing `.0`.
fn param(error: &ValidationError, name: &str) -> Option<String> {
    let value = error.params.get(name)?;
    if let Some(i) = value.as_i64() {
        return Some(i.to_string());
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
        Some(f) => Some(f.to_string()),
        None => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn room(code: &str) -> Value {
        json!({
            "property_code": "HTL1",
            "room_code": code,
            "name": "Deluxe Twin",
            "capacity": 2
        })
    }

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn valid_rooms_decode_into_batch() {
        let batch = validate_payload(ServiceKind::Room, &body(json!([room("TW"), room("DB")]))).unwrap();
        assert_matches!(&batch, BulkBatch::Room(rows) if rows.len() == 2);
    }

    #[test]
    fn empty_array_is_valid() {
        let batch = validate_payload(ServiceKind::Price, b"[]").unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.service_kind(), ServiceKind::Price);
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert_matches!(
            validate_payload(ServiceKind::Room, b"{not json"),
            Err(PayloadError::Malformed(_))
        );
    }

    #[test]
    fn top_level_object_is_malformed() {
        let err = validate_payload(ServiceKind::Stock, &body(json!({"rows": []}))).unwrap_err();
        assert_matches!(err, PayloadError::Malformed(msg) if msg.contains("STOCK"));
    }

    #[test]
    fn missing_required_field_is_keyed_to_its_index() {
        let mut broken = room("SG");
        broken.as_object_mut().unwrap().remove("name");
        let payload = body(json!([room("TW"), broken, room("DB")]));

        let err = validate_payload(ServiceKind::Room, &payload).unwrap_err();
        let PayloadError::Invalid(violations) = err else {
            panic!("expected Invalid");
        };
        assert_eq!(violations.indexes().collect::<Vec<_>>(), vec![1]);
        let at_one = violations.get(1).unwrap();
        assert_eq!(at_one.len(), 1);
        assert_eq!(at_one[0].field, "name");
        assert_eq!(at_one[0].rule, "required");
        assert_eq!(at_one[0].message, "is required");
    }

    #[test]
    fn all_violations_are_reported_not_just_the_first() {
        let payload = body(json!([
            {"property_code": "bad code!", "room_code": "R1", "name": "", "capacity": 0},
            room("OK"),
            {"property_code": "HTL1", "room_code": "R3", "name": "x", "capacity": 99}
        ]));

        let PayloadError::Invalid(violations) = validate_payload(ServiceKind::Room, &payload).unwrap_err()
        else {
            panic!("expected Invalid");
        };

        assert_eq!(violations.indexes().collect::<Vec<_>>(), vec![0, 2]);
        let first: Vec<(&str, &str)> = violations
            .get(0)
            .unwrap()
            .iter()
            .map(|v| (v.field.as_str(), v.rule.as_str()))
            .collect();
        assert_eq!(
            first,
            vec![("capacity", "range"), ("name", "length"), ("property_code", "regex")]
        );
        assert_eq!(violations.get(2).unwrap()[0].field, "capacity");
        assert_eq!(violations.violation_count(), 4);
    }

    #[test]
    fn wrong_field_type_is_named_and_other_fields_still_checked() {
        let payload = body(json!([
            room("TW"),
            {"property_code": "HTL1", "room_code": "bad code!", "name": "x", "capacity": "two"}
        ]));

        let PayloadError::Invalid(violations) = validate_payload(ServiceKind::Room, &payload).unwrap_err()
        else {
            panic!("expected Invalid");
        };
        let at_one: Vec<(&str, &str)> = violations
            .get(1)
            .unwrap()
            .iter()
            .map(|v| (v.field.as_str(), v.rule.as_str()))
            .collect();
        assert_eq!(at_one, vec![("capacity", "type"), ("room_code", "regex")]);
    }

    #[test]
    fn bad_date_reports_every_violation_in_the_element() {
        let payload = body(json!([
            {"property_code": "HTL1", "date": "2026-02-30", "stock": -5}
        ]));

        let PayloadError::Invalid(violations) = validate_payload(ServiceKind::Stock, &payload).unwrap_err()
        else {
            panic!("expected Invalid");
        };
        let at_zero: Vec<(&str, &str)> = violations
            .get(0)
            .unwrap()
            .iter()
            .map(|v| (v.field.as_str(), v.rule.as_str()))
            .collect();
        assert_eq!(
            at_zero,
            vec![("date", "type"), ("room_code", "required"), ("stock", "range")]
        );
    }

    #[test]
    fn out_of_range_integer_is_a_type_violation_on_its_field() {
        let payload = body(json!([
            {"property_code": "HTL1", "room_code": "TW", "name": "x", "capacity": 3_000_000_000_i64}
        ]));

        let PayloadError::Invalid(violations) = validate_payload(ServiceKind::Room, &payload).unwrap_err()
        else {
            panic!("expected Invalid");
        };
        let at_zero = violations.get(0).unwrap();
        assert_eq!(at_zero.len(), 1);
        assert_eq!(at_zero[0].field, "capacity");
        assert_eq!(at_zero[0].rule, "type");
    }

    #[test]
    fn non_object_element_is_a_violation() {
        let PayloadError::Invalid(violations) =
            validate_payload(ServiceKind::Room, &body(json!([room("TW"), 42]))).unwrap_err()
        else {
            panic!("expected Invalid");
        };
        assert_eq!(violations.get(1).unwrap()[0].rule, "type");
    }

    #[test]
    fn price_rows_check_date_and_amount() {
        let payload = body(json!([
            {"property_code": "HTL1", "plan_code": "BB", "room_code": "TW",
             "date": "2026-10-19", "adult_count": 2, "amount": 15000},
            {"property_code": "HTL1", "plan_code": "BB", "room_code": "TW",
             "adult_count": 2, "amount": -1}
        ]));

        let PayloadError::Invalid(violations) = validate_payload(ServiceKind::Price, &payload).unwrap_err()
        else {
            panic!("expected Invalid");
        };
        let fields: Vec<&str> = violations.get(1).unwrap().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["amount", "date"]);
    }

    #[test]
    fn stock_rows_accept_optional_closed_flag() {
        let payload = body(json!([
            {"property_code": "HTL1", "room_code": "TW", "date": "2026-10-19", "stock": 3, "closed": true},
            {"property_code": "HTL1", "room_code": "TW", "date": "2026-10-20", "stock": 0}
        ]));
        let batch = validate_payload(ServiceKind::Stock, &payload).unwrap();
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn rejection_is_deterministic() {
        let payload = body(json!([
            {"room_code": "", "capacity": 500},
            {"property_code": "HTL1"}
        ]));
        let first = validate_payload(ServiceKind::Room, &payload).unwrap_err();
        for _ in 0..5 {
            assert_eq!(validate_payload(ServiceKind::Room, &payload).unwrap_err(), first);
        }
    }

    #[test]
    fn violations_serialize_keyed_by_index() {
        let mut violations = BatchViolations::default();
        violations.push(3, FieldViolation::new("name", "required", "is required"));
        let json = serde_json::to_value(&violations).unwrap();
        assert_eq!(json["3"][0]["field"], "name");
        assert_eq!(json["3"][0]["message"], "is required");
    }
}
