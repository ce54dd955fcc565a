//! Visit rows as listed by the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// A visit row from the backend's visit list.
///
/// The row is kept as the JSON the backend sent. Only a string `qrCode` is
/// interpreted; rows without one, or with a value of another type, are
/// carried through untouched so list screens keep whatever the backend sent.
///
/// # Example
///
/// ```
/// use gate::domain::VisitSummary;
///
/// let row: VisitSummary = serde_json::from_str(
///     r#"{"id": 7, "qrCode": "12-ana-lópez", "status": 3}"#,
/// )
/// .expect("any JSON row is accepted");
/// assert_eq!(row.qr_code(), Some("12-ana-lópez"));
/// assert_eq!(row.status(), None);
/// assert_eq!(row.as_value()["id"], 7);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitSummary(Value);

impl VisitSummary {
    /// A row carrying only a ledger key and status.
    pub fn new(qr_code: impl Into<String>, status: impl Into<String>) -> Self {
        Self(json!({ "qrCode": qr_code.into(), "status": status.into() }))
    }

    /// Ledger key of the visit, when the row carries a string `qrCode`.
    pub fn qr_code(&self) -> Option<&str> {
        self.0.get("qrCode").and_then(Value::as_str)
    }

    /// Progress status, when the row carries a string `status`.
    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    /// Scan count, when the row carries a non-negative integer `scanCount`.
    pub fn scan_count(&self) -> Option<u64> {
        self.0.get("scanCount").and_then(Value::as_u64)
    }

    /// Overwrite `status` and `scanCount`. Rows that are not JSON objects are
    /// left as they are.
    pub fn set_progress(&mut self, status: &str, scan_count: u32) {
        if let Value::Object(row) = &mut self.0 {
            row.insert("status".to_owned(), Value::from(status));
            row.insert("scanCount".to_owned(), Value::from(scan_count));
        }
    }

    /// The row's fields, when it is a JSON object.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    /// The row as sent by the backend, plus any progress written onto it.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwrap the row.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for VisitSummary {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
