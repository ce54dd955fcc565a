//! Stable identifier linking a printed visit code to its ledger entry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors for [`QrCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrCodeValidationError {
    /// The identifier was empty or whitespace.
    Empty,
}

impl fmt::Display for QrCodeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "qr code must not be empty"),
        }
    }
}

impl std::error::Error for QrCodeValidationError {}

/// Identifier of a visit's QR code, used as the ledger key.
///
/// Structured payloads may carry their own identifier, which is kept
/// verbatim. Otherwise the identifier is derived from the house and visitor
/// name with [`QrCode::derive`], which must stay byte-for-byte stable so
/// repeated scans of the same printed code hit the same ledger entry.
///
/// # Example
///
/// ```
/// use gate::domain::QrCode;
///
/// let code = QrCode::derive("12", "Ana López");
/// assert_eq!(code.as_ref(), "12-ana-lópez");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QrCode(String);

impl QrCode {
    /// Validate and wrap an identifier supplied by a payload or caller.
    ///
    /// # Errors
    ///
    /// Returns [`QrCodeValidationError::Empty`] for blank input.
    pub fn new(raw: impl Into<String>) -> Result<Self, QrCodeValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(QrCodeValidationError::Empty);
        }
        Ok(Self(raw))
    }

    /// Derive the identifier for a labeled payload.
    ///
    /// Joins `house_id` and `visitor_name` with `-`, collapses every run of
    /// whitespace into a single `-` and lower-cases the result. Whitespace is
    /// Unicode `White_Space` without U+0085, plus the byte-order mark U+FEFF.
    pub fn derive(house_id: &str, visitor_name: &str) -> Self {
        let joined = format!("{house_id}-{visitor_name}");
        let mut collapsed = String::with_capacity(joined.len());
        let mut in_whitespace = false;
        for ch in joined.chars() {
            if is_pass_whitespace(ch) {
                if !in_whitespace {
                    collapsed.push('-');
                }
                in_whitespace = true;
            } else {
                collapsed.push(ch);
                in_whitespace = false;
            }
        }
        Self(collapsed.to_lowercase())
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Whitespace as the pass generator sees it.
///
/// Unicode `White_Space` without U+0085, plus the byte-order mark U+FEFF.
/// Keys minted for the same visit by other clients depend on this set.
pub(crate) fn is_pass_whitespace(ch: char) -> bool {
    (ch.is_whitespace() && ch != '\u{85}') || ch == '\u{feff}'
}

impl AsRef<str> for QrCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for QrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<QrCode> for String {
    fn from(value: QrCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for QrCode {
    type Error = QrCodeValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for QrCode {
    type Err = QrCodeValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}
