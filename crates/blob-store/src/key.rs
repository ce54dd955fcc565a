//! Validated blob names.

use std::fmt;

/// Longest accepted blob key, in bytes.
pub const BLOB_KEY_MAX_LEN: usize = 128;

/// Validation errors for [`BlobKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlobKeyError {
    /// The key was empty.
    Empty,
    /// The key exceeded [`BLOB_KEY_MAX_LEN`] bytes.
    TooLong {
        /// Length of the rejected key.
        len: usize,
    },
    /// The key started with a dot, which is reserved for temporary files.
    Hidden,
    /// The key contained a character outside `[A-Za-z0-9_.-]`.
    InvalidCharacter {
        /// The first offending character.
        character: char,
    },
}

impl fmt::Display for BlobKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "blob key must not be empty"),
            Self::TooLong { len } => write!(
                f,
                "blob key is {len} bytes long; the limit is {BLOB_KEY_MAX_LEN}"
            ),
            Self::Hidden => write!(f, "blob key must not start with '.'"),
            Self::InvalidCharacter { character } => {
                write!(f, "blob key contains unsupported character {character:?}")
            }
        }
    }
}

impl std::error::Error for BlobKeyError {}

/// Name of a blob inside a [`crate::BlobStore`].
///
/// Keys double as file names, so they are restricted to ASCII letters,
/// digits, `_`, `-` and `.`, and may not start with `.`.
///
/// # Example
///
/// ```
/// use blob_store::{BlobKey, BlobKeyError};
///
/// assert!(BlobKey::new("cosevif_qr_scans").is_ok());
/// assert_eq!(BlobKey::new("../etc"), Err(BlobKeyError::Hidden));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    /// Validate and construct a key.
    ///
    /// # Errors
    ///
    /// Returns a [`BlobKeyError`] describing the first rule the input breaks.
    pub fn new(key: impl Into<String>) -> Result<Self, BlobKeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(BlobKeyError::Empty);
        }
        if key.len() > BLOB_KEY_MAX_LEN {
            return Err(BlobKeyError::TooLong { len: key.len() });
        }
        if key.starts_with('.') {
            return Err(BlobKeyError::Hidden);
        }
        if let Some(character) = key
            .chars()
            .find(|ch| !(ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.')))
        {
            return Err(BlobKeyError::InvalidCharacter { character });
        }
        Ok(Self(key))
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for BlobKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for BlobKey {
    type Error = BlobKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("cosevif_qr_scans")]
    #[case("ledger-v1.json")]
    #[case("A")]
    fn accepts_file_safe_names(#[case] raw: &str) {
        let key = BlobKey::new(raw).expect("key should be accepted");
        assert_eq!(key.as_str(), raw);
    }

    #[rstest]
    #[case("", BlobKeyError::Empty)]
    #[case(".hidden", BlobKeyError::Hidden)]
    #[case("a/b", BlobKeyError::InvalidCharacter { character: '/' })]
    #[case("scans ledger", BlobKeyError::InvalidCharacter { character: ' ' })]
    #[case("lópez", BlobKeyError::InvalidCharacter { character: 'ó' })]
    fn rejects_unsafe_names(#[case] raw: &str, #[case] expected: BlobKeyError) {
        assert_eq!(BlobKey::new(raw), Err(expected));
    }

    #[test]
    fn rejects_overlong_names() {
        let raw = "k".repeat(BLOB_KEY_MAX_LEN + 1);
        assert_eq!(
            BlobKey::new(raw),
            Err(BlobKeyError::TooLong {
                len: BLOB_KEY_MAX_LEN + 1
            })
        );
    }
}
