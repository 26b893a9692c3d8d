//! Keyset cursor codec.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

const SEPARATOR: char = ':';

/// Errors raised while decoding a client-supplied cursor token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The token is not valid base64.
    #[error("cursor is not valid base64")]
    InvalidEncoding,
    /// The decoded bytes are not UTF-8 text.
    #[error("cursor payload is not valid UTF-8")]
    InvalidUtf8,
    /// The payload lacks the `<sort_key>:<id>` separator.
    #[error("cursor payload is missing the key separator")]
    MissingSeparator,
    /// The sort key portion is not an integer.
    #[error("cursor sort key `{value}` is not an integer")]
    InvalidSortKey {
        /// Raw sort key text found in the payload.
        value: String,
    },
    /// The identifier portion is empty.
    #[error("cursor identifier must not be empty")]
    EmptyId,
}

/// Position of the last row delivered on a page.
///
/// Rows are assumed to be ordered by `(sort_key desc, id desc)`; the next page
/// starts strictly after this position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    /// Integral sort key of the last row, such as epoch microseconds.
    pub sort_key: i64,
    /// Identifier of the last row, used to break sort key ties.
    pub id: String,
}

impl Cursor {
    /// Build a cursor from a sort key and row identifier.
    pub fn new(sort_key: i64, id: impl Into<String>) -> Self {
        Self {
            sort_key,
            id: id.into(),
        }
    }

    /// Encode the cursor as an opaque base64 token.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::Cursor;
    ///
    /// let token = Cursor::new(42, "abc").encode();
    /// assert_eq!(token, "NDI6YWJj");
    /// ```
    #[must_use]
    pub fn encode(&self) -> String {
        STANDARD.encode(format!("{}{SEPARATOR}{}", self.sort_key, self.id))
    }

    /// Decode an opaque token produced by [`Cursor::encode`].
    ///
    /// # Errors
    ///
    /// Returns a [`CursorError`] describing the first malformed component.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let bytes = STANDARD
            .decode(token.trim())
            .map_err(|_| CursorError::InvalidEncoding)?;
        let payload = String::from_utf8(bytes).map_err(|_| CursorError::InvalidUtf8)?;
        let (raw_key, raw_id) = payload
            .split_once(SEPARATOR)
            .ok_or(CursorError::MissingSeparator)?;
        let sort_key = raw_key
            .parse::<i64>()
            .map_err(|_| CursorError::InvalidSortKey {
                value: raw_key.to_owned(),
            })?;
        if raw_id.is_empty() {
            return Err(CursorError::EmptyId);
        }
        Ok(Self::new(sort_key, raw_id))
    }
}
