//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses or any other protocol-specific envelope. Every repository and
//! service operation returns [`DomainResult`]; nothing in the domain panics on
//! expected failures.

use serde::{Deserialize, Serialize};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The requested entity does not exist (or is not visible).
    NotFound,
    /// Input was malformed or out of range, or the backend call failed.
    Validation,
    /// The entity exists and is well formed but a business rule forbids the
    /// operation.
    Policy,
}

/// Closed set of failures returned by repositories and services.
///
/// # Examples
/// ```
/// use marketplace::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Product", "vintage-denim by ana");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(
///     err.to_string(),
///     "Product with identifier vintage-denim by ana not found"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Entity lookup produced no row.
    #[error("{entity} with identifier {identifier} not found")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },
    /// Malformed input or a failed backend call.
    #[error("{message}")]
    Validation { message: String },
    /// Business-rule rejection of an otherwise valid entity.
    #[error("{message}")]
    Policy { message: String },
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            identifier: identifier.into(),
        }
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Policy`].
    pub fn policy(message: impl Into<String>) -> Self {
        Self::Policy {
            message: message.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Validation { .. } => ErrorCode::Validation,
            Self::Policy { .. } => ErrorCode::Policy,
        }
    }

    /// Return `true` for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Serialisable `{code, message}` payload handed to inbound adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&Error> for ErrorPayload {
    fn from(value: &Error) -> Self {
        Self {
            code: value.code(),
            message: value.to_string(),
        }
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ErrorPayload::from(self).serialize(serializer)
    }
}

/// Outcome type for every repository and service operation.
pub type DomainResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests;
