//! Error types for sendkit.

use std::ops::RangeInclusive;

use bytes::Bytes;
use derive_more::{Display, Error, From};
use serde::Deserialize;

use crate::RateLimit;

// ============================================================================
// Validation Error
// ============================================================================

/// A business rule violated by request parameters.
///
/// Validation stops at the first violation, so a request never reports more
/// than one of these at a time.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ValidationError {
    /// The value is not a syntactically valid email address.
    #[display("\"{_0}\" is not a valid email address")]
    MalformedEmailAddress(#[error(not(source))] String),

    /// A numeric value lies outside its allowed range.
    #[display("{value} is outside of the allowed range {}...{}", range.start(), range.end())]
    LimitOutOfRange {
        /// The offending value.
        value: i64,
        /// The allowed range.
        range: RangeInclusive<i64>,
    },

    /// The end of a date range is before its start.
    #[display("end date {end} is before start date {start}")]
    InvalidEndDate {
        /// Start of the range.
        start: String,
        /// End of the range.
        end: String,
    },

    /// A collection has too few or too many items.
    #[display(
        "`{field}` must contain between {} and {} items, got {count}",
        range.start(),
        range.end()
    )]
    InvalidCount {
        /// Name of the collection.
        field: &'static str,
        /// Number of items supplied.
        count: usize,
        /// Allowed number of items.
        range: RangeInclusive<usize>,
    },

    /// A value violates an endpoint-specific rule.
    #[display("invalid `{field}`: {reason}")]
    InvalidValue {
        /// Name of the field.
        field: &'static str,
        /// Description of the violated rule.
        reason: String,
    },
}

impl ValidationError {
    /// Create an endpoint-specific violation.
    #[must_use]
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// API Error Payload
// ============================================================================

/// One entry of the error payload returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// Human readable message.
    pub message: String,
    /// Offending field, when the API names one.
    #[serde(default)]
    pub field: Option<String>,
    /// Link or hint to the documentation.
    #[serde(default)]
    pub help: Option<String>,
}

/// Error payload returned by the API with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ApiErrors {
    /// All reported errors.
    #[serde(default)]
    pub errors: Vec<ApiError>,
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for sendkit operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The session has no credentials.
    #[display("no authentication configured on the session")]
    #[from(skip)]
    AuthenticationMissing,

    /// The session impersonates a subuser but the endpoint forbids it.
    #[display("request cannot be sent on behalf of subuser \"{subuser}\"")]
    #[from(skip)]
    ImpersonationNotAllowed {
        /// The configured impersonation target.
        #[error(not(source))]
        subuser: String,
    },

    /// Request parameters violate a business rule.
    #[display("validation failed: {_0}")]
    #[from]
    Validation(ValidationError),

    /// The request could not be constructed from valid input.
    #[display("could not construct request: {_0}")]
    #[from(skip)]
    Encoding(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// Network/connection errors.
    #[display("network error: {_0}")]
    #[from(skip)]
    Network(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The transport gave up waiting for a response.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The API answered with a non-2xx status code.
    #[display("HTTP error {status}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        #[error(not(source))]
        body: Bytes,
        /// Rate limit reported alongside the error, if any.
        #[error(not(source))]
        rate_limit: Option<RateLimit>,
    },

    /// The response body does not match the expected model.
    #[display("decoding error at '{path}': {message}")]
    #[from(skip)]
    Decoding {
        /// JSON path to the error (e.g., "stats[0].date").
        path: String,
        /// Error message.
        message: String,
        /// Raw response body.
        #[error(not(source))]
        body: Bytes,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an encoding error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create a decoding error carrying the raw body.
    #[must_use]
    pub fn decoding(path: impl Into<String>, message: impl Into<String>, body: Bytes) -> Self {
        Self::Decoding {
            path: path.into(),
            message: message.into(),
            body,
        }
    }

    /// Returns `true` if the error was detected before any I/O because of
    /// session configuration.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationMissing | Self::ImpersonationNotAllowed { .. }
        )
    }

    /// Returns `true` if request parameters failed validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The validation failure, if this is one.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if the transport failed (network, TLS or timeout).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Tls(_) | Self::Timeout)
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body for HTTP and decoding errors.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        match self {
            Self::Http { body, .. } | Self::Decoding { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Decode the API error payload of an HTTP error.
    ///
    /// Returns `None` if this is not an HTTP error or the body is not the
    /// documented `{"errors": [...]}` shape.
    #[must_use]
    pub fn api_errors(&self) -> Option<ApiErrors> {
        match self {
            Self::Http { body, .. } => serde_json::from_slice(body).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = ValidationError::LimitOutOfRange {
            value: 501,
            range: 1..=500,
        };
        assert_eq!(err.to_string(), "501 is outside of the allowed range 1...500");

        let err = ValidationError::MalformedEmailAddress("foo@bar".to_string());
        assert_eq!(err.to_string(), "\"foo@bar\" is not a valid email address");

        let err = ValidationError::InvalidCount {
            field: "personalizations",
            count: 0,
            range: 1..=1000,
        };
        assert_eq!(
            err.to_string(),
            "`personalizations` must contain between 1 and 1000 items, got 0"
        );
    }

    #[test]
    fn error_display() {
        assert_eq!(
            Error::AuthenticationMissing.to_string(),
            "no authentication configured on the session"
        );
        assert_eq!(
            Error::ImpersonationNotAllowed {
                subuser: "foo".to_string()
            }
            .to_string(),
            "request cannot be sent on behalf of subuser \"foo\""
        );
        assert_eq!(Error::Timeout.to_string(), "request timeout");
        assert_eq!(
            Error::decoding("[0].email", "missing field `email`", Bytes::new()).to_string(),
            "decoding error at '[0].email': missing field `email`"
        );
    }

    #[test]
    fn validation_error_converts() {
        let err: Error = ValidationError::invalid_value("emails", "must not be empty").into();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::InvalidValue { field: "emails", .. })
        ));
        assert!(!err.is_configuration());
    }

    #[test]
    fn error_kinds() {
        assert!(Error::AuthenticationMissing.is_configuration());
        assert!(Error::Timeout.is_timeout());
        assert!(Error::Timeout.is_transport());
        assert!(Error::network("refused").is_transport());
        assert!(!Error::encoding("bad").is_transport());
    }

    #[test]
    fn http_error_payload() {
        let body = Bytes::from(r#"{"errors":[{"message":"bad key","field":null}]}"#);
        let err = Error::Http {
            status: 401,
            body: body.clone(),
            rate_limit: None,
        };

        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some(&body));

        let payload = err.api_errors().expect("payload");
        assert_eq!(payload.errors.len(), 1);
        assert_eq!(
            payload.errors.first().map(|e| e.message.as_str()),
            Some("bad key")
        );

        assert!(Error::Timeout.api_errors().is_none());
    }
}
