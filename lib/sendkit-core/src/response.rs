//! Transport-level and decoded responses.
//!
//! [`HttpResponse`] is what a [`crate::Transport`] returns. [`Response`] is
//! what the session hands back after decoding: the model plus the pagination
//! and rate-limit metadata read from headers.

use bytes::Bytes;

use crate::{Headers, Pagination, RateLimit};

// ============================================================================
// HTTP Response
// ============================================================================

/// HTTP response with status, headers, and buffered body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    headers: Headers,
    body: Bytes,
}

impl HttpResponse {
    /// Creates a new response.
    #[must_use]
    pub const fn new(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Single header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, Headers, Bytes) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }
}

// ============================================================================
// Decoded Response
// ============================================================================

/// A decoded API response.
#[derive(Debug, Clone)]
pub struct Response<M> {
    /// The decoded model.
    pub model: M,
    /// Page cursors from the `Link` header, if any.
    pub pagination: Option<Pagination>,
    /// Quota snapshot from the rate-limit headers, if any.
    pub rate_limit: Option<RateLimit>,
    /// HTTP status code.
    pub status: u16,
    /// Raw response headers.
    pub headers: Headers,
}

impl<M> Response<M> {
    /// Consume into the model.
    #[must_use]
    pub fn into_model(self) -> M {
        self.model
    }

    /// Consume into (model, pagination, rate limit).
    #[must_use]
    pub fn into_parts(self) -> (M, Option<Pagination>, Option<RateLimit>) {
        (self.model, self.pagination, self.rate_limit)
    }

    /// Transform the model with a function.
    pub fn map<F, M2>(self, f: F) -> Response<M2>
    where
        F: FnOnce(M) -> M2,
    {
        Response {
            model: f(self.model),
            pagination: self.pagination,
            rate_limit: self.rate_limit,
            status: self.status,
            headers: self.headers,
        }
    }
}
