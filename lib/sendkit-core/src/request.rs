//! Endpoint descriptors and the transport-level request.
//!
//! [`Request`] describes one API call: method, path, parameters and the
//! model its response decodes into. The session turns it into an
//! [`HttpRequest`] that a [`crate::Transport`] can execute.
//!
//! # Example
//!
//! ```
//! use sendkit_core::{Method, Page, Request};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Subuser { id: u64, username: String }
//!
//! struct ListSubusers { page: Page }
//!
//! impl Request for ListSubusers {
//!     type Params = Page;
//!     type Model = Vec<Subuser>;
//!
//!     fn method(&self) -> Method { Method::Get }
//!     fn path(&self) -> String { "/v3/subusers".to_string() }
//!     fn parameters(&self) -> Option<&Page> { Some(&self.page) }
//! }
//! ```

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    ContentType, Encoded, EncodingStrategy, Headers, Method, Result, Validatable,
    ValidationError, from_json, to_body, to_query_string,
};

// ============================================================================
// Request Trait
// ============================================================================

/// Where encoded parameters go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterPlacement {
    /// Appended to the path as a query string.
    Query,
    /// Sent as the request body.
    Body,
}

/// A typed API call.
///
/// Only [`Request::method`] and [`Request::path`] are required; everything
/// else has a default that fits most endpoints. Requests are immutable and
/// can be sent any number of times.
pub trait Request {
    /// Parameters sent with the request. Use `()` when there are none.
    type Params: Serialize + Validatable;

    /// Model the response body decodes into.
    type Model: DeserializeOwned;

    /// HTTP method.
    fn method(&self) -> Method;

    /// Absolute path starting with `/`, without the host.
    ///
    /// May already carry a query string.
    fn path(&self) -> String;

    /// Parameters, if any.
    fn parameters(&self) -> Option<&Self::Params> {
        None
    }

    /// Extra headers specific to this endpoint.
    fn headers(&self) -> Headers {
        Headers::new()
    }

    /// Media type expected in the response.
    fn accept_type(&self) -> ContentType {
        ContentType::Json
    }

    /// Media type of the body, when parameters are sent as one.
    fn content_type(&self) -> ContentType {
        ContentType::Json
    }

    /// Date and binary rules used to encode parameters and decode the model.
    fn encoding_strategy(&self) -> EncodingStrategy {
        EncodingStrategy::default()
    }

    /// Where parameters go. Query string for `GET`, body otherwise.
    fn parameter_placement(&self) -> ParameterPlacement {
        if self.method().has_body() {
            ParameterPlacement::Body
        } else {
            ParameterPlacement::Query
        }
    }

    /// Whether the request may be sent on behalf of a subuser.
    fn supports_impersonation(&self) -> bool {
        true
    }

    /// Check the parameters, stopping at the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    fn validate_parameters(&self) -> std::result::Result<(), ValidationError> {
        self.parameters().validate()
    }

    /// Encode the parameters according to the placement and strategy.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Encoding`] if serialization fails.
    fn encode_parameters(&self) -> Result<Encoded> {
        let Some(params) = self.parameters() else {
            return Ok(Encoded::Empty);
        };
        let strategy = self.encoding_strategy();

        match self.parameter_placement() {
            ParameterPlacement::Query => {
                let query = to_query_string(params, strategy)?;
                Ok(if query.is_empty() {
                    Encoded::Empty
                } else {
                    Encoded::Query(query)
                })
            }
            ParameterPlacement::Body => {
                let content_type = self.content_type();
                let bytes = to_body(params, content_type, strategy)?;
                Ok(Encoded::Body {
                    content_type,
                    bytes,
                })
            }
        }
    }

    /// Decode a response body into the model.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decoding`] with the raw body on mismatch.
    fn decode(&self, body: &Bytes) -> Result<Self::Model> {
        from_json(body, self.encoding_strategy())
    }
}

// ============================================================================
// HTTP Request
// ============================================================================

/// A fully built HTTP request, ready for a [`crate::Transport`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates a new [`HttpRequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: Url) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers, in insertion order.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Single header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into (method, url, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, Url, Headers, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Builder for [`HttpRequest`].
#[derive(Debug, Clone)]
pub struct HttpRequestBuilder {
    method: Method,
    url: Url,
    headers: Headers,
    body: Option<Bytes>,
}

impl HttpRequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub const fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Sets a header, replacing any value with the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(headers);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// Builds the [`HttpRequest`].
    #[must_use]
    pub fn build(self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}
