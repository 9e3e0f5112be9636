//! Typed client for an email delivery REST API.
//!
//! Endpoints are plain values implementing [`Request`]. A [`Session`] holds
//! the credentials, host and optional subuser, and sends requests through a
//! [`Transport`]: credentials and impersonation are checked, parameters are
//! validated and encoded, and the response is decoded into the endpoint's
//! model together with its [`Pagination`] and [`RateLimit`] metadata.
//!
//! # Example
//!
//! ```ignore
//! use sendkit::prelude::*;
//! use sendkit::api::suppression::{RetrieveSuppressions, SuppressionKind};
//!
//! let session = Session::builder().api_key("SG.xxxx").build()?;
//!
//! let request = RetrieveSuppressions::new(SuppressionKind::Bounces).page(Page::new(50, 0));
//! let response = session.send(&request).await?;
//!
//! for entry in &response.model {
//!     println!("{} bounced: {:?}", entry.email, entry.reason);
//! }
//! if let Some(next) = response.pagination.and_then(|p| p.next) {
//!     let more = session.send(&request.clone().page(next)).await?;
//! }
//! ```
//!
//! # Transport
//!
//! [`HyperTransport`] is the default transport: hyper with rustls, pooled
//! connections and a per-request timeout. Any [`Transport`] can be plugged in
//! with [`Session::with_transport`], which is how tests record requests.

// Generated `#[derive(Validate)]` code refers to `::sendkit`.
extern crate self as sendkit;

pub mod api;
mod auth;
mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;
mod session;

pub use auth::Authentication;
pub use client::{BoxedService, HyperTransport, HyperTransportBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use session::{DEFAULT_HOST, Session, SessionBuilder};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use sendkit_core::{
    ApiError, ApiErrors, Binary, ContentType, DataCodec, DataEncoding, DateCodec, DateEncoding,
    DateRange, Encoded, EncodingStrategy, Error, Headers, HttpRequest, HttpRequestBuilder,
    HttpResponse, Method, Page, Pagination, ParameterPlacement, RateLimit, Request, Response,
    Result, Timestamp, Transport, Validatable, ValidationError, from_json, header, to_body,
    to_form, to_json, to_query_string, validate,
};

// Re-export macros
pub use sendkit_macro::Validate;
