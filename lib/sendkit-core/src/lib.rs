//! Core types and traits for the sendkit email API client.
//!
//! This crate provides the foundational types used by sendkit:
//! - [`Request`] - Endpoint descriptor (method, path, parameters, model)
//! - [`HttpRequest`] and [`HttpResponse`] - Transport-level messages
//! - [`Transport`] - Outbound HTTP execution trait
//! - [`EncodingStrategy`] - Date and binary encoding rules
//! - [`Timestamp`] and [`Binary`] - Wire values following the active strategy
//! - [`Validatable`] and [`validate`] - Fail-fast parameter validation
//! - [`Pagination`], [`Page`] and [`RateLimit`] - Response metadata
//! - [`Error`] and [`Result`] - Error handling

mod content_type;
mod encode;
mod error;
pub mod header;
mod headers;
mod method;
mod pagination;
pub mod prelude;
mod rate_limit;
mod request;
mod response;
mod strategy;
mod transport;
pub mod validate;

pub use content_type::ContentType;
pub use encode::{Encoded, from_json, to_body, to_form, to_json, to_query_string};
pub use error::{ApiError, ApiErrors, Error, Result, ValidationError};
pub use headers::Headers;
pub use method::Method;
pub use pagination::{Page, Pagination};
pub use rate_limit::RateLimit;
pub use request::{HttpRequest, HttpRequestBuilder, ParameterPlacement, Request};
pub use response::{HttpResponse, Response};
pub use strategy::{
    Binary, DataCodec, DataEncoding, DateCodec, DateEncoding, EncodingStrategy, Timestamp,
};
pub use transport::Transport;
pub use validate::{DateRange, Validatable};

