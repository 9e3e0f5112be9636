//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use sendkit_core::prelude::*;
//! ```

pub use crate::{
    Binary, ContentType, DataEncoding, DateEncoding, DateRange, EncodingStrategy, Error, Headers,
    HttpRequest, HttpResponse, Method, Page, Pagination, RateLimit, Request, Response, Result,
    Timestamp, Transport, Validatable, ValidationError,
};
