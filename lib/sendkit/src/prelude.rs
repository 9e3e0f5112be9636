//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types, traits, and macros
//! for easy glob importing:
//!
//! ```ignore
//! use sendkit::prelude::*;
//! ```

pub use crate::{
    Authentication, Binary, ClientConfig, DateRange, EncodingStrategy, Error, HyperTransport,
    Method, Page, Pagination, RateLimit, Request, Response, Result, Session, Timestamp, Transport,
    Validatable, Validate, ValidationError,
};
pub use serde::{Deserialize, Serialize};
