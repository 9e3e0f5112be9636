//! Tower middleware layers for the sendkit HTTP transport.
//!
//! Layers wrap the [`crate::HyperTransport`] service, which speaks
//! [`crate::HttpRequest`] and [`crate::HttpResponse`]. Add them with
//! [`crate::HyperTransportBuilder::layer`]; each added layer wraps the
//! previous ones, so the last layer added is the first to see a request.
//!
//! # Available Layers
//!
//! - [`LoggingLayer`] - Logs requests/responses using `tracing`
//!
//! There is no retry layer: a request is dispatched at most once.
//!
//! # Example
//!
//! ```ignore
//! use sendkit::HyperTransport;
//! use sendkit::middleware::LoggingLayer;
//!
//! let transport = HyperTransport::builder()
//!     .layer(LoggingLayer::new())
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
