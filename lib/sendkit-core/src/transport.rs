//! Outbound HTTP execution.
//!
//! The session never performs I/O itself: every request goes through a
//! [`Transport`]. The default implementation lives in the `sendkit` crate;
//! implement the trait directly to plug in another HTTP stack or a test
//! double.

use std::future::Future;
use std::sync::Arc;

use crate::{HttpRequest, HttpResponse, Result};

/// Executes fully built HTTP requests.
///
/// Implementations own timeouts and connection management. A timeout must be
/// reported as [`crate::Error::Timeout`], other connection failures as
/// [`crate::Error::Network`] or [`crate::Error::Tls`]. Non-2xx statuses are
/// not errors at this level.
pub trait Transport: Send + Sync {
    /// Execute an HTTP request and return the buffered response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response could be obtained.
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send {
        (**self).execute(request)
    }
}
