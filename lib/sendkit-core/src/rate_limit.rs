//! Rate-limit snapshot parsed from response headers.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::{Headers, header};

/// Quota information reported with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed in the current window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// Instant at which the window resets.
    pub reset_at: DateTime<Utc>,
}

impl RateLimit {
    /// Read `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
    /// `X-RateLimit-Reset` (epoch seconds).
    ///
    /// Returns `None` if any of the three is missing or not an integer.
    #[must_use]
    pub fn from_headers(headers: &Headers) -> Option<Self> {
        let limit = integer(headers, header::RATE_LIMIT_LIMIT)?;
        let remaining = integer(headers, header::RATE_LIMIT_REMAINING)?;
        let reset: i64 = integer(headers, header::RATE_LIMIT_RESET)?;
        let reset_at = DateTime::from_timestamp(reset, 0)?;

        Some(Self {
            limit,
            remaining,
            reset_at,
        })
    }

    /// Returns `true` when no request is left in the window.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Time left until the reset, zero once it has passed.
    #[must_use]
    pub fn reset_in(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.reset_at - now).to_std().unwrap_or_default()
    }
}

fn integer<T: FromStr>(headers: &Headers, name: &str) -> Option<T> {
    headers.get(name).and_then(|value| value.trim().parse().ok())
}
