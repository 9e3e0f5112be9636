//! Canonical header names read and written by the client.
//!
//! Names are written with this casing; lookups through [`crate::Headers`]
//! ignore case.

/// `Accept` request header.
pub const ACCEPT: &str = "Accept";

/// `Authorization` request header.
pub const AUTHORIZATION: &str = "Authorization";

/// `Content-Type` header.
pub const CONTENT_TYPE: &str = "Content-Type";

/// `User-Agent` request header.
pub const USER_AGENT: &str = "User-Agent";

/// Subuser impersonation header.
pub const ON_BEHALF_OF: &str = "On-Behalf-Of";

/// RFC 8288 link relations, used for pagination.
pub const LINK: &str = "Link";

/// Total number of requests allowed in the current window.
pub const RATE_LIMIT_LIMIT: &str = "X-RateLimit-Limit";

/// Requests left in the current window.
pub const RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";

/// Epoch seconds at which the window resets.
pub const RATE_LIMIT_RESET: &str = "X-RateLimit-Reset";
