//! Endpoint definitions.
//!
//! Each endpoint is a plain value implementing [`crate::Request`]. Build it,
//! then hand it to [`crate::Session::send`]:
//!
//! - [`mail`] - Mail send and its value objects
//! - [`suppression`] - Bounces, blocks, invalid emails and spam reports
//! - [`stats`] - Global email statistics
//! - [`subuser`] - Subuser listing

pub mod mail;
pub mod stats;
pub mod subuser;
pub mod suppression;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in a path segment: everything that would change the
/// structure of the URL.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

/// Percent-encode a value for use as one path segment.
pub(crate) fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET).to_string()
}
