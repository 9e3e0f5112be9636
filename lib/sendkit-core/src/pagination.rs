//! Pagination cursors parsed from the `Link` response header.
//!
//! List endpoints answer with an RFC 8288 style header:
//!
//! ```text
//! Link: <https://api.sendgrid.com/v3/suppression/bounces?limit=4&offset=8>; rel="next"; title="3",
//!       <https://api.sendgrid.com/v3/suppression/bounces?limit=4&offset=0>; rel="first"; title="1"
//! ```
//!
//! Each relation becomes a [`Page`]. Parsing never fails: entries that cannot
//! be read are dropped, and a header with no readable entry yields `None`.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::{Headers, Validatable, ValidationError, header, validate};

/// One slice of a paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    /// Number of items in the slice.
    pub limit: u32,
    /// Index of the first item.
    pub offset: u32,
}

impl Page {
    /// Allowed values of [`Page::limit`].
    pub const LIMIT_RANGE: RangeInclusive<i64> = 1..=500;

    /// Create a page.
    #[must_use]
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// The page following this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }

    fn from_url(url: &str) -> Option<Self> {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        let (_, query) = url.split_once('?')?;

        let mut limit = None;
        let mut offset = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "limit" => limit = value.parse().ok(),
                "offset" => offset = value.parse().ok(),
                _ => {}
            }
        }

        Some(Self::new(limit?, offset?))
    }
}

impl Validatable for Page {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::range(self.limit, Self::LIMIT_RANGE)
    }
}

/// Named page cursors of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    /// The first page.
    pub first: Option<Page>,
    /// The page before the current one.
    pub previous: Option<Page>,
    /// The page after the current one.
    pub next: Option<Page>,
    /// The last page.
    pub last: Option<Page>,
}

impl Pagination {
    /// Read pagination from response headers.
    ///
    /// Returns `None` if there is no `Link` header or none of its entries
    /// could be parsed.
    #[must_use]
    pub fn from_headers(headers: &Headers) -> Option<Self> {
        headers.get(header::LINK).and_then(Self::from_link_header)
    }

    /// Parse the value of a `Link` header.
    #[must_use]
    pub fn from_link_header(value: &str) -> Option<Self> {
        let mut pagination = Self::default();

        for entry in value.split(',') {
            let mut parts = entry.split(';').map(str::trim);
            let Some(target) = parts
                .next()
                .and_then(|part| part.strip_prefix('<'))
                .and_then(|part| part.strip_suffix('>'))
            else {
                continue;
            };
            let Some(rels) = parts.find_map(|part| {
                let (name, value) = part.split_once('=')?;
                name.trim()
                    .eq_ignore_ascii_case("rel")
                    .then(|| value.trim())
            }) else {
                continue;
            };
            let Some(page) = Page::from_url(target) else {
                continue;
            };

            for rel in rels.trim_matches('"').split_whitespace() {
                match rel.to_ascii_lowercase().as_str() {
                    "first" => pagination.first = Some(page),
                    "prev" | "previous" => pagination.previous = Some(page),
                    "next" => pagination.next = Some(page),
                    "last" => pagination.last = Some(page),
                    _ => {}
                }
            }
        }

        (!pagination.is_empty()).then_some(pagination)
    }

    /// Returns `true` if no cursor is known.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first.is_none() && self.previous.is_none() && self.next.is_none() && self.last.is_none()
    }

    /// Returns `true` if there is a next page.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
