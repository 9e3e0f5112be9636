//! Suppression lists (`/v3/suppression/{kind}`).
//!
//! Bounces, blocks, invalid emails and spam reports share the same shape:
//! list entries with optional time and page filters, and delete one, some or
//! all of them. Times are sent and received as seconds since the Unix epoch.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::path_segment;
use crate::{
    DateRange, EncodingStrategy, Method, Page, Request, Timestamp, Validatable, Validate,
    ValidationError, validate,
};

/// Kind of suppression list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuppressionKind {
    /// Addresses that bounced.
    Bounces,
    /// Addresses blocked by the receiving server.
    Blocks,
    /// Malformed or non-existent addresses.
    InvalidEmails,
    /// Recipients who reported messages as spam.
    SpamReports,
}

impl SuppressionKind {
    /// Path segment of the list.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bounces => "bounces",
            Self::Blocks => "blocks",
            Self::InvalidEmails => "invalid_emails",
            Self::SpamReports => "spam_reports",
        }
    }
}

impl fmt::Display for SuppressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One suppressed address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuppressionEntry {
    /// When the address was added.
    pub created: Timestamp,
    /// The suppressed address.
    pub email: String,
    /// Reason reported by the receiving server.
    #[serde(default)]
    pub reason: Option<String>,
    /// Enhanced SMTP status code.
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================================
// Retrieve
// ============================================================================

/// Filters of a suppression listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Validate)]
pub struct SuppressionQuery {
    /// Page to fetch.
    #[serde(flatten)]
    #[validate(nested)]
    pub page: Option<Page>,
    /// Creation time window.
    #[serde(flatten)]
    #[validate(nested)]
    pub range: DateRange,
}

/// List a suppression list, or look up one address in it.
///
/// `GET /v3/suppression/{kind}` or `GET /v3/suppression/{kind}/{email}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieveSuppressions {
    kind: SuppressionKind,
    email: Option<String>,
    query: SuppressionQuery,
}

impl RetrieveSuppressions {
    /// List every entry of `kind`.
    #[must_use]
    pub fn new(kind: SuppressionKind) -> Self {
        Self {
            kind,
            email: None,
            query: SuppressionQuery::default(),
        }
    }

    /// Look up a single address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Fetch one page.
    #[must_use]
    pub const fn page(mut self, page: Page) -> Self {
        self.query.page = Some(page);
        self
    }

    /// Only entries created in `range`.
    #[must_use]
    pub const fn range(mut self, range: DateRange) -> Self {
        self.query.range = range;
        self
    }

    /// The list being read.
    #[must_use]
    pub const fn kind(&self) -> SuppressionKind {
        self.kind
    }
}

impl Request for RetrieveSuppressions {
    type Params = SuppressionQuery;
    type Model = Vec<SuppressionEntry>;

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self) -> String {
        match &self.email {
            Some(email) => format!("/v3/suppression/{}/{}", self.kind, path_segment(email)),
            None => format!("/v3/suppression/{}", self.kind),
        }
    }

    fn parameters(&self) -> Option<&SuppressionQuery> {
        Some(&self.query)
    }

    fn encoding_strategy(&self) -> EncodingStrategy {
        EncodingStrategy::unix_seconds()
    }

    fn validate_parameters(&self) -> Result<(), ValidationError> {
        if let Some(email) = &self.email {
            validate::email(email)?;
        }
        self.query.validate()
    }
}

// ============================================================================
// Delete
// ============================================================================

/// Body of a suppression deletion: everything, or the listed addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[validate(custom = "DeleteSelection::check")]
pub struct DeleteSelection {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    delete_all: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[validate(email)]
    emails: Vec<String>,
}

impl DeleteSelection {
    fn check(&self) -> Result<(), ValidationError> {
        if self.delete_all || !self.emails.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::invalid_value(
                "emails",
                "at least one address is required unless deleting all",
            ))
        }
    }
}

/// Remove entries from a suppression list.
///
/// `DELETE /v3/suppression/{kind}` with either `{"delete_all":true}` or
/// `{"emails":[...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSuppressions {
    kind: SuppressionKind,
    selection: DeleteSelection,
}

impl DeleteSuppressions {
    /// Empty the whole list.
    #[must_use]
    pub const fn delete_all(kind: SuppressionKind) -> Self {
        Self {
            kind,
            selection: DeleteSelection {
                delete_all: true,
                emails: Vec::new(),
            },
        }
    }

    /// Remove the given addresses.
    #[must_use]
    pub fn emails<I, S>(kind: SuppressionKind, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            selection: DeleteSelection {
                delete_all: false,
                emails: emails.into_iter().map(Into::into).collect(),
            },
        }
    }
}

impl Request for DeleteSuppressions {
    type Params = DeleteSelection;
    type Model = ();

    fn method(&self) -> Method {
        Method::Delete
    }

    fn path(&self) -> String {
        format!("/v3/suppression/{}", self.kind)
    }

    fn parameters(&self) -> Option<&DeleteSelection> {
        Some(&self.selection)
    }
}
