//! Subuser listing (`GET /v3/subusers`).
//!
//! Only the parent account can list its subusers, so this request refuses to
//! run on behalf of one.

use serde::{Deserialize, Serialize};

use crate::{Method, Page, Request, Validate};

/// A subuser of the account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Subuser {
    /// Numeric identifier.
    pub id: u64,
    /// Login name, used as the `On-Behalf-Of` value.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// Whether the subuser is disabled.
    #[serde(default)]
    pub disabled: bool,
}

/// Filters of a subuser listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Validate)]
pub struct SubuserQuery {
    /// Only the subuser with this name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Page to fetch.
    #[serde(flatten)]
    #[validate(nested)]
    pub page: Option<Page>,
}

/// List the subusers of the account.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RetrieveSubusers {
    query: SubuserQuery,
}

impl RetrieveSubusers {
    /// Every subuser.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the subuser named `username`.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.query.username = Some(username.into());
        self
    }

    /// Fetch one page.
    #[must_use]
    pub fn page(mut self, page: Page) -> Self {
        self.query.page = Some(page);
        self
    }
}

impl Request for RetrieveSubusers {
    type Params = SubuserQuery;
    type Model = Vec<Subuser>;

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self) -> String {
        "/v3/subusers".to_string()
    }

    fn parameters(&self) -> Option<&SubuserQuery> {
        Some(&self.query)
    }

    fn supports_impersonation(&self) -> bool {
        false
    }
}
