//! Global delivery statistics (`GET /v3/stats`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Method, Page, Request, Validate, ValidationError, validate};

/// Bucket size of aggregated statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// One entry per day.
    Day,
    /// One entry per week.
    Week,
    /// One entry per month.
    Month,
}

/// Filters of a statistics query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[validate(custom = "StatsQuery::check_dates")]
pub struct StatsQuery {
    /// First day included.
    pub start_date: NaiveDate,
    /// Last day included, today when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Bucket size, daily when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregated_by: Option<Aggregation>,
    /// Page of buckets.
    #[serde(flatten)]
    #[validate(nested)]
    pub page: Option<Page>,
}

impl StatsQuery {
    fn check_dates(&self) -> Result<(), ValidationError> {
        match &self.end_date {
            Some(end) => validate::date_order(&self.start_date, end),
            None => Ok(()),
        }
    }
}

/// Counters of one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Metrics {
    /// Messages blocked by the receiver.
    pub blocks: u64,
    /// Messages dropped because the address bounced before.
    pub bounce_drops: u64,
    /// Messages that bounced.
    pub bounces: u64,
    /// Link clicks.
    pub clicks: u64,
    /// Messages temporarily rejected.
    pub deferred: u64,
    /// Messages accepted by the receiver.
    pub delivered: u64,
    /// Messages sent to malformed addresses.
    pub invalid_emails: u64,
    /// Message opens.
    pub opens: u64,
    /// Messages processed for delivery.
    pub processed: u64,
    /// Messages requested.
    pub requests: u64,
    /// Messages dropped because the recipient reported spam before.
    pub spam_report_drops: u64,
    /// Spam reports.
    pub spam_reports: u64,
    /// Recipients who clicked at least once.
    pub unique_clicks: u64,
    /// Recipients who opened at least once.
    pub unique_opens: u64,
    /// Messages dropped because the recipient unsubscribed.
    pub unsubscribe_drops: u64,
    /// Unsubscriptions.
    pub unsubscribes: u64,
}

/// Metrics block of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatsBlock {
    /// Counters.
    pub metrics: Metrics,
}

/// Statistics of one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatsEntry {
    /// First day of the bucket.
    pub date: NaiveDate,
    /// One block per metrics source.
    pub stats: Vec<StatsBlock>,
}

impl StatsEntry {
    /// Sum of every block of the bucket.
    #[must_use]
    pub fn totals(&self) -> Metrics {
        self.stats.iter().fold(Metrics::default(), |acc, block| {
            let m = &block.metrics;
            Metrics {
                blocks: acc.blocks.saturating_add(m.blocks),
                bounce_drops: acc.bounce_drops.saturating_add(m.bounce_drops),
                bounces: acc.bounces.saturating_add(m.bounces),
                clicks: acc.clicks.saturating_add(m.clicks),
                deferred: acc.deferred.saturating_add(m.deferred),
                delivered: acc.delivered.saturating_add(m.delivered),
                invalid_emails: acc.invalid_emails.saturating_add(m.invalid_emails),
                opens: acc.opens.saturating_add(m.opens),
                processed: acc.processed.saturating_add(m.processed),
                requests: acc.requests.saturating_add(m.requests),
                spam_report_drops: acc.spam_report_drops.saturating_add(m.spam_report_drops),
                spam_reports: acc.spam_reports.saturating_add(m.spam_reports),
                unique_clicks: acc.unique_clicks.saturating_add(m.unique_clicks),
                unique_opens: acc.unique_opens.saturating_add(m.unique_opens),
                unsubscribe_drops: acc.unsubscribe_drops.saturating_add(m.unsubscribe_drops),
                unsubscribes: acc.unsubscribes.saturating_add(m.unsubscribes),
            }
        })
    }
}

/// Account-wide statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalStats {
    query: StatsQuery,
}

impl GlobalStats {
    /// Statistics from `start_date` onwards.
    #[must_use]
    pub const fn since(start_date: NaiveDate) -> Self {
        Self {
            query: StatsQuery {
                start_date,
                end_date: None,
                aggregated_by: None,
                page: None,
            },
        }
    }

    /// Stop at `end_date`.
    #[must_use]
    pub const fn until(mut self, end_date: NaiveDate) -> Self {
        self.query.end_date = Some(end_date);
        self
    }

    /// Group by day, week or month.
    #[must_use]
    pub const fn aggregated_by(mut self, aggregation: Aggregation) -> Self {
        self.query.aggregated_by = Some(aggregation);
        self
    }

    /// Fetch one page of buckets.
    #[must_use]
    pub const fn page(mut self, page: Page) -> Self {
        self.query.page = Some(page);
        self
    }
}

impl Request for GlobalStats {
    type Params = StatsQuery;
    type Model = Vec<StatsEntry>;

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self) -> String {
        "/v3/stats".to_string()
    }

    fn parameters(&self) -> Option<&StatsQuery> {
        Some(&self.query)
    }
}
