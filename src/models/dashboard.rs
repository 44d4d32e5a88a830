//! Cached dashboard snapshot model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One department's generated dashboard for one calendar day.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSnapshot {
    pub department: String,
    /// Markdown body.
    pub content: String,
    /// JSON-encoded array of chart objects.
    pub charts_json: String,
    pub generated_date: NaiveDate,
    pub generated_at: DateTime<Utc>,
}
