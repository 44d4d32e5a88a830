//! Daily dashboard cache.
//!
//! A department gets at most one generated dashboard per UTC calendar day.
//! Reads serve today's snapshot when one exists and generate it otherwise;
//! regeneration overwrites today's snapshot in place.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::errors::AppError;
use crate::llm::{Assistant, LlmError};
use crate::models::{ChartDataEntry, DashboardSnapshot};

/// Source of "now" for cache keys and timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The calendar day cache entries are keyed by.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Persistence for dashboard snapshots, keyed by `(department, generated_date)`.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn find_snapshot(
        &self,
        department: &str,
        date: NaiveDate,
    ) -> Result<Option<DashboardSnapshot>, AppError>;

    /// Insert unless a snapshot for the same key already exists. Returns the
    /// stored row, which is the earlier one if another writer got there first.
    async fn create_snapshot(&self, snapshot: &DashboardSnapshot)
        -> Result<DashboardSnapshot, AppError>;

    /// Insert or overwrite content, charts and generation time for the key.
    async fn save_snapshot(&self, snapshot: &DashboardSnapshot)
        -> Result<DashboardSnapshot, AppError>;
}

pub struct DashboardCache {
    assistant: Arc<Assistant>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
}

impl DashboardCache {
    pub fn new(assistant: Arc<Assistant>, store: Arc<dyn SnapshotStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            assistant,
            store,
            clock,
        }
    }

    /// Today's snapshot, generating it on the first request of the day.
    pub async fn get(&self, department: &str) -> Result<DashboardSnapshot, LlmError> {
        let department = self.canonical(department)?;
        let today = self.clock.today();

        if let Some(snapshot) = self.store.find_snapshot(department, today).await? {
            tracing::debug!(department, %today, "Serving cached dashboard");
            return Ok(snapshot);
        }

        tracing::info!(department, %today, "No dashboard cached for today, generating");
        let snapshot = self.generate(department, today, None).await?;
        Ok(self.store.create_snapshot(&snapshot).await?)
    }

    /// Generate a fresh snapshot for today, replacing any cached one.
    ///
    /// On failure the existing snapshot is left untouched.
    pub async fn regenerate(&self, department: &str) -> Result<DashboardSnapshot, LlmError> {
        let department = self.canonical(department)?;
        let today = self.clock.today();

        let previous = self.store.find_snapshot(department, today).await?;
        tracing::info!(
            department,
            %today,
            replacing = previous.is_some(),
            "Regenerating dashboard"
        );

        let snapshot = self
            .generate(department, today, previous.map(|s| s.generated_at))
            .await?;
        Ok(self.store.save_snapshot(&snapshot).await?)
    }

    /// Today's snapshot if one is cached. Never generates.
    pub async fn cached(&self, department: &str) -> Result<Option<DashboardSnapshot>, LlmError> {
        let department = self.canonical(department)?;
        Ok(self.store.find_snapshot(department, self.clock.today()).await?)
    }

    fn canonical(&self, department: &str) -> Result<&'static str, LlmError> {
        self.assistant
            .registry()
            .get(department)
            .map(|profile| profile.name())
            .ok_or_else(|| LlmError::UnknownDepartment(department.to_string()))
    }

    async fn generate(
        &self,
        department: &str,
        today: NaiveDate,
        previous_at: Option<DateTime<Utc>>,
    ) -> Result<DashboardSnapshot, LlmError> {
        let content = self.assistant.generate_dashboard(department).await?;
        let charts = self.assistant.generate_charts(department).await;
        let charts_json = charts_json(&charts);

        let mut generated_at = self.clock.now();
        // Keep generated_at strictly increasing across regenerations.
        if let Some(previous) = previous_at {
            if generated_at <= previous {
                generated_at = previous + Duration::microseconds(1);
            }
        }

        Ok(DashboardSnapshot {
            department: department.to_string(),
            content,
            charts_json,
            generated_date: today,
            generated_at,
        })
    }
}

fn charts_json(charts: &[ChartDataEntry]) -> String {
    match serde_json::to_string(charts) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to encode charts, caching none: {}", e);
            "[]".to_string()
        }
    }
}
