//! Database repository for CRUD operations.
//!
//! Timestamps are stored as RFC 3339 UTC with a fixed microsecond precision so
//! that text ordering matches time ordering.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::dashboard::SnapshotStore;
use crate::errors::AppError;
use crate::llm::DocumentSource;
use crate::models::{
    ConversationMessage, CreateDocumentRequest, DashboardSnapshot, Document, DocumentExcerpt, Role,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== DOCUMENT OPERATIONS ====================

    /// List all documents, newest upload first.
    pub async fn list_documents(&self) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, content, upload_date, tags, metadata FROM documents ORDER BY upload_date DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    /// The `limit` most recently uploaded documents.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<Document>, AppError> {
        let rows = sqlx::query(
            "SELECT id, title, content, upload_date, tags, metadata FROM documents ORDER BY upload_date DESC, rowid DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(document_from_row).collect()
    }

    /// Get a document by ID.
    pub async fn get_document(&self, id: &str) -> Result<Option<Document>, AppError> {
        let row = sqlx::query(
            "SELECT id, title, content, upload_date, tags, metadata FROM documents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    /// Store a new document.
    pub async fn create_document(&self, request: &CreateDocumentRequest) -> Result<Document, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let upload_date = Utc::now();
        let tags_json = serde_json::to_string(&request.tags)?;
        let metadata_json = serde_json::to_string(&request.metadata)?;

        sqlx::query(
            "INSERT INTO documents (id, title, content, upload_date, tags, metadata) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&request.title)
        .bind(&request.content)
        .bind(format_timestamp(&upload_date))
        .bind(&tags_json)
        .bind(&metadata_json)
        .execute(&self.pool)
        .await?;

        tracing::info!("Stored document {} ({} chars)", id, request.content.len());

        Ok(Document {
            id,
            title: request.title.clone(),
            content: request.content.clone(),
            upload_date: parse_timestamp(&format_timestamp(&upload_date))?,
            tags: request.tags.clone(),
            metadata: request.metadata.clone(),
        })
    }

    /// Delete a document.
    pub async fn delete_document(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Document {} not found", id)));
        }

        Ok(())
    }

    // ==================== CONVERSATION OPERATIONS ====================

    /// Record a user message and the assistant's reply as one unit.
    pub async fn append_exchange(
        &self,
        user_id: &str,
        department: &str,
        user_message: &str,
        reply: &str,
    ) -> Result<(), AppError> {
        let now = format_timestamp(&Utc::now());

        let mut tx = self.pool.begin().await?;

        for (role, content) in [(Role::User, user_message), (Role::Assistant, reply)] {
            sqlx::query(
                "INSERT INTO conversation_messages (user_id, department, role, content, created_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(department)
            .bind(role.as_str())
            .bind(content)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// The last `limit` messages of a conversation, oldest first.
    pub async fn list_messages(
        &self,
        user_id: &str,
        department: &str,
        limit: usize,
    ) -> Result<Vec<ConversationMessage>, AppError> {
        let rows = sqlx::query(
            r#"SELECT user_id, department, role, content, created_at FROM (
                   SELECT id, user_id, department, role, content, created_at
                   FROM conversation_messages
                   WHERE user_id = ? AND department = ?
                   ORDER BY id DESC
                   LIMIT ?
               ) ORDER BY id ASC"#,
        )
        .bind(user_id)
        .bind(department)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(message_from_row).collect()
    }

    /// Delete a conversation. Returns the number of messages removed.
    pub async fn clear_messages(&self, user_id: &str, department: &str) -> Result<u64, AppError> {
        let result =
            sqlx::query("DELETE FROM conversation_messages WHERE user_id = ? AND department = ?")
                .bind(user_id)
                .bind(department)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    // ==================== SNAPSHOT OPERATIONS ====================

    /// Get the snapshot for a department and day.
    pub async fn get_snapshot(
        &self,
        department: &str,
        date: NaiveDate,
    ) -> Result<Option<DashboardSnapshot>, AppError> {
        let row = sqlx::query(
            "SELECT department, content, charts_json, generated_date, generated_at FROM dashboard_snapshots WHERE department = ? AND generated_date = ?",
        )
        .bind(department)
        .bind(date.format(DATE_FORMAT).to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(snapshot_from_row).transpose()
    }

    /// Insert a snapshot unless one already exists for its day, then read back
    /// whichever row won.
    pub async fn insert_snapshot_if_absent(
        &self,
        snapshot: &DashboardSnapshot,
    ) -> Result<DashboardSnapshot, AppError> {
        let result = sqlx::query(
            r#"INSERT INTO dashboard_snapshots (department, content, charts_json, generated_date, generated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (department, generated_date) DO NOTHING"#,
        )
        .bind(&snapshot.department)
        .bind(&snapshot.content)
        .bind(&snapshot.charts_json)
        .bind(snapshot.generated_date.format(DATE_FORMAT).to_string())
        .bind(format_timestamp(&snapshot.generated_at))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::info!(
                department = %snapshot.department,
                "Dashboard for {} was already cached, keeping existing",
                snapshot.generated_date
            );
        }

        self.stored_snapshot(snapshot).await
    }

    /// Insert a snapshot or overwrite the existing one for its day.
    pub async fn upsert_snapshot(
        &self,
        snapshot: &DashboardSnapshot,
    ) -> Result<DashboardSnapshot, AppError> {
        sqlx::query(
            r#"INSERT INTO dashboard_snapshots (department, content, charts_json, generated_date, generated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (department, generated_date) DO UPDATE SET
                   content = excluded.content,
                   charts_json = excluded.charts_json,
                   generated_at = excluded.generated_at"#,
        )
        .bind(&snapshot.department)
        .bind(&snapshot.content)
        .bind(&snapshot.charts_json)
        .bind(snapshot.generated_date.format(DATE_FORMAT).to_string())
        .bind(format_timestamp(&snapshot.generated_at))
        .execute(&self.pool)
        .await?;

        self.stored_snapshot(snapshot).await
    }

    async fn stored_snapshot(&self, snapshot: &DashboardSnapshot) -> Result<DashboardSnapshot, AppError> {
        self.get_snapshot(&snapshot.department, snapshot.generated_date)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Dashboard snapshot for {} on {} vanished after write",
                    snapshot.department, snapshot.generated_date
                ))
            })
    }
}

#[async_trait]
impl DocumentSource for Repository {
    async fn list_recent_documents(&self, limit: usize) -> Result<Vec<DocumentExcerpt>, AppError> {
        let docs = self.list_recent(limit).await?;
        Ok(docs.into_iter().map(DocumentExcerpt::from).collect())
    }
}

#[async_trait]
impl SnapshotStore for Repository {
    async fn find_snapshot(
        &self,
        department: &str,
        date: NaiveDate,
    ) -> Result<Option<DashboardSnapshot>, AppError> {
        self.get_snapshot(department, date).await
    }

    async fn create_snapshot(
        &self,
        snapshot: &DashboardSnapshot,
    ) -> Result<DashboardSnapshot, AppError> {
        self.insert_snapshot_if_absent(snapshot).await
    }

    async fn save_snapshot(
        &self,
        snapshot: &DashboardSnapshot,
    ) -> Result<DashboardSnapshot, AppError> {
        self.upsert_snapshot(snapshot).await
    }
}

// Helper functions for row conversion

fn document_from_row(row: &SqliteRow) -> Result<Document, AppError> {
    let upload_date: String = row.try_get("upload_date")?;
    let tags: String = row.try_get("tags")?;
    let metadata: String = row.try_get("metadata")?;
    Ok(Document {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        upload_date: parse_timestamp(&upload_date)?,
        tags: parse_json(&tags),
        metadata: parse_json(&metadata),
    })
}

fn message_from_row(row: &SqliteRow) -> Result<ConversationMessage, AppError> {
    let role: String = row.try_get("role")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(ConversationMessage {
        user_id: row.try_get("user_id")?,
        department: row.try_get("department")?,
        role: Role::parse(&role)
            .ok_or_else(|| AppError::Database(format!("Unknown message role {:?}", role)))?,
        content: row.try_get("content")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn snapshot_from_row(row: &SqliteRow) -> Result<DashboardSnapshot, AppError> {
    let generated_date: String = row.try_get("generated_date")?;
    let generated_at: String = row.try_get("generated_at")?;
    Ok(DashboardSnapshot {
        department: row.try_get("department")?,
        content: row.try_get("content")?,
        charts_json: row.try_get("charts_json")?,
        generated_date: NaiveDate::parse_from_str(&generated_date, DATE_FORMAT).map_err(|e| {
            AppError::Database(format!("Invalid snapshot date {:?}: {}", generated_date, e))
        })?,
        generated_at: parse_timestamp(&generated_at)?,
    })
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("Invalid timestamp {:?}: {}", s, e)))
}

fn parse_json<T: DeserializeOwned + Default>(s: &str) -> T {
    serde_json::from_str(s).unwrap_or_default()
}
