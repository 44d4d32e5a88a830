//! Grounding context assembly.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::DocumentExcerpt;

/// Returned in place of document blocks when the knowledge base is empty.
pub const EMPTY_KNOWLEDGE_BASE: &str = "No documents available in the knowledge base yet.";

/// Read access to stored documents.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Up to `limit` documents, most recently uploaded first.
    async fn list_recent_documents(&self, limit: usize) -> Result<Vec<DocumentExcerpt>, AppError>;
}

/// Fetch the `limit` most recent documents and render them as one text block.
pub async fn assemble_context(source: &dyn DocumentSource, limit: usize) -> Result<String, AppError> {
    let limit = limit.max(1);
    let mut docs = source.list_recent_documents(limit).await?;

    // Stable sort keeps the store's tie order for equal timestamps.
    docs.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
    docs.truncate(limit);

    tracing::debug!("Assembled context from {} documents", docs.len());
    Ok(render_context(&docs))
}

/// Render documents in the given order, one labeled block each.
pub fn render_context(docs: &[DocumentExcerpt]) -> String {
    if docs.is_empty() {
        return EMPTY_KNOWLEDGE_BASE.to_string();
    }

    docs.iter()
        .map(|doc| {
            format!(
                "--- {} (uploaded {}) ---\n{}",
                doc.title,
                doc.upload_date.format("%Y-%m-%d %H:%M:%S UTC"),
                doc.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
