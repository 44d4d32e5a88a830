//! Knowledge base document model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded document stored in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub upload_date: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// The slice of a document that grounding context needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentExcerpt {
    pub title: String,
    pub content: String,
    pub upload_date: DateTime<Utc>,
}

impl From<Document> for DocumentExcerpt {
    fn from(doc: Document) -> Self {
        Self {
            title: doc.title,
            content: doc.content,
            upload_date: doc.upload_date,
        }
    }
}

/// Request body for storing a new document.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}
