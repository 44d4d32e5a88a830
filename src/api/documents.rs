//! Knowledge base document endpoints.

use axum::extract::{Multipart, Path, State};
use axum::Json;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateDocumentRequest, Document};
use crate::AppState;

/// Upload field carrying the file.
const FILE_FIELD: &str = "file";

const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// GET /api/documents - List all documents, newest first.
pub async fn list_documents(State(state): State<AppState>) -> ApiResult<Vec<Document>> {
    success(state.repo.list_documents().await?)
}

/// GET /api/documents/{id} - Get a single document.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Document> {
    match state.repo.get_document(&id).await? {
        Some(document) => success(document),
        None => Err(AppError::NotFound(format!("Document {} not found", id))),
    }
}

/// POST /api/documents - Store a document from JSON.
pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> ApiResult<Document> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".to_string()));
    }

    success(state.repo.create_document(&request).await?)
}

/// POST /api/upload/document - Store an uploaded text, Markdown or PDF file.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Document> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Uploaded file has no name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let content = extract_text(&filename, &bytes)?;
        if content.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is empty", filename)));
        }
        let request = CreateDocumentRequest {
            title: filename,
            content,
            tags: Vec::new(),
            metadata: Default::default(),
        };
        return success(state.repo.create_document(&request).await?);
    }

    Err(AppError::Validation(format!(
        "Multipart field '{}' is required",
        FILE_FIELD
    )))
}

/// DELETE /api/documents/{id} - Delete a document.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_document(&id).await?;
    success(())
}

/// Decode an uploaded file into plain text based on its extension.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        ext if TEXT_EXTENSIONS.contains(&ext) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::BadRequest(format!("Could not read PDF {:?}: {}", filename, e))),
        _ => Err(AppError::UnsupportedMedia(format!(
            "Unsupported file type: {:?}. Allowed: .txt, .md, .pdf",
            filename
        ))),
    }
}
