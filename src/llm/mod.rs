//! LLM orchestration.
//!
//! Grounding context is assembled from the most recent documents, wrapped in a
//! department persona or dashboard template, and sent to an ordered list of
//! models until one answers. Dashboard chart data is pulled out of the reply
//! on a best-effort basis.

mod backend;
mod charts;
mod context;
mod invoker;
mod prompt;
mod service;

pub use backend::*;
pub use charts::*;
pub use context::*;
pub use invoker::*;
pub use prompt::*;
pub use service::*;

use thiserror::Error;

use crate::errors::AppError;

/// Failures the orchestration layer lets escape to its callers.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Unknown department: {0}")]
    UnknownDepartment(String),

    #[error(transparent)]
    ModelUnavailable(#[from] ModelUnavailable),

    #[error("Knowledge base unavailable: {0}")]
    Store(#[from] AppError),
}
