//! Data models for the Virtual Department Representatives backend.
//!
//! Field names serialize in snake_case, the keys the frontend reads.

mod chart;
mod conversation;
mod dashboard;
mod document;

pub use chart::*;
pub use conversation::*;
pub use dashboard::*;
pub use document::*;
