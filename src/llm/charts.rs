//! Chart JSON extraction from free-form model output.
//!
//! Looks for the first plausible top-level array and parses it strictly, once.
//! This is not a lenient JSON parser.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartParseError {
    #[error("no JSON array found in model output")]
    NoArray,

    #[error("invalid chart JSON: {0}")]
    InvalidJson(String),
}

/// Parse chart objects out of a model reply.
pub fn parse_charts(raw: &str) -> Result<Vec<Value>, ChartParseError> {
    let cleaned = strip_code_fences(raw);

    let start = cleaned.find('[').ok_or(ChartParseError::NoArray)?;
    let end = cleaned.rfind(']').ok_or(ChartParseError::NoArray)?;
    if end < start {
        return Err(ChartParseError::NoArray);
    }

    serde_json::from_str::<Vec<Value>>(&cleaned[start..=end])
        .map_err(|e| ChartParseError::InvalidJson(e.to_string()))
}

/// Like [`parse_charts`], but any failure yields no charts.
pub fn extract_charts(raw: &str) -> Vec<Value> {
    match parse_charts(raw) {
        Ok(charts) => charts,
        Err(e) => {
            tracing::warn!("Discarding chart output: {}", e);
            Vec::new()
        }
    }
}

/// Remove ``` markers (and the language tag after an opening fence), then trim.
fn strip_code_fences(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 3..];
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);

    out.trim().trim_end_matches('`').trim().to_string()
}
