//! Chart specification and chart data models.

use serde::{Deserialize, Serialize};

/// Supported chart renderings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Bar,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::Bar => "bar",
        }
    }
}

/// A chart a department dashboard asks the model to populate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub id: &'static str,
    pub kind: ChartKind,
    pub title: &'static str,
    pub instruction: &'static str,
}

/// Chart data extracted from model output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartDataEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartDataEntry {
    /// Entries are renderable only when every label has a value.
    pub fn is_consistent(&self) -> bool {
        self.labels.len() == self.values.len()
    }

    /// Decode loosely-typed chart objects, dropping anything malformed or inconsistent.
    pub fn from_values(values: Vec<serde_json::Value>) -> Vec<Self> {
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<ChartDataEntry>(value) {
                Ok(entry) if entry.is_consistent() => Some(entry),
                Ok(entry) => {
                    tracing::warn!(
                        "Dropping chart {}: {} labels but {} values",
                        entry.id,
                        entry.labels.len(),
                        entry.values.len()
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!("Dropping malformed chart entry: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Decode a stored `charts_json` column; unreadable text yields no charts.
    pub fn from_charts_json(charts_json: &str) -> Vec<Self> {
        match serde_json::from_str::<Vec<serde_json::Value>>(charts_json) {
            Ok(values) => Self::from_values(values),
            Err(e) => {
                tracing::warn!("Stored charts_json is not a JSON array: {}", e);
                Vec::new()
            }
        }
    }
}
