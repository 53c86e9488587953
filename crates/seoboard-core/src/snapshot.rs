//! Wire shape of the upstream snapshot endpoint and its validation.
//!
//! Rows are checked once here; everything downstream takes `MetricRow` at
//! face value.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::MetricRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[default]
    Page,
    Query,
    Country,
    Device,
}

impl Dimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Page => "page",
            Dimension::Query => "query",
            Dimension::Country => "country",
            Dimension::Device => "device",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotEnvelope {
    pub snapshot: SnapshotBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotBody {
    #[serde(default)]
    pub data: Vec<MetricRow>,
}

/// Decode and validate a snapshot response body.
pub fn parse_snapshot(body: &[u8]) -> Result<Vec<MetricRow>> {
    let envelope: SnapshotEnvelope = serde_json::from_slice(body)?;
    validate_rows(&envelope.snapshot.data)?;
    Ok(envelope.snapshot.data)
}

pub fn validate_rows(rows: &[MetricRow]) -> Result<()> {
    rows.iter().try_for_each(MetricRow::validate)
}
