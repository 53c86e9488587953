//! Fetch boundary to the Search Console snapshot API.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;

use seoboard_core::date_range::DateRange;
use seoboard_core::metrics::MetricRow;
use seoboard_core::snapshot::{parse_snapshot, Dimension};

/// Source of validated snapshot rows. Implemented over HTTP in production and
/// by in-memory fakes in tests.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    async fn fetch_snapshot(
        &self,
        property_id: &str,
        range: &DateRange,
        dimension: Dimension,
    ) -> Result<Vec<MetricRow>>;
}

pub struct HttpSnapshotSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSnapshotSource {
    /// Every request made through this source is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build snapshot HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn snapshot_url(
        &self,
        property_id: &str,
        range: &DateRange,
        dimension: Dimension,
    ) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url).context("Invalid upstream URL")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("upstream URL cannot be a base"))?
            .extend(["properties", property_id, "snapshot"]);
        url.query_pairs_mut()
            .append_pair("from", &range.from.to_string())
            .append_pair("to", &range.to.to_string())
            .append_pair("dimension", dimension.as_str());
        Ok(url)
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    #[tracing::instrument(skip(self))]
    async fn fetch_snapshot(
        &self,
        property_id: &str,
        range: &DateRange,
        dimension: Dimension,
    ) -> Result<Vec<MetricRow>> {
        let url = self.snapshot_url(property_id, range, dimension)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Snapshot request failed")?
            .error_for_status()
            .context("Snapshot endpoint returned an error status")?;
        let body = response
            .bytes()
            .await
            .context("Failed to read snapshot body")?;
        let rows = parse_snapshot(&body).context("Snapshot failed validation")?;
        tracing::debug!(rows = rows.len(), "Snapshot fetched");
        Ok(rows)
    }
}
