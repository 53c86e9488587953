use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use seoboard_core::date_range::DateRange;
use seoboard_core::filter::BrandFilter;
use seoboard_core::metrics::MetricRow;
use seoboard_core::snapshot::Dimension;

use crate::config::Config;
use crate::debounce::ScopedDebounce;
use crate::error::AppError;
use crate::sequencer::{RequestSequencer, Ticket};
use crate::upstream::SnapshotSource;

/// The last rows applied for one property and dimension.
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub range: DateRange,
    pub rows: Arc<Vec<MetricRow>>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RefreshStatus {
    Scheduled { requested_at: DateTime<Utc> },
    Ready { fetched_at: DateTime<Utc>, rows: usize },
    Failed { failed_at: DateTime<Utc>, message: String },
}

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Only raw snapshots are kept; every report is recomputed from them on
/// request.
pub struct AppState {
    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    pub source: Arc<dyn SnapshotSource>,

    /// Brand terms from `SEOBOARD_BRAND_TERMS`, used when a request brings none.
    pub brand_filter: BrandFilter,

    snapshots: RwLock<HashMap<String, StoredSnapshot>>,
    refresh_status: RwLock<HashMap<String, RefreshStatus>>,
    sequencer: RequestSequencer,
    debounce: ScopedDebounce,
}

pub fn snapshot_key(property_id: &str, dimension: Dimension) -> String {
    format!("{property_id}:{}", dimension.as_str())
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            brand_filter: BrandFilter::parse(&config.brand_terms),
            config: Arc::new(config),
            source,
            snapshots: RwLock::new(HashMap::new()),
            refresh_status: RwLock::new(HashMap::new()),
            sequencer: RequestSequencer::new(),
            debounce: ScopedDebounce::new(),
        }
    }

    pub fn snapshot(&self, property_id: &str, dimension: Dimension) -> Option<StoredSnapshot> {
        let snapshots = self.snapshots.read().unwrap_or_else(|e| e.into_inner());
        snapshots.get(&snapshot_key(property_id, dimension)).cloned()
    }

    pub fn refresh_status(
        &self,
        property_id: &str,
        dimension: Dimension,
    ) -> Option<RefreshStatus> {
        let status = self.refresh_status.read().unwrap_or_else(|e| e.into_inner());
        status.get(&snapshot_key(property_id, dimension)).cloned()
    }

    fn set_status(&self, key: &str, status: RefreshStatus) {
        let mut map = self.refresh_status.write().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), status);
    }

    /// Fetch a snapshot and store it unless a newer refresh for the same
    /// property and dimension was started while this one was in flight.
    ///
    /// Returns whether the rows were applied.
    pub async fn refresh_snapshot(
        &self,
        property_id: &str,
        range: DateRange,
        dimension: Dimension,
    ) -> Result<bool, AppError> {
        let ticket = self.sequencer.begin(&snapshot_key(property_id, dimension));
        self.fetch_and_apply(ticket, property_id, range, dimension)
            .await
    }

    /// Status and snapshot writes happen inside `apply_if_current`, so a
    /// superseded ticket can touch neither.
    async fn fetch_and_apply(
        &self,
        ticket: Ticket,
        property_id: &str,
        range: DateRange,
        dimension: Dimension,
    ) -> Result<bool, AppError> {
        let key = snapshot_key(property_id, dimension);

        let rows = match self
            .source
            .fetch_snapshot(property_id, &range, dimension)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                let message = format!("{e:#}");
                self.sequencer.apply_if_current(&ticket, || {
                    self.set_status(
                        &key,
                        RefreshStatus::Failed {
                            failed_at: Utc::now(),
                            message: message.clone(),
                        },
                    );
                });
                return Err(AppError::Upstream(message));
            }
        };

        let row_count = rows.len();
        let fetched_at = Utc::now();
        let applied = self.sequencer.apply_if_current(&ticket, || {
            let mut snapshots = self.snapshots.write().unwrap_or_else(|e| e.into_inner());
            snapshots.insert(
                key.clone(),
                StoredSnapshot {
                    range,
                    rows: Arc::new(rows),
                    fetched_at,
                },
            );
            drop(snapshots);
            self.set_status(
                &key,
                RefreshStatus::Ready {
                    fetched_at,
                    rows: row_count,
                },
            );
        });

        if applied {
            info!(key = %key, rows = row_count, "Snapshot applied");
        } else {
            info!(key = %key, seq = ticket.seq(), "Discarded stale snapshot response");
        }
        Ok(applied)
    }

    /// Debounced refresh: bursts for the same property and dimension
    /// collapse into the last request.
    ///
    /// The ticket is taken now, not when the debounce fires, so any refresh
    /// already in flight is superseded from this point on.
    pub fn schedule_refresh(
        self: &Arc<Self>,
        property_id: &str,
        range: DateRange,
        dimension: Dimension,
    ) {
        let key = snapshot_key(property_id, dimension);
        let ticket = self.sequencer.begin(&key);
        self.sequencer.apply_if_current(&ticket, || {
            self.set_status(
                &key,
                RefreshStatus::Scheduled {
                    requested_at: Utc::now(),
                },
            );
        });

        let state = Arc::clone(self);
        let property_id = property_id.to_string();
        self.debounce
            .schedule(&key, self.config.refresh_debounce(), async move {
                if let Err(e) = state
                    .fetch_and_apply(ticket, &property_id, range, dimension)
                    .await
                {
                    error!(property_id = %property_id, error = %e, "Scheduled refresh failed");
                }
            });
    }
}
