//! ScanPipeline service
//!
//! Runs one scan end to end: normalize, classify under a time budget,
//! commit, broadcast.

use super::classifier::{classify_registered, normalize_plate};
use super::payload::hub_message;
use super::store::{ScanStore, ScanTransaction};
use super::types::*;
use crate::error::{Error, Result};
use crate::realtime_hub::RealtimeHub;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{info, warn};

/// Entrance/exit pipeline
pub struct ScanPipeline<S: ScanStore> {
    store: S,
    realtime: Arc<RealtimeHub>,
    config: ScanPipelineConfig,
}

impl<S: ScanStore> ScanPipeline<S> {
    pub fn new(store: S, realtime: Arc<RealtimeHub>, config: ScanPipelineConfig) -> Self {
        Self {
            store,
            realtime,
            config,
        }
    }

    pub fn config(&self) -> &ScanPipelineConfig {
        &self.config
    }

    /// Process one scan
    ///
    /// On any error the transaction has been rolled back and nothing is
    /// broadcast. On success the outcome has been committed and, unless it
    /// is `Ignored`, published to RealtimeHub.
    ///
    /// The time budget covers the lookup and the classification. Commit runs
    /// after it, so a scan is never reported as timed out once COMMIT has
    /// been sent.
    pub async fn process(&self, raw_plate: &str, scan_time: DateTime<Utc>) -> Result<ScanOutcome> {
        let license_plate = normalize_plate(raw_plate);
        let budget = self.config.scan_timeout;

        let (outcome, tx) = match timeout(budget, self.classify(&license_plate, scan_time)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    license_plate = %license_plate,
                    timeout_ms = budget.as_millis() as u64,
                    "Scan processing timed out, transaction rolled back"
                );
                return Err(Error::Timeout(format!(
                    "scan of {} exceeded {} ms",
                    license_plate,
                    budget.as_millis()
                )));
            }
        };

        if let Some(tx) = tx {
            tx.commit().await?;
        }

        info!(
            license_plate = %license_plate,
            outcome = outcome.kind(),
            "Scan classified"
        );

        if let Some(message) = hub_message(&outcome) {
            self.realtime.broadcast(message).await;
        }

        Ok(outcome)
    }

    /// Classify inside an open transaction; the caller commits it
    ///
    /// Unregistered plates never open a transaction.
    async fn classify(
        &self,
        license_plate: &str,
        scan_time: DateTime<Utc>,
    ) -> Result<(ScanOutcome, Option<S::Tx>)> {
        let Some(vehicle) = self.store.lookup_vehicle(license_plate).await? else {
            let outcome = ScanOutcome::Unregistered {
                license_plate: license_plate.to_string(),
                scan_time,
            };
            return Ok((outcome, None));
        };

        let mut tx = self.store.begin().await?;
        let outcome =
            classify_registered(&mut tx, vehicle, license_plate, scan_time, &self.config).await?;

        Ok((outcome, Some(tx)))
    }
}
