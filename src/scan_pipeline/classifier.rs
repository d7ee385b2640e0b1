//! Scan classification rules
//!
//! `classify_registered` is the state machine for a registered vehicle. It
//! runs against an open `ScanTransaction` and leaves commit/rollback to the
//! caller.

use super::store::ScanTransaction;
use super::types::*;
use crate::error::Result;
use crate::history_ledger::{parking_duration_hours, HistoryRecord};
use crate::vehicle_registry::Vehicle;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

/// Trim the plate sent by the capture client
///
/// Nothing is rejected here: an empty or unknown plate simply fails the
/// registry lookup and is classified as unregistered.
pub fn normalize_plate(raw: &str) -> String {
    raw.trim().to_string()
}

/// True if `scan_time` falls inside the debounce window after `last_scan`
///
/// A scan dated before the last one (clock skew) is also debounced.
pub fn is_debounced(last_scan: DateTime<Utc>, scan_time: DateTime<Utc>) -> bool {
    scan_time - last_scan < Duration::seconds(DEBOUNCE_WINDOW_SECS)
}

/// Classify a scan of a registered vehicle and apply its mutation
pub async fn classify_registered<T: ScanTransaction>(
    tx: &mut T,
    vehicle: Vehicle,
    license_plate: &str,
    scan_time: DateTime<Utc>,
    config: &ScanPipelineConfig,
) -> Result<ScanOutcome> {
    if !tx.lock_vehicle(vehicle.id).await? {
        info!(license_plate = %license_plate, "Vehicle removed from registry during scan");
        return Ok(ScanOutcome::Unregistered {
            license_plate: license_plate.to_string(),
            scan_time,
        });
    }

    if let Some(last) = tx.most_recent_scan(vehicle.id).await? {
        if is_debounced(last.last_timestamp, scan_time) {
            debug!(
                license_plate = %license_plate,
                last_scan = %last.last_timestamp,
                "Same vehicle within debounce window"
            );
            return Ok(ScanOutcome::Ignored {
                license_plate: license_plate.to_string(),
                scan_time,
                last_scan: last.last_timestamp,
            });
        }
    }

    match tx.open_stay(vehicle.id).await? {
        Some(record) => exit(tx, vehicle, record, license_plate, scan_time, config).await,
        None => entry(tx, vehicle, license_plate, scan_time).await,
    }
}

async fn exit<T: ScanTransaction>(
    tx: &mut T,
    vehicle: Vehicle,
    record: HistoryRecord,
    license_plate: &str,
    scan_time: DateTime<Utc>,
    config: &ScanPipelineConfig,
) -> Result<ScanOutcome> {
    tx.close_stay(record.id, scan_time).await?;

    let released = match record.parking_space_id {
        Some(space_id) => match tx.release_space(space_id).await? {
            Some(space) => SpaceRelease::Released(space),
            None => SpaceRelease::Nothing,
        },
        None if config.fallback_release_any => match tx.release_any_occupied().await? {
            Some(space) => SpaceRelease::FallbackReleased(space),
            None => SpaceRelease::Nothing,
        },
        None => SpaceRelease::Nothing,
    };

    Ok(ScanOutcome::Exit {
        license_plate: license_plate.to_string(),
        duration_hours: parking_duration_hours(record.time_in, scan_time),
        entry_time: record.time_in,
        history_id: record.id,
        vehicle,
        scan_time,
        released,
    })
}

async fn entry<T: ScanTransaction>(
    tx: &mut T,
    vehicle: Vehicle,
    license_plate: &str,
    scan_time: DateTime<Utc>,
) -> Result<ScanOutcome> {
    let space = tx.find_free_space().await?;

    if let Some(space) = &space {
        tx.claim_space(space.id).await?;
    }

    let record = tx
        .create_entry(vehicle.id, scan_time, space.as_ref().map(|s| s.id))
        .await?;

    Ok(ScanOutcome::Entry {
        license_plate: license_plate.to_string(),
        vehicle,
        scan_time,
        history_id: record.id,
        space: space.map(|mut s| {
            s.is_occupied = true;
            s
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 1, 0, 0).unwrap()
    }

    #[test]
    fn test_normalize_plate_trims() {
        assert_eq!(normalize_plate("  51F-99999 \n"), "51F-99999");
    }

    #[test]
    fn test_normalize_plate_keeps_empty_and_long_plates() {
        assert_eq!(normalize_plate("   "), "");
        assert_eq!(normalize_plate("ABCDEFGHIJKLMNOPQRSTUVWXY"), "ABCDEFGHIJKLMNOPQRSTUVWXY");
    }

    #[test]
    fn test_debounce_window_boundary() {
        assert!(is_debounced(t0(), t0()));
        assert!(is_debounced(t0(), t0() + Duration::seconds(59)));
        assert!(!is_debounced(t0(), t0() + Duration::seconds(60)));
        assert!(!is_debounced(t0(), t0() + Duration::seconds(90)));
    }

    #[test]
    fn test_scan_before_last_is_debounced() {
        assert!(is_debounced(t0(), t0() - Duration::seconds(300)));
    }
}
