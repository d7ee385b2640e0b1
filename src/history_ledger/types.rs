//! HistoryLedger type definitions

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One vehicle stay (histories row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub vehicle_id: i64,
    pub time_in: DateTime<Utc>,
    /// None while the vehicle is parked
    pub time_out: Option<DateTime<Utc>>,
    /// None if no space was free at entry
    pub parking_space_id: Option<i64>,
}

impl HistoryRecord {
    pub fn is_open(&self) -> bool {
        self.time_out.is_none()
    }

    /// Timestamp of the last scan this record represents
    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.time_out.unwrap_or(self.time_in)
    }
}

/// Most recent scan of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastScan {
    /// `COALESCE(time_out, time_in)` of the newest record
    pub last_timestamp: DateTime<Utc>,
}

/// Stay as shown by the history endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayView {
    pub id: i64,
    pub license_plate: String,
    pub time_in: DateTime<Utc>,
    pub time_out: Option<DateTime<Utc>>,
    pub parking_space_id: Option<i64>,
    pub space_number: Option<String>,
    pub level: Option<String>,
    /// Hours parked, one decimal; None while still parked
    pub duration_hours: Option<f64>,
}

/// Hours between entry and exit, rounded to one decimal
pub fn parking_duration_hours(time_in: DateTime<Utc>, time_out: DateTime<Utc>) -> f64 {
    let seconds = (time_out - time_in).num_milliseconds() as f64 / 1000.0;
    (seconds / 3600.0 * 10.0).round() / 10.0
}

/// Reduce the open records of one vehicle to at most one
///
/// Two or more open records break the one-active-stay invariant and are
/// reported as `DataIntegrity`, never resolved by picking one.
pub fn single_open_stay(
    vehicle_id: i64,
    mut open: Vec<HistoryRecord>,
) -> Result<Option<HistoryRecord>> {
    match open.len() {
        0 => Ok(None),
        1 => Ok(open.pop()),
        n => {
            let ids: Vec<String> = open.iter().map(|r| r.id.to_string()).collect();
            tracing::error!(
                vehicle_id = vehicle_id,
                open_stays = n,
                record_ids = %ids.join(","),
                "Multiple open stays for one vehicle"
            );
            Err(Error::DataIntegrity(format!(
                "vehicle {} has {} open stays (records {})",
                vehicle_id,
                n,
                ids.join(", ")
            )))
        }
    }
}
