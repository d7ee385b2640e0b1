//! ScanPipeline type definitions

use crate::parking_space::{ParkingSpace, FALLBACK_RELEASE_TEXT, NOTHING_RELEASED_TEXT};
use crate::vehicle_registry::Vehicle;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Minimum gap between two processed scans of the same vehicle
pub const DEBOUNCE_WINDOW_SECS: i64 = 60;

/// Default budget for one scan (lookup + classification)
pub const DEFAULT_SCAN_TIMEOUT_MS: u64 = 5000;

/// Pipeline settings
#[derive(Debug, Clone)]
pub struct ScanPipelineConfig {
    /// Budget for lookup + classification; on expiry the transaction is
    /// rolled back. Commit runs after the budget.
    pub scan_timeout: Duration,
    /// Release an arbitrary occupied space when the closing stay has none
    pub fallback_release_any: bool,
}

impl Default for ScanPipelineConfig {
    fn default() -> Self {
        Self {
            scan_timeout: Duration::from_millis(DEFAULT_SCAN_TIMEOUT_MS),
            fallback_release_any: false,
        }
    }
}

/// What happened to a space when a stay was closed
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceRelease {
    /// The space recorded on the stay was freed
    Released(ParkingSpace),
    /// The stay had no space; an arbitrary occupied one was freed
    FallbackReleased(ParkingSpace),
    /// Nothing was freed
    Nothing,
}

impl SpaceRelease {
    pub fn description(&self) -> String {
        match self {
            SpaceRelease::Released(space) => space.release_text(),
            SpaceRelease::FallbackReleased(_) => FALLBACK_RELEASE_TEXT.to_string(),
            SpaceRelease::Nothing => NOTHING_RELEASED_TEXT.to_string(),
        }
    }
}

/// Classification result of one scan
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Plate not in the registry; nothing stored
    Unregistered {
        license_plate: String,
        scan_time: DateTime<Utc>,
    },
    /// Within the debounce window of the previous scan; nothing stored
    Ignored {
        license_plate: String,
        scan_time: DateTime<Utc>,
        last_scan: DateTime<Utc>,
    },
    /// New stay opened
    Entry {
        license_plate: String,
        vehicle: Vehicle,
        scan_time: DateTime<Utc>,
        history_id: i64,
        /// None when no space was free
        space: Option<ParkingSpace>,
    },
    /// Open stay closed
    Exit {
        license_plate: String,
        vehicle: Vehicle,
        scan_time: DateTime<Utc>,
        history_id: i64,
        entry_time: DateTime<Utc>,
        duration_hours: f64,
        released: SpaceRelease,
    },
}

impl ScanOutcome {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ScanOutcome::Unregistered { .. } => "unregistered",
            ScanOutcome::Ignored { .. } => "ignored",
            ScanOutcome::Entry { .. } => "entry",
            ScanOutcome::Exit { .. } => "exit",
        }
    }

    pub fn license_plate(&self) -> &str {
        match self {
            ScanOutcome::Unregistered { license_plate, .. }
            | ScanOutcome::Ignored { license_plate, .. }
            | ScanOutcome::Entry { license_plate, .. }
            | ScanOutcome::Exit { license_plate, .. } => license_plate,
        }
    }
}
