//! ParkingSpace type definitions

use serde::{Deserialize, Serialize};

/// Parking space row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpace {
    pub id: i64,
    /// Human-readable number painted on the bay
    pub space_number: String,
    /// Level / floor
    pub level: String,
    pub is_occupied: bool,
}

impl ParkingSpace {
    /// Text shown to the driver when this space is assigned at entry
    pub fn assignment_text(&self) -> String {
        format!("Sẽ đỗ tại chỗ {} - Tầng {}", self.space_number, self.level)
    }

    /// Text shown when this space is released at exit
    pub fn release_text(&self) -> String {
        format!("Chỗ đỗ {} đã được giải phóng", self.space_number)
    }
}

/// Entry with no free space left
pub const NO_FREE_SPACE_TEXT: &str = "Không tìm thấy chỗ đỗ trống";

/// Entry text for the space picked at entry, if any
pub fn entry_space_text(space: Option<&ParkingSpace>) -> String {
    match space {
        Some(space) => space.assignment_text(),
        None => NO_FREE_SPACE_TEXT.to_string(),
    }
}

/// Exit that released an arbitrary occupied space (legacy fallback)
pub const FALLBACK_RELEASE_TEXT: &str = "Một chỗ đỗ đã được giải phóng";

/// Exit of a stay that never held a space
pub const NOTHING_RELEASED_TEXT: &str = "Không có chỗ đỗ nào được giải phóng";

/// Occupancy counts for one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelOccupancy {
    pub level: String,
    pub total: i64,
    pub occupied: i64,
    pub free: i64,
}

/// Occupancy counts for the whole car park
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancySummary {
    pub total: i64,
    pub occupied: i64,
    pub free: i64,
    pub levels: Vec<LevelOccupancy>,
}

impl OccupancySummary {
    /// Aggregate per-level rows into the overall summary
    pub fn from_levels(levels: Vec<LevelOccupancy>) -> Self {
        let total = levels.iter().map(|l| l.total).sum();
        let occupied = levels.iter().map(|l| l.occupied).sum();
        Self {
            total,
            occupied,
            free: total - occupied,
            levels,
        }
    }
}

/// A space whose occupied flag disagrees with the open stays referencing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyMismatch {
    pub space_id: i64,
    pub space_number: String,
    pub level: String,
    pub is_occupied: bool,
    /// Number of open history records referencing the space
    pub open_stays: i64,
}
