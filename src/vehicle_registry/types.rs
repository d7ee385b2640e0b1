//! VehicleRegistry type definitions

use serde::{Deserialize, Serialize};

/// Registered vehicle (vehicles LEFT JOIN users)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub license_plate: String,
    pub vehicle_type: String,
    /// Owning account (users.id)
    pub user_id: String,
    /// Owning account display name, None when the account row is missing
    pub vehicle_owner: Option<String>,
}

/// Status text shown for a registered plate
pub const STATUS_REGISTERED: &str = "Xe đã đăng ký";

/// Status text shown for an unknown plate
pub const STATUS_UNREGISTERED: &str = "Xe chưa đăng ký";
