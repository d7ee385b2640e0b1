//! VehicleRegistry Repository
//!
//! Plate lookup against the vehicles table

use super::types::Vehicle;
use crate::error::{Error, Result};
use sqlx::{MySqlConnection, MySqlPool};

/// VehicleRegistry Repository
#[derive(Clone)]
pub struct VehicleRegistryRepository {
    pool: MySqlPool,
}

impl VehicleRegistryRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Look up a vehicle by its license plate
    ///
    /// `Ok(None)` means the plate is not registered. A query failure is an
    /// `Err`, never a `None`.
    pub async fn get_by_plate(&self, license_plate: &str) -> Result<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            SELECT
                v.id, v.license_plate, v.vehicle_type,
                CAST(v.user_id AS CHAR) AS user_id,
                u.name AS vehicle_owner
            FROM vehicles v
            LEFT JOIN users u ON v.user_id = u.id
            WHERE v.license_plate = ?
            "#,
        )
        .bind(license_plate)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.map(Vehicle::from))
    }

    /// Take a row lock on the vehicle inside a scan transaction
    ///
    /// Concurrent scans of the same vehicle queue up here until the holder
    /// commits or rolls back. Returns false if the vehicle row is gone.
    pub async fn lock_for_scan(conn: &mut MySqlConnection, vehicle_id: i64) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM vehicles WHERE id = ? FOR UPDATE
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.is_some())
    }
}

/// Row mapping for the vehicles query
#[derive(sqlx::FromRow)]
struct VehicleRow {
    id: i64,
    license_plate: String,
    vehicle_type: String,
    user_id: String,
    vehicle_owner: Option<String>,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        Self {
            id: row.id,
            license_plate: row.license_plate,
            vehicle_type: row.vehicle_type,
            user_id: row.user_id,
            vehicle_owner: row.vehicle_owner,
        }
    }
}
