//! HistoryLedger Repository - Database operations

use super::types::*;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{MySqlConnection, MySqlPool};
use tracing::debug;

/// Database row for histories
#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    vehicle_id: i64,
    time_in: DateTime<Utc>,
    time_out: Option<DateTime<Utc>>,
    parking_space_id: Option<i64>,
}

impl From<HistoryRow> for HistoryRecord {
    fn from(r: HistoryRow) -> Self {
        Self {
            id: r.id,
            vehicle_id: r.vehicle_id,
            time_in: r.time_in,
            time_out: r.time_out,
            parking_space_id: r.parking_space_id,
        }
    }
}

/// Database row for the stay listings (histories JOIN vehicles, parkingspace)
#[derive(Debug, sqlx::FromRow)]
struct StayRow {
    id: i64,
    license_plate: String,
    time_in: DateTime<Utc>,
    time_out: Option<DateTime<Utc>>,
    parking_space_id: Option<i64>,
    space_number: Option<String>,
    level: Option<String>,
}

impl From<StayRow> for StayView {
    fn from(r: StayRow) -> Self {
        Self {
            duration_hours: r.time_out.map(|out| parking_duration_hours(r.time_in, out)),
            id: r.id,
            license_plate: r.license_plate,
            time_in: r.time_in,
            time_out: r.time_out,
            parking_space_id: r.parking_space_id,
            space_number: r.space_number,
            level: r.level,
        }
    }
}

#[derive(Clone)]
pub struct HistoryLedgerRepository {
    pool: MySqlPool,
}

impl HistoryLedgerRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Read-only queries
    // ========================================================================

    /// Stays of one vehicle, newest first
    pub async fn list_by_plate(&self, license_plate: &str, limit: u32) -> Result<Vec<StayView>> {
        let rows: Vec<StayRow> = sqlx::query_as(
            r#"
            SELECT h.id, v.license_plate, h.time_in, h.time_out, h.parking_space_id,
                   CAST(p.space_number AS CHAR) AS space_number,
                   CAST(p.level AS CHAR) AS level
            FROM histories h
            JOIN vehicles v ON h.vehicle_id = v.id
            LEFT JOIN parkingspace p ON h.parking_space_id = p.id
            WHERE v.license_plate = ?
            ORDER BY h.time_in DESC
            LIMIT ?
            "#,
        )
        .bind(license_plate)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows.into_iter().map(StayView::from).collect())
    }

    /// All open stays (vehicles currently parked)
    pub async fn list_active(&self) -> Result<Vec<StayView>> {
        let rows: Vec<StayRow> = sqlx::query_as(
            r#"
            SELECT h.id, v.license_plate, h.time_in, h.time_out, h.parking_space_id,
                   CAST(p.space_number AS CHAR) AS space_number,
                   CAST(p.level AS CHAR) AS level
            FROM histories h
            JOIN vehicles v ON h.vehicle_id = v.id
            LEFT JOIN parkingspace p ON h.parking_space_id = p.id
            WHERE h.time_out IS NULL
            ORDER BY h.time_in
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows.into_iter().map(StayView::from).collect())
    }

    // ========================================================================
    // Scan transaction operations
    // ========================================================================

    /// Most recent scan of a vehicle: exit time if the newest record is
    /// closed, else its entry time
    pub async fn most_recent_scan(
        conn: &mut MySqlConnection,
        vehicle_id: i64,
    ) -> Result<Option<LastScan>> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT COALESCE(time_out, time_in) AS last_timestamp
            FROM histories
            WHERE vehicle_id = ?
            ORDER BY COALESCE(time_out, time_in) DESC
            LIMIT 1
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.map(|(last_timestamp,)| LastScan { last_timestamp }))
    }

    /// The open stay of a vehicle, locked for update
    pub async fn open_stay(
        conn: &mut MySqlConnection,
        vehicle_id: i64,
    ) -> Result<Option<HistoryRecord>> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT id, vehicle_id, time_in, time_out, parking_space_id
            FROM histories
            WHERE vehicle_id = ? AND time_out IS NULL
            ORDER BY time_in DESC
            FOR UPDATE
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        single_open_stay(vehicle_id, rows.into_iter().map(HistoryRecord::from).collect())
    }

    /// Insert a new open stay
    pub async fn create_entry(
        conn: &mut MySqlConnection,
        vehicle_id: i64,
        time_in: DateTime<Utc>,
        parking_space_id: Option<i64>,
    ) -> Result<HistoryRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO histories (vehicle_id, time_in, parking_space_id)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(vehicle_id)
        .bind(time_in)
        .bind(parking_space_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|_| Error::Internal("history id out of range".to_string()))?;

        debug!(history_id = id, vehicle_id = vehicle_id, "Stay opened");

        Ok(HistoryRecord {
            id,
            vehicle_id,
            time_in,
            time_out: None,
            parking_space_id,
        })
    }

    /// Set the exit time of an open stay; fails if it is already closed
    pub async fn close_stay(
        conn: &mut MySqlConnection,
        record_id: i64,
        time_out: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE histories SET time_out = ?
            WHERE id = ? AND time_out IS NULL
            "#,
        )
        .bind(time_out)
        .bind(record_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::AlreadyClosed(record_id));
        }

        debug!(history_id = record_id, "Stay closed");
        Ok(())
    }
}
