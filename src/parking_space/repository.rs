//! ParkingSpace Repository - Database operations
//!
//! Pool-level methods serve the read-only API. The associated functions
//! taking `&mut MySqlConnection` run inside the scan transaction.

use super::types::*;
use crate::error::{Error, Result};
use sqlx::{MySqlConnection, MySqlPool};
use tracing::{debug, warn};

/// Database row for parkingspace
#[derive(Debug, sqlx::FromRow)]
struct SpaceRow {
    id: i64,
    space_number: String,
    level: String,
    is_occupied: bool,
}

impl From<SpaceRow> for ParkingSpace {
    fn from(r: SpaceRow) -> Self {
        Self {
            id: r.id,
            space_number: r.space_number,
            level: r.level,
            is_occupied: r.is_occupied,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LevelRow {
    level: String,
    total: i64,
    occupied: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct MismatchRow {
    space_id: i64,
    space_number: String,
    level: String,
    is_occupied: bool,
    open_stays: i64,
}

#[derive(Clone)]
pub struct ParkingSpaceRepository {
    pool: MySqlPool,
}

impl ParkingSpaceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Read-only queries
    // ========================================================================

    /// List all spaces ordered by level and id
    pub async fn list_all(&self) -> Result<Vec<ParkingSpace>> {
        let rows: Vec<SpaceRow> = sqlx::query_as(
            r#"
            SELECT id, CAST(space_number AS CHAR) AS space_number,
                   CAST(level AS CHAR) AS level, is_occupied
            FROM parkingspace
            ORDER BY level, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(rows.into_iter().map(ParkingSpace::from).collect())
    }

    /// Occupancy counts per level and overall
    pub async fn occupancy_summary(&self) -> Result<OccupancySummary> {
        let rows: Vec<LevelRow> = sqlx::query_as(
            r#"
            SELECT CAST(level AS CHAR) AS level,
                   COUNT(*) AS total,
                   CAST(COALESCE(SUM(is_occupied = 1), 0) AS SIGNED) AS occupied
            FROM parkingspace
            GROUP BY level
            ORDER BY level
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        let levels = rows
            .into_iter()
            .map(|r| LevelOccupancy {
                level: r.level,
                total: r.total,
                occupied: r.occupied,
                free: r.total - r.occupied,
            })
            .collect();

        Ok(OccupancySummary::from_levels(levels))
    }

    /// Spaces whose occupied flag disagrees with the open stays referencing them
    pub async fn integrity_report(&self) -> Result<Vec<OccupancyMismatch>> {
        let rows: Vec<MismatchRow> = sqlx::query_as(
            r#"
            SELECT p.id AS space_id,
                   CAST(p.space_number AS CHAR) AS space_number,
                   CAST(p.level AS CHAR) AS level,
                   p.is_occupied,
                   COUNT(h.id) AS open_stays
            FROM parkingspace p
            LEFT JOIN histories h
                ON h.parking_space_id = p.id AND h.time_out IS NULL
            GROUP BY p.id, p.space_number, p.level, p.is_occupied
            HAVING (p.is_occupied = 1 AND open_stays <> 1)
                OR (p.is_occupied = 0 AND open_stays <> 0)
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if !rows.is_empty() {
            warn!(mismatches = rows.len(), "Occupancy flags disagree with open stays");
        }

        Ok(rows
            .into_iter()
            .map(|r| OccupancyMismatch {
                space_id: r.space_id,
                space_number: r.space_number,
                level: r.level,
                is_occupied: r.is_occupied,
                open_stays: r.open_stays,
            })
            .collect())
    }

    // ========================================================================
    // Scan transaction operations
    // ========================================================================

    /// Pick one free space and lock its row
    ///
    /// Lowest id first. Rows locked by a concurrent entry are skipped so two
    /// entries never pick the same space.
    pub async fn find_free_for_update(conn: &mut MySqlConnection) -> Result<Option<ParkingSpace>> {
        let row: Option<SpaceRow> = sqlx::query_as(
            r#"
            SELECT id, CAST(space_number AS CHAR) AS space_number,
                   CAST(level AS CHAR) AS level, is_occupied
            FROM parkingspace
            WHERE is_occupied = 0
            ORDER BY id
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(row.map(ParkingSpace::from))
    }

    /// Mark a space occupied; fails if it already is
    pub async fn claim(conn: &mut MySqlConnection, space_id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE parkingspace SET is_occupied = 1
            WHERE id = ? AND is_occupied = 0
            "#,
        )
        .bind(space_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::AlreadyOccupied(space_id));
        }

        debug!(space_id = space_id, "Parking space claimed");
        Ok(())
    }

    /// Mark a space free and return its row (None if the space no longer exists)
    pub async fn release(
        conn: &mut MySqlConnection,
        space_id: i64,
    ) -> Result<Option<ParkingSpace>> {
        sqlx::query(
            r#"
            UPDATE parkingspace SET is_occupied = 0 WHERE id = ?
            "#,
        )
        .bind(space_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        let row: Option<SpaceRow> = sqlx::query_as(
            r#"
            SELECT id, CAST(space_number AS CHAR) AS space_number,
                   CAST(level AS CHAR) AS level, is_occupied
            FROM parkingspace
            WHERE id = ?
            "#,
        )
        .bind(space_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!(space_id = space_id, found = row.is_some(), "Parking space released");
        Ok(row.map(ParkingSpace::from))
    }

    /// Legacy fallback: free one arbitrary occupied space
    pub async fn release_any_occupied(conn: &mut MySqlConnection) -> Result<Option<ParkingSpace>> {
        let row: Option<SpaceRow> = sqlx::query_as(
            r#"
            SELECT id, CAST(space_number AS CHAR) AS space_number,
                   CAST(level AS CHAR) AS level, is_occupied
            FROM parkingspace
            WHERE is_occupied = 1
            ORDER BY id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query("UPDATE parkingspace SET is_occupied = 0 WHERE id = ?")
            .bind(row.id)
            .execute(&mut *conn)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        warn!(space_id = row.id, "Fallback release of an arbitrary occupied space");

        let mut space = ParkingSpace::from(row);
        space.is_occupied = false;
        Ok(Some(space))
    }
}
