//! MySQL implementation of the scan storage seam

use super::store::{ScanStore, ScanTransaction};
use crate::error::{Error, Result};
use crate::history_ledger::{HistoryLedgerRepository, HistoryRecord, LastScan};
use crate::parking_space::{ParkingSpace, ParkingSpaceRepository};
use crate::vehicle_registry::{Vehicle, VehicleRegistryRepository};
use chrono::{DateTime, Utc};
use sqlx::{MySql, MySqlPool, Transaction};

/// Scan store backed by the shared MySQL pool
#[derive(Clone)]
pub struct MySqlScanStore {
    pool: MySqlPool,
    registry: VehicleRegistryRepository,
}

impl MySqlScanStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            registry: VehicleRegistryRepository::new(pool.clone()),
            pool,
        }
    }
}

/// A MySQL transaction; rolled back by sqlx when dropped uncommitted
pub struct MySqlScanTx {
    tx: Transaction<'static, MySql>,
}

impl ScanStore for MySqlScanStore {
    type Tx = MySqlScanTx;

    async fn lookup_vehicle(&self, license_plate: &str) -> Result<Option<Vehicle>> {
        self.registry.get_by_plate(license_plate).await
    }

    async fn begin(&self) -> Result<MySqlScanTx> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(MySqlScanTx { tx })
    }
}

impl ScanTransaction for MySqlScanTx {
    async fn lock_vehicle(&mut self, vehicle_id: i64) -> Result<bool> {
        VehicleRegistryRepository::lock_for_scan(&mut self.tx, vehicle_id).await
    }

    async fn most_recent_scan(&mut self, vehicle_id: i64) -> Result<Option<LastScan>> {
        HistoryLedgerRepository::most_recent_scan(&mut self.tx, vehicle_id).await
    }

    async fn open_stay(&mut self, vehicle_id: i64) -> Result<Option<HistoryRecord>> {
        HistoryLedgerRepository::open_stay(&mut self.tx, vehicle_id).await
    }

    async fn create_entry(
        &mut self,
        vehicle_id: i64,
        time_in: DateTime<Utc>,
        parking_space_id: Option<i64>,
    ) -> Result<HistoryRecord> {
        HistoryLedgerRepository::create_entry(&mut self.tx, vehicle_id, time_in, parking_space_id)
            .await
    }

    async fn close_stay(&mut self, record_id: i64, time_out: DateTime<Utc>) -> Result<()> {
        HistoryLedgerRepository::close_stay(&mut self.tx, record_id, time_out).await
    }

    async fn find_free_space(&mut self) -> Result<Option<ParkingSpace>> {
        ParkingSpaceRepository::find_free_for_update(&mut self.tx).await
    }

    async fn claim_space(&mut self, space_id: i64) -> Result<()> {
        ParkingSpaceRepository::claim(&mut self.tx, space_id).await
    }

    async fn release_space(&mut self, space_id: i64) -> Result<Option<ParkingSpace>> {
        ParkingSpaceRepository::release(&mut self.tx, space_id).await
    }

    async fn release_any_occupied(&mut self) -> Result<Option<ParkingSpace>> {
        ParkingSpaceRepository::release_any_occupied(&mut self.tx).await
    }

    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}
