//! Storage seam for the scan pipeline

use crate::error::Result;
use crate::history_ledger::{HistoryRecord, LastScan};
use crate::parking_space::ParkingSpace;
use crate::vehicle_registry::Vehicle;
use chrono::{DateTime, Utc};
use std::future::Future;

/// Entry point to the registry and to scan transactions
pub trait ScanStore: Send + Sync {
    type Tx: ScanTransaction;

    /// Registry lookup; `Ok(None)` = unregistered plate
    fn lookup_vehicle(
        &self,
        license_plate: &str,
    ) -> impl Future<Output = Result<Option<Vehicle>>> + Send;

    /// Open a transaction scope
    fn begin(&self) -> impl Future<Output = Result<Self::Tx>> + Send;
}

/// One scan's transaction scope
///
/// Every mutation of one scan goes through a single value of this type.
/// Nothing is visible to other scans until `commit`; dropping the value
/// discards all of it.
pub trait ScanTransaction: Send {
    /// Serialize scans of one vehicle. False if the vehicle row is gone.
    fn lock_vehicle(&mut self, vehicle_id: i64) -> impl Future<Output = Result<bool>> + Send;

    fn most_recent_scan(
        &mut self,
        vehicle_id: i64,
    ) -> impl Future<Output = Result<Option<LastScan>>> + Send;

    /// The open stay; `DataIntegrity` if there is more than one
    fn open_stay(
        &mut self,
        vehicle_id: i64,
    ) -> impl Future<Output = Result<Option<HistoryRecord>>> + Send;

    fn create_entry(
        &mut self,
        vehicle_id: i64,
        time_in: DateTime<Utc>,
        parking_space_id: Option<i64>,
    ) -> impl Future<Output = Result<HistoryRecord>> + Send;

    /// `AlreadyClosed` if the record has an exit time
    fn close_stay(
        &mut self,
        record_id: i64,
        time_out: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn find_free_space(&mut self) -> impl Future<Output = Result<Option<ParkingSpace>>> + Send;

    /// `AlreadyOccupied` if the space is taken
    fn claim_space(&mut self, space_id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Free a space; returns its row, None if the space no longer exists
    fn release_space(
        &mut self,
        space_id: i64,
    ) -> impl Future<Output = Result<Option<ParkingSpace>>> + Send;

    /// Legacy fallback: free one arbitrary occupied space
    fn release_any_occupied(&mut self) -> impl Future<Output = Result<Option<ParkingSpace>>> + Send;

    fn commit(self) -> impl Future<Output = Result<()>> + Send;
}
