//! LPR Parking Server Library
//!
//! Entrance/exit processing for a license-plate-recognition parking lot.
//!
//! ## Architecture (6 Components)
//!
//! 1. VehicleRegistry - Registered vehicles and their owners
//! 2. ParkingSpace - Space occupancy (claim / release)
//! 3. HistoryLedger - Stays (time in / time out / space)
//! 4. ScanPipeline - Scan classification and its transaction
//! 5. RealtimeHub - WebSocket distribution
//! 6. WebAPI - REST API endpoints
//!
//! ## Design Principles
//!
//! - One transaction per scan: history and occupancy change together or not at all
//! - Broadcast only after commit
//! - UTC internally, Asia/Ho_Chi_Minh at the presentation boundary

pub mod error;
pub mod history_ledger;
pub mod models;
pub mod parking_space;
pub mod realtime_hub;
pub mod scan_pipeline;
pub mod state;
pub mod vehicle_registry;
pub mod web_api;

pub use error::{Error, Result};
pub use state::AppState;
