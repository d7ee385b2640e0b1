//! ScanPipeline - Entrance/Exit Event Processing
//!
//! ## Responsibilities
//!
//! - Classify an LPR scan as Unregistered / Ignored / Entry / Exit
//! - Apply the matching history + occupancy mutation in one transaction
//! - Publish the result to RealtimeHub
//!
//! ## Flow
//!
//! ```text
//! plate ─▶ lookup ──NotFound──▶ Unregistered
//!            │
//!            ▼ (transaction, vehicle row locked)
//!         debounce ──< 60s──▶ Ignored
//!            │
//!         open stay? ──yes──▶ close stay, release space ──▶ Exit
//!            │ no
//!            └──▶ claim free space (if any), open stay ──▶ Entry
//! ```
//!
//! Storage is reached through the `ScanStore` / `ScanTransaction` traits.
//! Production uses `MySqlScanStore`; dropping a transaction without
//! `commit` rolls it back.

pub mod classifier;
mod mysql_store;
pub mod payload;
mod service;
mod store;
mod types;


pub use mysql_store::{MySqlScanStore, MySqlScanTx};
pub use payload::{format_display_time, ScanData, ScanResponse};
pub use service::ScanPipeline;
pub use store::{ScanStore, ScanTransaction};
pub use types::*;
