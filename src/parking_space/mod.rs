//! ParkingSpace - Occupancy Store
//!
//! ## Responsibilities
//!
//! - Free space selection and claim (entry)
//! - Space release (exit)
//! - Occupancy listing, per-level summary and integrity report
//!
//! ## Invariant
//!
//! `parkingspace.is_occupied` is true iff exactly one open history record
//! (`time_out IS NULL`) references the space. The flag is only flipped by
//! the scan transaction, together with the matching history change.

mod repository;
mod types;

pub use repository::ParkingSpaceRepository;
pub use types::*;
