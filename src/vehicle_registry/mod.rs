//! VehicleRegistry Module
//!
//! Resolves a license plate to a registered vehicle.
//!
//! ## Tables
//! - `vehicles(id, license_plate UNIQUE, vehicle_type, user_id)`
//! - `users(id, name)` (owner display name, LEFT JOIN)
//!
//! The registry is read-only here: vehicles are created and edited by the
//! account management UI.

pub mod repository;
pub mod types;

pub use repository::VehicleRegistryRepository;
pub use types::*;
