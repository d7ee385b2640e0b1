//! HistoryLedger - Vehicle stay records
//!
//! ## Responsibilities
//!
//! - Most recent scan lookup (debounce input)
//! - Open stay lookup with integrity check
//! - Entry creation / stay closure inside the scan transaction
//! - Stay listings for the read-only API
//!
//! Records are append-only: created at entry with `time_out = NULL`,
//! closed exactly once at exit, never deleted or re-opened.

mod repository;
mod types;

pub use repository::HistoryLedgerRepository;
pub use types::*;
