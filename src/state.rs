//! Application state
//!
//! Holds all shared components and state

use crate::history_ledger::HistoryLedgerRepository;
use crate::parking_space::ParkingSpaceRepository;
use crate::realtime_hub::RealtimeHub;
use crate::scan_pipeline::{
    MySqlScanStore, ScanPipeline, ScanPipelineConfig, DEFAULT_SCAN_TIMEOUT_MS,
};
use crate::vehicle_registry::VehicleRegistryRepository;
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database URL
    pub database_url: String,
    /// Server port
    pub port: u16,
    /// Server host
    pub host: String,
    /// Pool size
    pub db_max_connections: u32,
    /// Pool acquire timeout (seconds)
    pub db_acquire_timeout_sec: u64,
    /// Budget for one scan (lookup + classification, commit excluded)
    pub scan_timeout_ms: u64,
    /// On exit without a recorded space, free any occupied space
    pub fallback_release_any: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "mysql://root@localhost/parking".to_string()),
            port: env_parse("PORT", 5000),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            db_acquire_timeout_sec: env_parse("DB_ACQUIRE_TIMEOUT_SEC", 10),
            scan_timeout_ms: env_parse("LPR_SCAN_TIMEOUT_MS", DEFAULT_SCAN_TIMEOUT_MS),
            fallback_release_any: std::env::var("LPR_FALLBACK_RELEASE_ANY")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }
}

impl AppConfig {
    /// Pipeline settings derived from this config
    pub fn scan_pipeline_config(&self) -> ScanPipelineConfig {
        ScanPipelineConfig {
            scan_timeout: Duration::from_millis(self.scan_timeout_ms),
            fallback_release_any: self.fallback_release_any,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database pool
    pub pool: MySqlPool,
    /// Application config
    pub config: AppConfig,
    /// RealtimeHub (WebSocket)
    pub realtime: Arc<RealtimeHub>,
    /// Registered vehicles (read side)
    pub vehicle_registry: VehicleRegistryRepository,
    /// Parking spaces (read side)
    pub parking_spaces: ParkingSpaceRepository,
    /// Stay history (read side)
    pub history_ledger: HistoryLedgerRepository,
    /// Entrance/exit pipeline
    pub scan_pipeline: Arc<ScanPipeline<MySqlScanStore>>,
}

impl AppState {
    /// Wire all components over one pool
    pub fn new(pool: MySqlPool, config: AppConfig) -> Self {
        let realtime = Arc::new(RealtimeHub::new());
        let scan_pipeline = Arc::new(ScanPipeline::new(
            MySqlScanStore::new(pool.clone()),
            realtime.clone(),
            config.scan_pipeline_config(),
        ));

        Self {
            vehicle_registry: VehicleRegistryRepository::new(pool.clone()),
            parking_spaces: ParkingSpaceRepository::new(pool.clone()),
            history_ledger: HistoryLedgerRepository::new(pool.clone()),
            realtime,
            scan_pipeline,
            pool,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("ON"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_scan_pipeline_config() {
        let config = AppConfig {
            database_url: "mysql://localhost/parking".to_string(),
            port: 5000,
            host: "0.0.0.0".to_string(),
            db_max_connections: 10,
            db_acquire_timeout_sec: 10,
            scan_timeout_ms: 250,
            fallback_release_any: true,
        };
        let pipeline = config.scan_pipeline_config();
        assert_eq!(pipeline.scan_timeout, Duration::from_millis(250));
        assert!(pipeline.fallback_release_any);
    }
}
