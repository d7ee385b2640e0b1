//! Payload builder for scan outcomes
//!
//! Turns a `ScanOutcome` into the HTTP response body and the RealtimeHub
//! message. Timestamps are stored in UTC and converted to the car park's
//! local zone (Asia/Ho_Chi_Minh, UTC+7) only here.

use super::types::{ScanOutcome, SpaceRelease};
use crate::parking_space::{entry_space_text, ParkingSpace};
use crate::realtime_hub::{HubMessage, VehicleExitMessage, VehicleInfoMessage, VehicleOwnerFields};
use crate::vehicle_registry::{Vehicle, STATUS_REGISTERED, STATUS_UNREGISTERED};
use chrono::{DateTime, Utc};
use chrono_tz::Asia::Ho_Chi_Minh;
use serde::Serialize;

/// Display format for entry/exit times
pub const DISPLAY_TIME_FORMAT: &str = "%H:%M %d/%m/%Y";

pub const STATUS_UNREGISTERED_DETECTED: &str = "Unregistered vehicle detected";
pub const STATUS_IGNORED: &str = "Ignored";
pub const STATUS_ENTRY_OK: &str = "Vehicle entry processed successfully";
pub const STATUS_EXIT_OK: &str = "Vehicle exit processed successfully";
pub const IGNORED_MESSAGE: &str = "Same vehicle detected within 1 minute, ignoring...";

const KIND_ENTRANCE: &str = "entrance";
const KIND_EXIT: &str = "exit";

/// Render a UTC timestamp as local "HH:MM DD/MM/YYYY"
pub fn format_display_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Ho_Chi_Minh)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

/// Response body of `POST /entrance_LPR`
#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    pub data: ScanData,
}

/// `data` of the scan response
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScanData {
    Info(VehicleInfoMessage),
    Exit(VehicleExitMessage),
    Ignored { license_plate: String },
}

fn owner_fields(vehicle: &Vehicle) -> VehicleOwnerFields {
    VehicleOwnerFields {
        vehicle_type: vehicle.vehicle_type.clone(),
        user_id: vehicle.user_id.clone(),
        vehicle_owner: vehicle.vehicle_owner.clone(),
    }
}

fn unregistered_message(license_plate: &str, scan_time: DateTime<Utc>) -> VehicleInfoMessage {
    VehicleInfoMessage {
        license_plate: license_plate.to_string(),
        status: STATUS_UNREGISTERED.to_string(),
        is_registered: false,
        entry_time: format_display_time(scan_time),
        kind: KIND_ENTRANCE.to_string(),
        space_info: None,
        owner: None,
    }
}

fn entry_message(
    license_plate: &str,
    vehicle: &Vehicle,
    scan_time: DateTime<Utc>,
    space: Option<&ParkingSpace>,
) -> VehicleInfoMessage {
    VehicleInfoMessage {
        license_plate: license_plate.to_string(),
        status: STATUS_REGISTERED.to_string(),
        is_registered: true,
        entry_time: format_display_time(scan_time),
        kind: KIND_ENTRANCE.to_string(),
        space_info: Some(entry_space_text(space)),
        owner: Some(owner_fields(vehicle)),
    }
}

fn exit_message(
    license_plate: &str,
    vehicle: &Vehicle,
    scan_time: DateTime<Utc>,
    duration_hours: f64,
    released: &SpaceRelease,
) -> VehicleExitMessage {
    VehicleExitMessage {
        license_plate: license_plate.to_string(),
        status: STATUS_REGISTERED.to_string(),
        is_registered: true,
        exit_time: format_display_time(scan_time),
        kind: KIND_EXIT.to_string(),
        parking_duration: duration_hours,
        space_info: released.description(),
        owner: owner_fields(vehicle),
    }
}

/// Message to broadcast for an outcome; Ignored scans broadcast nothing
pub fn hub_message(outcome: &ScanOutcome) -> Option<HubMessage> {
    match scan_response(outcome).data {
        ScanData::Info(info) => Some(HubMessage::VehicleInfo(info)),
        ScanData::Exit(exit) => Some(HubMessage::VehicleExit(exit)),
        ScanData::Ignored { .. } => None,
    }
}

/// HTTP response body for an outcome
pub fn scan_response(outcome: &ScanOutcome) -> ScanResponse {
    match outcome {
        ScanOutcome::Unregistered {
            license_plate,
            scan_time,
        } => ScanResponse {
            status: STATUS_UNREGISTERED_DETECTED.to_string(),
            message: None,
            license_plate: None,
            data: ScanData::Info(unregistered_message(license_plate, *scan_time)),
        },
        ScanOutcome::Ignored { license_plate, .. } => ScanResponse {
            status: STATUS_IGNORED.to_string(),
            message: Some(IGNORED_MESSAGE.to_string()),
            license_plate: Some(license_plate.clone()),
            data: ScanData::Ignored {
                license_plate: license_plate.clone(),
            },
        },
        ScanOutcome::Entry {
            license_plate,
            vehicle,
            scan_time,
            space,
            ..
        } => ScanResponse {
            status: STATUS_ENTRY_OK.to_string(),
            message: None,
            license_plate: None,
            data: ScanData::Info(entry_message(license_plate, vehicle, *scan_time, space.as_ref())),
        },
        ScanOutcome::Exit {
            license_plate,
            vehicle,
            scan_time,
            duration_hours,
            released,
            ..
        } => ScanResponse {
            status: STATUS_EXIT_OK.to_string(),
            message: None,
            license_plate: None,
            data: ScanData::Exit(exit_message(
                license_plate,
                vehicle,
                *scan_time,
                *duration_hours,
                released,
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn vehicle() -> Vehicle {
        Vehicle {
            id: 1,
            license_plate: "51F-99999".to_string(),
            vehicle_type: "car".to_string(),
            user_id: "7b2f0c1e-0000-4000-8000-000000000001".to_string(),
            vehicle_owner: Some("Nguyễn Văn A".to_string()),
        }
    }

    fn space() -> ParkingSpace {
        ParkingSpace {
            id: 3,
            space_number: "3".to_string(),
            level: "1".to_string(),
            is_occupied: true,
        }
    }

    #[test]
    fn test_display_time_is_utc_plus_7() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 18, 1, 5, 0).unwrap();
        assert_eq!(format_display_time(ts), "08:05 18/10/2026");

        // crosses midnight locally
        let late = Utc.with_ymd_and_hms(2026, 12, 31, 17, 30, 0).unwrap();
        assert_eq!(format_display_time(late), "00:30 01/01/2027");
    }

    #[test]
    fn test_unregistered_response_and_message() {
        let outcome = ScanOutcome::Unregistered {
            license_plate: "51F-12345".to_string(),
            scan_time: Utc.with_ymd_and_hms(2026, 10, 18, 1, 0, 0).unwrap(),
        };

        let body = serde_json::to_value(scan_response(&outcome)).unwrap();
        assert_eq!(body["status"], STATUS_UNREGISTERED_DETECTED);
        assert_eq!(body["data"]["status"], "Xe chưa đăng ký");
        assert_eq!(body["data"]["is_registered"], false);
        assert_eq!(body["data"]["entry_time"], "08:00 18/10/2026");
        assert!(body.get("message").is_none());

        let msg = hub_message(&outcome).unwrap();
        assert_eq!(msg.event_name(), "vehicle_info");
    }

    #[test]
    fn test_ignored_has_no_broadcast() {
        let t = Utc.with_ymd_and_hms(2026, 10, 18, 1, 0, 0).unwrap();
        let outcome = ScanOutcome::Ignored {
            license_plate: "51F-99999".to_string(),
            scan_time: t,
            last_scan: t,
        };

        assert!(hub_message(&outcome).is_none());

        let body = serde_json::to_value(scan_response(&outcome)).unwrap();
        assert_eq!(body["status"], "Ignored");
        assert_eq!(body["message"], IGNORED_MESSAGE);
        assert_eq!(body["license_plate"], "51F-99999");
        assert_eq!(body["data"]["license_plate"], "51F-99999");
    }

    #[test]
    fn test_entry_payload_fields() {
        let outcome = ScanOutcome::Entry {
            license_plate: "51F-99999".to_string(),
            vehicle: vehicle(),
            scan_time: Utc.with_ymd_and_hms(2026, 10, 18, 1, 0, 0).unwrap(),
            history_id: 10,
            space: Some(space()),
        };

        let body = serde_json::to_value(scan_response(&outcome)).unwrap();
        let data = &body["data"];
        assert_eq!(body["status"], STATUS_ENTRY_OK);
        assert_eq!(data["type"], "entrance");
        assert_eq!(data["status"], "Xe đã đăng ký");
        assert_eq!(data["space_info"], "Sẽ đỗ tại chỗ 3 - Tầng 1");
        assert_eq!(data["vehicle_type"], "car");
        assert_eq!(data["vehicle_owner"], "Nguyễn Văn A");
        assert_eq!(data["user_id"], "7b2f0c1e-0000-4000-8000-000000000001");
    }

    #[test]
    fn test_exit_payload_fields() {
        let outcome = ScanOutcome::Exit {
            license_plate: "51F-99999".to_string(),
            vehicle: vehicle(),
            scan_time: Utc.with_ymd_and_hms(2026, 10, 18, 3, 30, 0).unwrap(),
            history_id: 10,
            entry_time: Utc.with_ymd_and_hms(2026, 10, 18, 1, 0, 0).unwrap(),
            duration_hours: 2.5,
            released: SpaceRelease::Released(space()),
        };

        let msg = hub_message(&outcome).unwrap();
        assert_eq!(msg.event_name(), "vehicle_exit");

        let body = serde_json::to_value(scan_response(&outcome)).unwrap();
        let data = &body["data"];
        assert_eq!(body["status"], STATUS_EXIT_OK);
        assert_eq!(data["type"], "exit");
        assert_eq!(data["exit_time"], "10:30 18/10/2026");
        assert_eq!(data["parking_duration"], 2.5);
        assert_eq!(data["space_info"], "Chỗ đỗ 3 đã được giải phóng");
    }
}
