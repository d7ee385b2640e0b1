//! RealtimeHub - WebSocket Distribution
//!
//! ## Responsibilities
//!
//! - WebSocket connection management
//! - Broadcasting gate events (vehicle entry / exit / unregistered plate)
//!
//! Delivery is fire-and-forget: at-most-once, no backlog for clients that
//! connect later, and zero connected clients is not an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Hub message types
///
/// Serialized as `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum HubMessage {
    /// Vehicle at the entrance: registered entry or unregistered plate
    VehicleInfo(VehicleInfoMessage),
    /// Registered vehicle left
    VehicleExit(VehicleExitMessage),
}

impl HubMessage {
    /// Event name as seen by clients
    pub fn event_name(&self) -> &'static str {
        match self {
            HubMessage::VehicleInfo(_) => "vehicle_info",
            HubMessage::VehicleExit(_) => "vehicle_exit",
        }
    }
}

/// Owner fields attached to messages about registered vehicles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleOwnerFields {
    pub vehicle_type: String,
    pub user_id: String,
    pub vehicle_owner: Option<String>,
}

/// Entrance message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleInfoMessage {
    pub license_plate: String,
    pub status: String,
    pub is_registered: bool,
    /// "HH:MM DD/MM/YYYY", local time
    pub entry_time: String,
    /// Always "entrance"
    #[serde(rename = "type")]
    pub kind: String,
    /// Assigned space text; absent for unregistered plates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_info: Option<String>,
    /// Absent for unregistered plates
    #[serde(flatten)]
    pub owner: Option<VehicleOwnerFields>,
}

/// Exit message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleExitMessage {
    pub license_plate: String,
    pub status: String,
    pub is_registered: bool,
    /// "HH:MM DD/MM/YYYY", local time
    pub exit_time: String,
    /// Always "exit"
    #[serde(rename = "type")]
    pub kind: String,
    /// Hours parked, one decimal
    pub parking_duration: f64,
    pub space_info: String,
    #[serde(flatten)]
    pub owner: VehicleOwnerFields,
}

/// Client connection
struct ClientConnection {
    id: Uuid,
    tx: mpsc::UnboundedSender<String>,
}

/// RealtimeHub instance
pub struct RealtimeHub {
    connections: RwLock<HashMap<Uuid, ClientConnection>>,
    connection_count: AtomicU64,
}

impl RealtimeHub {
    /// Create new RealtimeHub
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            connection_count: AtomicU64::new(0),
        }
    }

    /// Register a new client
    pub async fn register(&self) -> (Uuid, mpsc::UnboundedReceiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        {
            let mut connections = self.connections.write().await;
            connections.insert(id, ClientConnection { id, tx });
        }

        self.connection_count.fetch_add(1, Ordering::Relaxed);

        tracing::info!(connection_id = %id, "Client connected");

        (id, rx)
    }

    /// Unregister a client
    pub async fn unregister(&self, id: &Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(id).is_some() {
            self.connection_count.fetch_sub(1, Ordering::Relaxed);
            tracing::info!(connection_id = %id, "Client disconnected");
        }
    }

    /// Broadcast message to all clients
    ///
    /// Returns the number of clients the message was handed to.
    pub async fn broadcast(&self, message: HubMessage) -> usize {
        let msg_type = message.event_name();
        tracing::info!(message_type = %msg_type, "Broadcasting message to clients");

        let json = match serde_json::to_string(&message) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize message");
                return 0;
            }
        };

        let connections = self.connections.read().await;
        tracing::debug!(client_count = %connections.len(), "Sending to connected clients");

        let mut delivered = 0;
        for conn in connections.values() {
            match conn.tx.send(json.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(connection_id = %conn.id, error = %e, "Failed to send message");
                }
            }
        }
        delivered
    }

    /// Get connection count
    pub fn connection_count(&self) -> u64 {
        self.connection_count.load(Ordering::Relaxed)
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}
