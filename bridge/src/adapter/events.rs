//! Disconnect and notification callbacks

use plugin_api::{DeviceDisconnectRequest, NotificationRequest};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::adapter::CallbackAdapter;
use crate::errors::BridgeError;
use crate::models::device::{DeviceIdentity, DeviceStatus};

/// Notification kinds sent by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// `"1"`
    ServiceConfigChanged,
    /// `"2"`
    DeviceConfigChanged,
}

impl MessageType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "1" => Some(MessageType::ServiceConfigChanged),
            "2" => Some(MessageType::DeviceConfigChanged),
            _ => None,
        }
    }
}

impl CallbackAdapter {
    pub(crate) async fn handle_device_disconnect(
        &self,
        req: &DeviceDisconnectRequest,
    ) -> Result<(), BridgeError> {
        info!(device_id = %req.device_id, "Received device disconnect request");

        if req.device_id.is_empty() {
            warn!(
                operation = "device_disconnect",
                "Device id is empty, publishing offline anyway"
            );
        }

        // The cache is keyed by device number, so resolve the host id first.
        // A miss only means there is nothing to clean up.
        match self.cache.get_by_id(&req.device_id) {
            Ok(identity) => {
                self.cache.clear_by_number(&identity.device_number);
                debug!(
                    device_id = %req.device_id,
                    device_number = %identity.device_number,
                    "Cleared device cache"
                );
            }
            Err(e) => {
                debug!(device_id = %req.device_id, error = %e, "No cached device to clear");
            }
        }

        self.publisher
            .publish_status(&req.device_id, DeviceStatus::Offline)
            .await
            .inspect_err(|e| {
                error!(
                    operation = "device_disconnect",
                    device_id = %req.device_id,
                    error = %e,
                    "Failed to publish offline status"
                );
            })
    }

    pub(crate) fn handle_notification(&self, req: &NotificationRequest) -> Result<(), BridgeError> {
        info!(message_type = %req.message_type, message = %req.message, "Received notification");

        let message: Map<String, Value> = serde_json::from_str(&req.message).map_err(|e| {
            error!(operation = "notification", message_type = %req.message_type, error = %e, "Failed to decode notification message");
            BridgeError::from(e)
        })?;

        match MessageType::parse(&req.message_type) {
            Some(MessageType::ServiceConfigChanged) => {
                info!("Service configuration changed");
            }
            Some(MessageType::DeviceConfigChanged) => {
                info!("Device configuration changed");
                self.apply_device_change(&message);
            }
            None => {
                warn!(message_type = %req.message_type, "Unknown notification type, ignoring");
            }
        }

        Ok(())
    }

    /// Fold a device-config-changed message into the cache.
    ///
    /// `device_id` + `device_number` register the identity, `status` records
    /// presence, and a bare `device_number` invalidates the entry.
    fn apply_device_change(&self, message: &Map<String, Value>) {
        let Some(device_number) = field(message, "device_number") else {
            debug!("Device change carries no device number");
            return;
        };

        let device_id = field(message, "device_id");
        if let Some(device_id) = &device_id {
            let identity = DeviceIdentity::new(
                field(message, "device_name").unwrap_or_default(),
                device_number.clone(),
                field(message, "description").unwrap_or_default(),
            );
            self.cache.register(device_id, identity);
            debug!(device_id = %device_id, device_number = %device_number, "Registered device");
        }

        match field(message, "status") {
            Some(raw) => match raw.parse::<DeviceStatus>() {
                Ok(status) => {
                    self.cache.set_status(&device_number, status);
                    debug!(device_number = %device_number, %status, "Recorded device status");
                }
                Err(e) => {
                    warn!(device_number = %device_number, error = %e, "Ignoring device status");
                }
            },
            None if device_id.is_none() => {
                self.cache.clear_by_number(&device_number);
                debug!(device_number = %device_number, "Invalidated device cache");
            }
            None => {}
        }
    }
}

/// Non-empty string or number field of a notification message
fn field(message: &Map<String, Value>, key: &str) -> Option<String> {
    match message.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
