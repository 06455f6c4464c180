//! MQTT topic definitions

/// MQTT topic patterns used by the host platform
pub struct Topics;

impl Topics {
    /// Device status topic
    pub fn device_status(device_id: &str) -> String {
        format!("devices/status/{}", device_id)
    }
}
