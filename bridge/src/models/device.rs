//! Device models

use serde::{Deserialize, Serialize};

/// Identity of a device on the remote platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Display name
    pub device_name: String,

    /// Stable external identifier; the device cache key
    pub device_number: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,
}

impl DeviceIdentity {
    pub fn new(
        device_name: impl Into<String>,
        device_number: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            device_name: device_name.into(),
            device_number: device_number.into(),
            description: description.into(),
        }
    }
}

/// Last-known presence of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    /// Payload published to the host platform's status topic
    pub fn as_payload(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "1",
            DeviceStatus::Offline => "0",
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceStatus::Online => write!(f, "online"),
            DeviceStatus::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "online" => Ok(DeviceStatus::Online),
            "0" | "offline" => Ok(DeviceStatus::Offline),
            _ => Err(format!("Invalid device status: {}", s)),
        }
    }
}
