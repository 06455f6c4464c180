//! Device platform API models
//!
//! Request and response bodies exchanged with the third-party device
//! platform. Field names match the platform's JSON contract exactly.

use serde::{Deserialize, Serialize};

/// Status code the platform uses for a successful call
pub const PLATFORM_OK: i64 = 0;

/// Response wrapper returned by every platform endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformResponse<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> PlatformResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.code == PLATFORM_OK
    }
}

/// Body of `POST /device/list`.
///
/// Carries the host's list filter unchanged; the platform accepts the same
/// shape the host sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDevicesRequest {
    pub voucher: String,
    pub service_identifier: String,
    pub page: i64,
    pub page_size: i64,
}

/// Page of devices returned by `/device/list`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceList {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub list: Vec<DeviceSummary>,
}

/// Device row in a `/device/list` page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_number: String,
    #[serde(default)]
    pub description: String,
}

/// Body of `POST /device/bind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindDeviceRequest {
    pub secret: String,
    pub agent_id: String,
    pub external_api_key: String,
    pub device_code: String,
}

/// Device returned by `/device/bind`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundDevice {
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_number: String,
    #[serde(default)]
    pub device_description: String,
}
