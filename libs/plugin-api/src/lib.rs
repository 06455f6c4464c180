//! Host plugin framework models
//!
//! Callback requests delivered by the host framework and the `{code,
//! message, data}` envelope it expects back.

use serde::{Deserialize, Serialize};

/// Code reported for a successful callback
pub const SUCCESS_CODE: i32 = 200;

/// Message reported for a successful list or detail callback
pub const SUCCESS_MESSAGE: &str = "获取成功";

/// Message reported for other successful callbacks
pub const OK_MESSAGE: &str = "success";

/// Response envelope expected by the host framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    /// Successful envelope with the fixed success code and message
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: SUCCESS_MESSAGE.to_string(),
            data,
        }
    }

    /// Successful envelope for callbacks that do not fetch devices
    pub fn ok(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: OK_MESSAGE.to_string(),
            data,
        }
    }
}

impl Envelope<()> {
    /// Failure envelope with no data
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: (),
        }
    }
}

/// Device as presented to the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceItem {
    pub device_name: String,
    pub device_number: String,
    pub description: String,
}

/// Device list page as presented to the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceListData {
    pub list: Vec<DeviceItem>,
    pub total: i64,
}

pub type DeviceListResponse = Envelope<DeviceListData>;
pub type DeviceInfoResponse = Envelope<DeviceItem>;

/// Form configuration request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetFormConfigRequest {
    #[serde(default)]
    pub protocol_type: String,
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub form_type: String,
}

/// Device disconnect request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceDisconnectRequest {
    #[serde(default)]
    pub device_id: String,
}

/// Notification request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub message: String,
}

/// Device list request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetDeviceListRequest {
    #[serde(default)]
    pub voucher: String,
    #[serde(default)]
    pub service_identifier: String,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub page_size: i64,
}

/// Device detail request; `key` is the device code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetDeviceInfoRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub voucher: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}
