//! Host callback adapter
//!
//! Implements the five callbacks the host plugin framework dispatches. Each
//! callback is a single request/response transaction: validate the input,
//! delegate to the remote platform, the device cache or the status
//! publisher, and map the outcome into the host's envelope.

pub mod devices;
pub mod events;
pub mod form;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use plugin_api::{
    DeviceDisconnectRequest, DeviceInfoResponse, DeviceListResponse, GetDeviceInfoRequest,
    GetDeviceListRequest, GetFormConfigRequest, NotificationRequest,
};

use crate::cache::device::DeviceCache;
use crate::errors::BridgeError;
use crate::http::client::RemotePlatform;
use crate::mqtt::publisher::StatusPublisher;

/// Callbacks the host framework routes into the bridge
#[async_trait]
pub trait DeviceCallbacks: Send + Sync {
    /// Form schema for the given form type; `None` when the form has no schema
    async fn get_form_config(
        &self,
        req: &GetFormConfigRequest,
    ) -> Result<Option<serde_json::Value>, BridgeError>;

    /// A device went offline on the host side
    async fn device_disconnect(&self, req: &DeviceDisconnectRequest) -> Result<(), BridgeError>;

    /// Host-side configuration notification
    async fn notification(&self, req: &NotificationRequest) -> Result<(), BridgeError>;

    /// Page of devices visible to the request's voucher
    async fn get_device_list(
        &self,
        req: &GetDeviceListRequest,
    ) -> Result<DeviceListResponse, BridgeError>;

    /// Detail of one device, bound through the request's voucher
    async fn get_device_info(
        &self,
        req: &GetDeviceInfoRequest,
    ) -> Result<DeviceInfoResponse, BridgeError>;
}

/// Default callback implementation
pub struct CallbackAdapter {
    platform: Arc<dyn RemotePlatform>,
    publisher: Arc<dyn StatusPublisher>,
    cache: Arc<DeviceCache>,
    form_dir: PathBuf,
}

impl CallbackAdapter {
    pub fn new(
        platform: Arc<dyn RemotePlatform>,
        publisher: Arc<dyn StatusPublisher>,
        cache: Arc<DeviceCache>,
        form_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            platform,
            publisher,
            cache,
            form_dir: form_dir.into(),
        }
    }

    /// Device cache shared with the adapter
    pub fn cache(&self) -> &Arc<DeviceCache> {
        &self.cache
    }
}

#[async_trait]
impl DeviceCallbacks for CallbackAdapter {
    async fn get_form_config(
        &self,
        req: &GetFormConfigRequest,
    ) -> Result<Option<serde_json::Value>, BridgeError> {
        self.handle_get_form_config(req).await
    }

    async fn device_disconnect(&self, req: &DeviceDisconnectRequest) -> Result<(), BridgeError> {
        self.handle_device_disconnect(req).await
    }

    async fn notification(&self, req: &NotificationRequest) -> Result<(), BridgeError> {
        self.handle_notification(req)
    }

    async fn get_device_list(
        &self,
        req: &GetDeviceListRequest,
    ) -> Result<DeviceListResponse, BridgeError> {
        self.handle_get_device_list(req).await
    }

    async fn get_device_info(
        &self,
        req: &GetDeviceInfoRequest,
    ) -> Result<DeviceInfoResponse, BridgeError> {
        self.handle_get_device_info(req).await
    }
}
