//! Device endpoints of the remote platform

use async_trait::async_trait;
use platform_api::{BindDeviceRequest, BoundDevice, DeviceList, ListDevicesRequest};
use reqwest::{header, Request};
use secrecy::ExposeSecret;

use crate::errors::BridgeError;
use crate::http::client::{build_error, PlatformClient, RemotePlatform};
use crate::voucher::{Binding, Voucher};

pub const LIST_DEVICES_PATH: &str = "/device/list";
pub const BIND_DEVICE_PATH: &str = "/device/bind";

/// Header carrying the voucher secret on list calls
pub const TOKEN_HEADER: &str = "x-token";

impl PlatformClient {
    /// Build the `/device/list` request. The filter is forwarded as-is.
    pub fn list_devices_request(
        &self,
        voucher: &Voucher,
        filter: &ListDevicesRequest,
    ) -> Result<Request, BridgeError> {
        self.client
            .post(voucher.endpoint(LIST_DEVICES_PATH))
            .header(TOKEN_HEADER, voucher.secret.expose_secret())
            .json(filter)
            .build()
            .map_err(|e| build_error("list devices", e))
    }

    /// Build the `/device/bind` request. No token header; the secret travels in the body.
    pub fn bind_device_request(
        &self,
        binding: &Binding<'_>,
        device_code: &str,
    ) -> Result<Request, BridgeError> {
        let body = BindDeviceRequest {
            secret: binding.secret.expose_secret().to_string(),
            agent_id: binding.agent_id.to_string(),
            external_api_key: binding.external_api_key.expose_secret().to_string(),
            device_code: device_code.to_string(),
        };

        self.client
            .post(binding.endpoint(BIND_DEVICE_PATH))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .build()
            .map_err(|e| build_error("bind device", e))
    }
}

#[async_trait]
impl RemotePlatform for PlatformClient {
    async fn list_devices(
        &self,
        voucher: &Voucher,
        filter: &ListDevicesRequest,
    ) -> Result<DeviceList, BridgeError> {
        let request = self.list_devices_request(voucher, filter)?;
        self.execute("list_devices", request).await
    }

    async fn get_device_detail(
        &self,
        binding: &Binding<'_>,
        device_code: &str,
    ) -> Result<BoundDevice, BridgeError> {
        let request = self.bind_device_request(binding, device_code)?;
        self.execute("get_device_detail", request).await
    }
}
