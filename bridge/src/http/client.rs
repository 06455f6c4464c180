//! Remote platform HTTP client

use std::time::Duration;

use async_trait::async_trait;
use platform_api::{BoundDevice, DeviceList, ListDevicesRequest, PlatformResponse};
use reqwest::{Client, Request};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::errors::BridgeError;
use crate::response::remote_result;
use crate::voucher::{Binding, Voucher};

/// Remote platform client options
#[derive(Debug, Clone)]
pub struct PlatformOptions {
    /// Overall timeout for one remote call
    pub request_timeout: Duration,

    /// Timeout for establishing the connection
    pub connect_timeout: Duration,
}

impl Default for PlatformOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Operations the callback adapter needs from the remote platform
#[async_trait]
pub trait RemotePlatform: Send + Sync {
    /// Fetch a page of devices visible to the voucher
    async fn list_devices(
        &self,
        voucher: &Voucher,
        filter: &ListDevicesRequest,
    ) -> Result<DeviceList, BridgeError>;

    /// Bind a device code and fetch its detail
    async fn get_device_detail(
        &self,
        binding: &Binding<'_>,
        device_code: &str,
    ) -> Result<BoundDevice, BridgeError>;
}

/// Stateless HTTP client for the remote platform.
///
/// Holds no credentials; every request is built from the voucher passed in.
pub struct PlatformClient {
    pub(crate) client: Client,
}

impl PlatformClient {
    /// Create a new platform client
    pub fn new(options: &PlatformOptions) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .connect_timeout(options.connect_timeout)
            .build()?;

        Ok(Self { client })
    }

    /// Send a built request and decode the platform response.
    ///
    /// Transport failures surface as `TransportError`, a non-2xx status or an
    /// undecodable body as `DecodeError`, and a non-zero platform code as
    /// `RemoteLogicError`. Nothing is retried.
    pub(crate) async fn execute<T>(
        &self,
        operation: &'static str,
        request: Request,
    ) -> Result<T, BridgeError>
    where
        T: DeserializeOwned + Default,
    {
        let url = request.url().to_string();
        debug!(operation, url = %url, "POST");

        let response = self.client.execute(request).await.inspect_err(|e| {
            error!(operation, url = %url, error = %e, "Remote platform unreachable");
        })?;

        let status = response.status();
        let body = response.bytes().await.inspect_err(|e| {
            error!(operation, url = %url, error = %e, "Failed to read remote response");
        })?;
        debug!(
            operation,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "Remote platform response"
        );

        if !status.is_success() {
            error!(operation, status = status.as_u16(), "Remote platform returned HTTP error");
            return Err(BridgeError::DecodeError(format!(
                "{} returned HTTP {}: {}",
                operation,
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        let decoded: PlatformResponse<T> = serde_json::from_slice(&body).map_err(|e| {
            error!(operation, error = %e, "Failed to decode remote response");
            BridgeError::DecodeError(format!("{} response: {}", operation, e))
        })?;

        remote_result(decoded).inspect_err(|e| {
            error!(operation, error = %e, "Remote platform reported failure");
        })
    }
}

/// Turn a request builder failure (bad URL or header value) into a validation error
pub(crate) fn build_error(operation: &str, err: reqwest::Error) -> BridgeError {
    BridgeError::ValidationError(format!("cannot build {} request: {}", operation, err))
}
