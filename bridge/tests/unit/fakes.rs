//! In-memory stand-ins for the remote platform and the status publisher

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use platform_api::{BoundDevice, DeviceList, DeviceSummary, ListDevicesRequest};
use voucher_bridge::adapter::CallbackAdapter;
use voucher_bridge::cache::device::DeviceCache;
use voucher_bridge::errors::BridgeError;
use voucher_bridge::http::client::RemotePlatform;
use voucher_bridge::models::device::DeviceStatus;
use voucher_bridge::mqtt::publisher::StatusPublisher;
use voucher_bridge::voucher::Binding;

pub const LIST_VOUCHER: &str = r#"{"ServerURL":"http://10.0.0.5:8002/xiaozhi","Secret":"tok-123"}"#;
pub const BIND_VOUCHER: &str = r#"{"ServerURL":"http://10.0.0.5:8002/xiaozhi","Secret":"tok-123","AgentId":"agent-1","ThingsPanelApiKey":"key-1"}"#;

#[derive(Default)]
pub struct FakePlatform {
    pub list_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub last_filter: Mutex<Option<ListDevicesRequest>>,
    pub last_bind: Mutex<Option<(String, String, String, String)>>,
    /// Remote code and message returned by the bind call instead of a device
    pub bind_failure: Option<(i64, String)>,
}

impl FakePlatform {
    pub fn failing_bind(code: i64, msg: &str) -> Self {
        Self {
            bind_failure: Some((code, msg.to_string())),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst) + self.detail_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemotePlatform for FakePlatform {
    async fn list_devices(
        &self,
        _voucher: &voucher_bridge::voucher::Voucher,
        filter: &ListDevicesRequest,
    ) -> Result<DeviceList, BridgeError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_filter.lock().unwrap() = Some(filter.clone());
        Ok(DeviceList {
            total: 2,
            list: vec![
                DeviceSummary {
                    device_name: "Kitchen speaker".to_string(),
                    device_number: "AA:BB:CC:00:00:01".to_string(),
                    description: "first floor".to_string(),
                },
                DeviceSummary {
                    device_name: "Desk speaker".to_string(),
                    device_number: "AA:BB:CC:00:00:02".to_string(),
                    description: String::new(),
                },
            ],
        })
    }

    async fn get_device_detail(
        &self,
        binding: &Binding<'_>,
        device_code: &str,
    ) -> Result<BoundDevice, BridgeError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_bind.lock().unwrap() = Some((
            binding.secret.expose_secret().to_string(),
            binding.agent_id.to_string(),
            binding.external_api_key.expose_secret().to_string(),
            device_code.to_string(),
        ));
        if let Some((code, msg)) = &self.bind_failure {
            return Err(BridgeError::RemoteLogicError {
                code: *code,
                msg: msg.clone(),
            });
        }
        Ok(BoundDevice {
            device_name: "Kitchen speaker".to_string(),
            device_number: "AA:BB:CC:00:00:01".to_string(),
            device_description: "first floor".to_string(),
        })
    }
}

#[derive(Default)]
pub struct FakePublisher {
    pub fail: bool,
    pub published: Mutex<Vec<(String, DeviceStatus)>>,
}

impl FakePublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

#[async_trait]
impl StatusPublisher for FakePublisher {
    async fn publish_status(&self, device_id: &str, status: DeviceStatus) -> Result<(), BridgeError> {
        self.published
            .lock()
            .unwrap()
            .push((device_id.to_string(), status));
        if self.fail {
            return Err(BridgeError::PublishError("broker unavailable".to_string()));
        }
        Ok(())
    }
}

pub struct Harness {
    pub platform: Arc<FakePlatform>,
    pub publisher: Arc<FakePublisher>,
    pub cache: Arc<DeviceCache>,
    pub adapter: Arc<CallbackAdapter>,
}

pub fn harness_with(
    platform: FakePlatform,
    publisher: FakePublisher,
    form_dir: impl Into<std::path::PathBuf>,
) -> Harness {
    let platform = Arc::new(platform);
    let publisher = Arc::new(publisher);
    let cache = Arc::new(DeviceCache::new(4));
    let adapter = Arc::new(CallbackAdapter::new(
        platform.clone(),
        publisher.clone(),
        cache.clone(),
        form_dir,
    ));
    Harness {
        platform,
        publisher,
        cache,
        adapter,
    }
}

pub fn harness() -> Harness {
    harness_with(
        FakePlatform::default(),
        FakePublisher::default(),
        bundled_form_dir(),
    )
}

pub fn bundled_form_dir() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}
