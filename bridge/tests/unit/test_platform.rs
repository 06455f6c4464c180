//! Remote platform client tests against an in-process stub platform

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use platform_api::ListDevicesRequest;
use plugin_api::{GetDeviceInfoRequest, GetDeviceListRequest, SUCCESS_MESSAGE};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use voucher_bridge::adapter::{CallbackAdapter, DeviceCallbacks};
use voucher_bridge::cache::device::DeviceCache;
use voucher_bridge::errors::BridgeError;
use voucher_bridge::http::client::{PlatformClient, PlatformOptions, RemotePlatform};
use voucher_bridge::voucher::Voucher;

use crate::fakes::{bundled_form_dir, FakePublisher};

#[derive(Clone, Default)]
struct Captured {
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn list_handler(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let token = headers
        .get("x-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    captured.requests.lock().unwrap().push((token, body));

    Json(json!({
        "code": 0,
        "msg": "ok",
        "data": {
            "total": 1,
            "list": [{
                "device_name": "Kitchen speaker",
                "device_number": "AA:BB:CC:00:00:01",
                "description": "first floor"
            }]
        }
    }))
}

async fn bind_handler(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let token = headers
        .get("x-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    captured.requests.lock().unwrap().push((token, body));

    Json(json!({"code": 5, "msg": "not found", "data": null}))
}

async fn broken_handler() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded")
}

async fn garbage_handler() -> &'static str {
    "<html>maintenance</html>"
}

async fn spawn_stub_platform() -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/xiaozhi/device/list", post(list_handler))
        .route("/xiaozhi/device/bind", post(bind_handler))
        .route("/broken/device/list", post(broken_handler))
        .route("/garbage/device/list", post(garbage_handler))
        .with_state(captured.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), captured)
}

fn client() -> PlatformClient {
    PlatformClient::new(&PlatformOptions::default()).unwrap()
}

fn voucher(base_url: &str) -> Voucher {
    Voucher::decode(&json!({"ServerURL": base_url, "Secret": "tok-123"}).to_string()).unwrap()
}

fn filter() -> ListDevicesRequest {
    ListDevicesRequest {
        voucher: "raw-voucher".to_string(),
        service_identifier: "svc-a".to_string(),
        page: 1,
        page_size: 10,
    }
}

#[tokio::test]
async fn test_list_devices_sends_token_and_filter() {
    let (base, captured) = spawn_stub_platform().await;

    let page = client()
        .list_devices(&voucher(&format!("{}/xiaozhi/", base)), &filter())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.list[0].device_number, "AA:BB:CC:00:00:01");

    let requests = captured.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0.as_deref(), Some("tok-123"));
    assert_eq!(requests[0].1, serde_json::to_value(filter()).unwrap());
}

#[tokio::test]
async fn test_bind_remote_error_is_remote_logic_error() {
    let (base, captured) = spawn_stub_platform().await;
    let voucher = Voucher::decode(
        &json!({
            "ServerURL": format!("{}/xiaozhi", base),
            "Secret": "tok-123",
            "AgentId": "agent-1",
            "ThingsPanelApiKey": "key-1"
        })
        .to_string(),
    )
    .unwrap();
    let binding = voucher.require_binding().unwrap();

    let err = client()
        .get_device_detail(&binding, "dev-42")
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::RemoteLogicError { code: 5, .. }));
    assert!(err.to_string().contains("not found"));

    let requests = captured.requests.lock().unwrap().clone();
    assert_eq!(requests[0].0, None);
    assert_eq!(requests[0].1["device_code"], "dev-42");
    assert_eq!(requests[0].1["agent_id"], "agent-1");
}

#[tokio::test]
async fn test_http_error_status_is_decode_error() {
    let (base, _) = spawn_stub_platform().await;

    let err = client()
        .list_devices(&voucher(&format!("{}/broken", base)), &filter())
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::DecodeError(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let (base, _) = spawn_stub_platform().await;

    let err = client()
        .list_devices(&voucher(&format!("{}/garbage", base)), &filter())
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::DecodeError(_)));
}

#[tokio::test]
async fn test_unreachable_platform_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client()
        .list_devices(&voucher(&format!("http://{}", addr)), &filter())
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::TransportError(_)));
}

#[tokio::test]
async fn test_adapter_end_to_end() {
    let (base, captured) = spawn_stub_platform().await;
    let adapter = CallbackAdapter::new(
        Arc::new(client()),
        Arc::new(FakePublisher::default()),
        Arc::new(DeviceCache::default()),
        bundled_form_dir(),
    );

    let list_voucher = json!({"ServerURL": format!("{}/xiaozhi", base), "Secret": "tok-123"}).to_string();
    let resp = adapter
        .get_device_list(&GetDeviceListRequest {
            voucher: list_voucher.clone(),
            service_identifier: "svc-a".to_string(),
            page: 1,
            page_size: 20,
        })
        .await
        .unwrap();
    assert_eq!(resp.message, SUCCESS_MESSAGE);
    assert_eq!(resp.data.list[0].device_name, "Kitchen speaker");
    assert_eq!(
        captured.requests.lock().unwrap()[0].1,
        json!({
            "voucher": list_voucher,
            "service_identifier": "svc-a",
            "page": 1,
            "page_size": 20
        })
    );

    let bind_voucher = json!({
        "ServerURL": format!("{}/xiaozhi", base),
        "Secret": "tok-123",
        "AgentId": "agent-1",
        "ThingsPanelApiKey": "key-1"
    })
    .to_string();
    let err = adapter
        .get_device_info(&GetDeviceInfoRequest {
            key: "dev-42".to_string(),
            voucher: bind_voucher,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}
