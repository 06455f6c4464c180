//! MQTT client and worker tests against an in-process stub broker

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use voucher_bridge::errors::BridgeError;
use voucher_bridge::mqtt::client::{MqttAddress, MqttClient};
use voucher_bridge::workers::mqtt;

const CONNACK_ACCEPTED: [u8; 4] = [0x20, 0x02, 0x00, 0x00];
const DISCONNECT: [u8; 2] = [0xE0, 0x00];

/// Accepts one session and returns every byte received after CONNECT
async fn spawn_stub_broker() -> (u16, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];

        let n = socket.read(&mut buf).await.unwrap();
        assert!(n > 0);
        assert_eq!(buf[0] >> 4, 1, "first packet must be CONNECT");
        socket.write_all(&CONNACK_ACCEPTED).await.unwrap();

        let mut received = Vec::new();
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => received.extend_from_slice(&buf[..n]),
            }
        }
        received
    });

    (port, handle)
}

fn options(port: u16) -> mqtt::Options {
    mqtt::Options {
        broker_address: MqttAddress {
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        },
        reconnect_delay: Duration::from_millis(50),
        publish_timeout: Duration::from_secs(1),
        drain_timeout: Duration::from_secs(2),
    }
}

async fn wait_connected(client: &MqttClient) {
    for _ in 0..200 {
        if client.is_connected() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("client never connected");
}

#[tokio::test]
async fn test_worker_sends_disconnect_on_shutdown() {
    let (port, broker) = spawn_stub_broker().await;
    let options = options(port);
    let (client, connection) =
        MqttClient::new(&options.broker_address, options.publish_timeout).unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let worker = tokio::spawn(async move {
        mqtt::run(
            &options,
            connection,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.await;
            }),
        )
        .await;
    });

    wait_connected(&client).await;
    client
        .publish("devices/status/device-123", b"0".to_vec())
        .await
        .unwrap();

    // Same order as the bridge shutdown: queue DISCONNECT, then stop the worker.
    client.disconnect().await.unwrap();
    let _ = shutdown_tx.send(());
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .unwrap()
        .unwrap();

    let received = tokio::time::timeout(Duration::from_secs(5), broker)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(received[0] >> 4, 3, "status publish reaches the broker");
    assert!(received.ends_with(&DISCONNECT));
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_worker_drains_disconnect_queued_after_shutdown_signal() {
    let (port, broker) = spawn_stub_broker().await;
    let options = options(port);
    let (client, connection) =
        MqttClient::new(&options.broker_address, options.publish_timeout).unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let worker = tokio::spawn(async move {
        mqtt::run(
            &options,
            connection,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.await;
            }),
        )
        .await;
    });

    wait_connected(&client).await;
    let _ = shutdown_tx.send(());
    tokio::time::sleep(Duration::from_millis(50)).await;
    client.disconnect().await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .unwrap()
        .unwrap();
    let received = tokio::time::timeout(Duration::from_secs(5), broker)
        .await
        .unwrap()
        .unwrap();
    assert!(received.ends_with(&DISCONNECT));
}

#[tokio::test]
async fn test_worker_stops_when_broker_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let options = options(port);
    let (client, connection) =
        MqttClient::new(&options.broker_address, options.publish_timeout).unwrap();

    let worker = tokio::spawn(async move {
        mqtt::run(
            &options,
            connection,
            tokio::time::sleep,
            Box::pin(tokio::time::sleep(Duration::from_millis(100))),
        )
        .await;
    });

    let _ = client.disconnect().await;
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .unwrap()
        .unwrap();

    let err = client
        .publish("devices/status/device-123", b"0".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::PublishError(_)));
}
