//! Round trips against an in-process websocket server playing rosbridge.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use helix_motion_core::{
    Backend, BackendError, BridgeOptions, Capability, Channel, Connector, Endpoint,
};
use helix_motion_transport::RosbridgeConnector;
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Accept one client, answer its service calls, and return every op it sent.
async fn fake_rosbridge() -> (Endpoint, JoinHandle<Vec<Value>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let mut seen = Vec::new();

        while let Some(Ok(msg)) = ws.next().await {
            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };
            let op: Value = serde_json::from_str(&text).unwrap();

            if op["op"] == "call_service" {
                let (values, result) = match op["service"].as_str().unwrap() {
                    "/rosapi/topics" => (
                        json!({
                            "topics": ["/tendon_transmission_node/commands", "/tendon_transmission_node/tendon_states"],
                            "types": ["std_msgs/msg/Float64MultiArray", "sensor_msgs/msg/JointState"]
                        }),
                        true,
                    ),
                    "/rosapi/services" => (
                        json!({"services": ["/helix_cartesian_control_node/reset_model"]}),
                        true,
                    ),
                    "/broken" => (json!("Service /broken does not exist"), false),
                    _ => (json!({"success": true, "message": ""}), true),
                };
                let reply = json!({
                    "op": "service_response",
                    "id": op["id"],
                    "service": op["service"],
                    "values": values,
                    "result": result
                });
                ws.send(Message::Text(reply.to_string())).await.unwrap();
            }
            seen.push(op);
        }
        seen
    });

    (Endpoint::new("127.0.0.1", port), handle)
}

#[tokio::test]
async fn test_advertised_merges_topics_and_services() {
    let (endpoint, server) = fake_rosbridge().await;
    let client = RosbridgeConnector::default().connect(&endpoint).await.unwrap();
    assert!(client.is_connected());

    let caps = client.advertised().await.unwrap();
    assert!(caps.contains(&Capability::topic("/tendon_transmission_node/commands")));
    assert!(caps.contains(&Capability::topic("/tendon_transmission_node/tendon_states")));
    assert!(caps.contains(&Capability::service("/helix_cartesian_control_node/reset_model")));
    assert_eq!(caps.len(), 3);

    client.close().await.unwrap();
    assert!(!client.is_connected());
    let seen = server.await.unwrap();
    assert_eq!(seen.len(), 2);
}

#[tokio::test]
async fn test_call_returns_values() {
    let (endpoint, server) = fake_rosbridge().await;
    let client = RosbridgeConnector::default().connect(&endpoint).await.unwrap();

    let reset = Channel::service("/helix_cartesian_control_node/reset_model", "std_srvs/Trigger");
    let values = client.call(&reset, None).await.unwrap();
    assert_eq!(values["success"], true);

    client.close().await.unwrap();
    let seen = server.await.unwrap();
    assert_eq!(seen[0]["type"], "std_srvs/Trigger");
    assert!(seen[0].get("args").is_none());
}

#[tokio::test]
async fn test_failed_service_is_error() {
    let (endpoint, server) = fake_rosbridge().await;
    let client = RosbridgeConnector::default().connect(&endpoint).await.unwrap();

    let broken = Channel::service("/broken", "std_srvs/Trigger");
    let err = client.call(&broken, Some(json!({}))).await.unwrap_err();
    assert!(matches!(err, BackendError::ServiceFailed { ref service, .. } if service == "/broken"));

    client.close().await.unwrap();
    server.await.unwrap();
}

#[tokio::test]
async fn test_publish_advertises_once_and_unadvertises_on_close() {
    let (endpoint, server) = fake_rosbridge().await;
    let client = RosbridgeConnector::default().connect(&endpoint).await.unwrap();

    let commands = Channel::topic("/tendon_transmission_node/commands", "std_msgs/msg/Float64MultiArray");
    client.publish(&commands, json!({"data": [0.1, 0.2]})).await.unwrap();
    client.publish(&commands, json!({"data": [0.3, 0.4]})).await.unwrap();

    client.close().await.unwrap();
    // Second close is a no-op.
    client.close().await.unwrap();

    let ops: Vec<String> = server
        .await
        .unwrap()
        .iter()
        .map(|op| op["op"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ops, vec!["advertise", "publish", "publish", "unadvertise"]);
}

#[tokio::test]
async fn test_calls_after_close_fail() {
    let (endpoint, server) = fake_rosbridge().await;
    let client = RosbridgeConnector::default().connect(&endpoint).await.unwrap();
    client.close().await.unwrap();

    let commands = Channel::topic("/tendon_transmission_node/commands", "std_msgs/msg/Float64MultiArray");
    let err = client.publish(&commands, json!({"data": []})).await.unwrap_err();
    assert!(matches!(err, BackendError::ConnectionClosed));
    server.await.unwrap();
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let options = BridgeOptions {
        connect_timeout: Duration::from_secs(2),
        ..BridgeOptions::default()
    };
    let result = RosbridgeConnector::new(options)
        .connect(&Endpoint::new("127.0.0.1", port))
        .await;
    assert!(matches!(
        result,
        Err(BackendError::ConnectFailed(_) | BackendError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_peer_close_fails_fast() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let _ = ws.close(None).await;
        // Drain until the client acknowledges the close.
        while let Some(Ok(_)) = ws.next().await {}
    });

    let client = RosbridgeConnector::default()
        .connect(&Endpoint::new("127.0.0.1", port))
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while client.is_connected() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let commands = Channel::topic("/tendon_transmission_node/commands", "std_msgs/msg/Float64MultiArray");
    let err = client.publish(&commands, json!({"data": [0.1]})).await.unwrap_err();
    assert!(matches!(err, BackendError::ConnectionClosed));

    // No waiting out the call timeout.
    let reset = Channel::service("/helix_cartesian_control_node/reset_model", "std_srvs/Trigger");
    let err = tokio::time::timeout(Duration::from_secs(1), client.call(&reset, None))
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, BackendError::ConnectionClosed));

    client.close().await.unwrap();
    server.await.unwrap();
}
