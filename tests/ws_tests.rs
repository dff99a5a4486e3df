//! End-to-end WebSocket tests against a live server on an ephemeral port.

#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use agrifund_gateway::api::build_app;
use agrifund_gateway::app_state::AppState;
use agrifund_gateway::config::GatewayConfig;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FARMER: &str = "0x1111111111111111111111111111111111111111";

async fn spawn_server() -> SocketAddr {
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let app = build_app(AppState::sandboxed(GatewayConfig::default()));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn connect(addr: SocketAddr) -> Socket {
    let Ok((socket, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };
    socket
}

async fn send_command(socket: &mut Socket, id: &str, payload: Value) {
    let envelope = json!({
        "id": id,
        "type": "command",
        "timestamp": "2026-01-01T00:00:00Z",
        "payload": payload,
    });
    let Ok(()) = socket.send(Message::text(envelope.to_string())).await else {
        panic!("ws send failed");
    };
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), socket.next()).await
        else {
            panic!("no ws message within timeout");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                panic!("server sent invalid JSON");
            };
            return value;
        }
    }
}

fn maize() -> Value {
    json!({
        "category": "Grains",
        "description": "Maize, two hectares",
        "identifier": "maize-2026",
        "chain": "sepolia",
        "currency": "DAI",
        "investment_amount": "320",
        "expected_return_amount": "480",
        "expected_return_period": "6m",
        "passport_image": {
            "uri": "ipfs://passport",
            "content_type": "image/jpeg",
            "size_bytes": 2048
        }
    })
}

#[tokio::test]
async fn wildcard_subscriber_sees_request_created() {
    let addr = spawn_server().await;
    let mut socket = connect(addr).await;

    send_command(
        &mut socket,
        "sub-1",
        json!({ "command": "subscribe", "request_ids": ["*"] }),
    )
    .await;
    let ack = next_json(&mut socket).await;
    assert_eq!(ack["type"], "response");
    assert_eq!(ack["id"], "sub-1");
    assert_eq!(ack["payload"]["wildcard"], true);

    let Ok(response) = reqwest::Client::new()
        .post(format!("http://{addr}/api/v1/requests"))
        .header("X-Wallet-Address", FARMER)
        .header("X-Wallet-Network", "sepolia")
        .json(&maize())
        .send()
        .await
    else {
        panic!("create request failed");
    };
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let Ok(created) = response.json::<Value>().await else {
        panic!("create response is not JSON");
    };

    let event = next_json(&mut socket).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["event_type"], "request_created");
    assert_eq!(event["payload"]["request_id"], created["request_id"]);
    assert_eq!(event["payload"]["kind"], "Funding-Request");
}

#[tokio::test]
async fn get_request_over_ws() {
    let addr = spawn_server().await;

    let Ok(response) = reqwest::Client::new()
        .post(format!("http://{addr}/api/v1/requests"))
        .header("X-Wallet-Address", FARMER)
        .header("X-Wallet-Network", "sepolia")
        .json(&maize())
        .send()
        .await
    else {
        panic!("create request failed");
    };
    let Ok(created) = response.json::<Value>().await else {
        panic!("create response is not JSON");
    };

    let mut socket = connect(addr).await;
    send_command(
        &mut socket,
        "get-1",
        json!({ "command": "get_request", "request_id": created["request_id"] }),
    )
    .await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["payload"]["status"], "available");
    assert_eq!(reply["payload"]["content"]["farmerAddress"], FARMER);

    send_command(
        &mut socket,
        "get-2",
        json!({ "command": "get_request", "request_id": "01deadbeef" }),
    )
    .await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["id"], "get-2");
}

#[tokio::test]
async fn malformed_and_unknown_commands_are_errors() {
    let addr = spawn_server().await;
    let mut socket = connect(addr).await;

    let Ok(()) = socket.send(Message::text("not json".to_string())).await else {
        panic!("ws send failed");
    };
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 400);

    send_command(&mut socket, "x-1", json!({ "command": "close_request" })).await;
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 404);
}
