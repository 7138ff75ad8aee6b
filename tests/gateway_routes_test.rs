// ABOUTME: End-to-end HTTP tests for the gateway router: MCP, webhook, gate, health
// ABOUTME: Spins both the gateway and a stub upstream on loopback and drives real requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! Gateway HTTP surface integration tests.

mod common;

use common::{spawn_server, test_config, StubUpstream};
use serde_json::{json, Value};
use std::sync::Arc;
use tempo_gateway::config::GatewayConfig;
use tempo_gateway::routes::{GatewayResources, GatewayRoutes};

/// Spin up a gateway pointed at the given upstream, with optional secrets
async fn spawn_gateway(
    upstream_url: &str,
    gateway_secret: Option<&str>,
    webhook_secret: Option<&str>,
) -> String {
    let base = test_config(upstream_url);
    let config = GatewayConfig {
        gateway_secret: gateway_secret.map(str::to_owned),
        webhook_secret: webhook_secret.map(str::to_owned),
        ..(*base).clone()
    };
    let resources = Arc::new(GatewayResources::new(Arc::new(config)));
    spawn_server(GatewayRoutes::router(resources)).await
}

fn rpc(method: &str, params: Value) -> Value {
    json!({"jsonrpc": "2.0", "method": method, "params": params, "id": 1})
}

async fn post_json(url: &str, body: &Value, bearer: Option<&str>) -> reqwest::Response {
    let client = reqwest::Client::new();
    let mut request = client.post(url).json(body);
    if let Some(token) = bearer {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    request.send().await.unwrap()
}

#[tokio::test]
async fn test_tools_list_declares_the_full_surface() {
    let stub = StubUpstream::new();
    let gateway = spawn_gateway(&stub.serve().await, None, None).await;

    let response = post_json(&format!("{gateway}/mcp"), &rpc("tools/list", json!({})), None).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 14);
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert!(names.contains(&"get_training_overview"));
    assert!(names.contains(&"get_gateway_status"));
}

#[tokio::test]
async fn test_tools_call_round_trip() {
    let stub = StubUpstream::new();
    stub.stub_json(
        "GET /api/v1/athlete/0/activities",
        json!([{"id": 1, "name": "Morning Ride"}]),
    );
    let gateway = spawn_gateway(&stub.serve().await, None, None).await;

    let params = json!({
        "name": "get_activities",
        "arguments": {"oldest": "2026-01-01", "newest": "2026-01-31"},
    });
    let response = post_json(&format!("{gateway}/mcp"), &rpc("tools/call", params), None).await;
    let body: Value = response.json().await.unwrap();

    assert!(body["error"].is_null());
    assert_eq!(body["result"]["isError"], false);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    let payload: Value = serde_json::from_str(text).unwrap();
    assert_eq!(payload[0]["name"], "Morning Ride");
}

#[tokio::test]
async fn test_unknown_method_and_parse_errors() {
    let stub = StubUpstream::new();
    let gateway = spawn_gateway(&stub.serve().await, None, None).await;
    let mcp = format!("{gateway}/mcp");

    let body: Value = post_json(&mcp, &rpc("resources/list", json!({})), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["error"]["code"], -32601);

    let client = reqwest::Client::new();
    let response = client
        .post(&mcp)
        .body("this is not jsonrpc")
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32700);
}

#[tokio::test]
async fn test_gate_open_without_secret_even_for_garbage_headers() {
    let stub = StubUpstream::new();
    let gateway = spawn_gateway(&stub.serve().await, None, None).await;

    let response = post_json(
        &format!("{gateway}/mcp"),
        &rpc("ping", json!({})),
        Some("total-garbage"),
    )
    .await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_gate_enforces_configured_secret() {
    let stub = StubUpstream::new();
    let gateway = spawn_gateway(&stub.serve().await, Some("s3cret"), None).await;
    let mcp = format!("{gateway}/mcp");
    let ping = rpc("ping", json!({}));

    let denied = post_json(&mcp, &ping, None).await;
    assert_eq!(denied.status(), 401);
    let body: Value = denied.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
    assert!(body["detail"].is_string());

    let wrong = post_json(&mcp, &ping, Some("s3cret ")).await;
    assert_eq!(wrong.status(), 401);

    let allowed = post_json(&mcp, &ping, Some("s3cret")).await;
    assert_eq!(allowed.status(), 200);

    // No upstream traffic resulted from the rejected attempts
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn test_webhook_gate_falls_back_to_gateway_secret() {
    let stub = StubUpstream::new();
    stub.stub_json("POST /api/v1/athlete/0/events", json!({"id": 1}));
    let gateway = spawn_gateway(&stub.serve().await, Some("s3cret"), None).await;
    let webhook = format!("{gateway}/webhook");
    let payload = json!({"start_date_local": "2026-02-02"});

    let denied = post_json(&webhook, &payload, None).await;
    assert_eq!(denied.status(), 401);

    let allowed = post_json(&webhook, &payload, Some("s3cret")).await;
    assert_eq!(allowed.status(), 200);
}

#[tokio::test]
async fn test_webhook_dedicated_secret_wins_over_gateway_secret() {
    let stub = StubUpstream::new();
    stub.stub_json("POST /api/v1/athlete/0/events", json!({"id": 1}));
    let gateway = spawn_gateway(&stub.serve().await, Some("s3cret"), Some("hook-secret")).await;
    let webhook = format!("{gateway}/webhook");
    let payload = json!({"start_date_local": "2026-02-02"});

    let with_gateway_secret = post_json(&webhook, &payload, Some("s3cret")).await;
    assert_eq!(with_gateway_secret.status(), 401);

    let with_hook_secret = post_json(&webhook, &payload, Some("hook-secret")).await;
    assert_eq!(with_hook_secret.status(), 200);
}

#[tokio::test]
async fn test_webhook_error_body_shape() {
    let stub = StubUpstream::new();
    let gateway = spawn_gateway(&stub.serve().await, None, None).await;

    let response = post_json(
        &format!("{gateway}/webhook"),
        &json!({"name": "no date here"}),
        None,
    )
    .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn test_webhook_descriptor_and_health_are_open() {
    let stub = StubUpstream::new();
    let gateway = spawn_gateway(&stub.serve().await, Some("s3cret"), None).await;
    let client = reqwest::Client::new();

    let descriptor: Value = client
        .get(format!("{gateway}/webhook"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(descriptor["actions"], json!(["create", "update", "delete"]));
    assert_eq!(descriptor["default_action"], "create");

    let health = client
        .get(format!("{gateway}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), 200);
    let body: Value = health.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_status_tool_reports_dead_upstream_in_band() {
    // Point the gateway at a port nothing listens on
    let gateway = spawn_gateway("http://127.0.0.1:9", None, None).await;

    let params = json!({"name": "get_gateway_status", "arguments": {}});
    let response = post_json(&format!("{gateway}/mcp"), &rpc("tools/call", params), None).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_null(), "status tool must not fail at the protocol level");
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    let status: Value = serde_json::from_str(text).unwrap();
    assert_eq!(status["connected"], false);
    assert!(status["error"].is_string());
}

#[tokio::test]
async fn test_tool_failure_propagates_as_protocol_error() {
    let stub = StubUpstream::new();
    stub.stub(
        "GET /api/v1/athlete/0/events/9",
        common::StubResponse::error(500, "boom"),
    );
    let gateway = spawn_gateway(&stub.serve().await, None, None).await;

    let params = json!({"name": "get_event", "arguments": {"event_id": "9"}});
    let response = post_json(&format!("{gateway}/mcp"), &rpc("tools/call", params), None).await;
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["error"]["code"], -32000);
    assert_eq!(body["error"]["data"]["http_status"], 502);
}
