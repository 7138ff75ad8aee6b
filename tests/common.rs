// ABOUTME: Shared test helpers: a configurable stub upstream with a request recorder
// ABOUTME: Tests point the gateway at a loopback server and assert on recorded traffic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! Test infrastructure shared by the integration suites.

use axum::body::Body;
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempo_gateway::config::GatewayConfig;
use tempo_gateway::upstream::{IntervalsProvider, RetryConfig, UpstreamClient};

/// One request observed by the stub upstream
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: String,
    pub body: Option<Value>,
}

/// A scripted response; a queue of these per route replays in order, with
/// the final entry repeating for any further calls
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
}

impl StubResponse {
    pub fn json(value: Value) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json"),
            body: value.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: String::new(),
        }
    }

    pub fn error(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain"),
            body: body.to_owned(),
        }
    }

    pub fn csv(body: &str) -> Self {
        Self {
            status: 200,
            content_type: Some("text/csv"),
            body: body.to_owned(),
        }
    }
}

/// Scriptable upstream double with a request log
#[derive(Debug, Clone, Default)]
pub struct StubUpstream {
    routes: Arc<Mutex<HashMap<String, VecDeque<StubResponse>>>>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `"METHOD /path"`
    pub fn stub(&self, route: &str, response: StubResponse) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_owned())
            .or_default()
            .push_back(response);
        self
    }

    pub fn stub_json(&self, route: &str, value: Value) -> &Self {
        self.stub(route, StubResponse::json(value))
    }

    /// All requests seen so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }

    /// Requests whose `"METHOD /path"` matches
    pub fn calls_to(&self, route: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| format!("{} {}", r.method, r.path) == route)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Bind on a loopback port and serve; returns the base URL
    pub async fn serve(&self) -> String {
        let stub = self.clone();
        let router = Router::new().fallback(move |request: Request| {
            let stub = stub.clone();
            async move { stub.respond(request).await }
        });
        spawn_server(router).await
    }

    async fn respond(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .unwrap_or_default();

        self.log.lock().unwrap().push(RecordedRequest {
            method: parts.method.to_string(),
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().unwrap_or_default().to_owned(),
            authorization: parts
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned(),
            body: serde_json::from_slice(&bytes).ok(),
        });

        let key = format!("{} {}", parts.method, parts.uri.path());
        let scripted = {
            let mut routes = self.routes.lock().unwrap();
            routes.get_mut(&key).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };

        match scripted {
            Some(response) => {
                let mut builder = Response::builder().status(response.status);
                if let Some(content_type) = response.content_type {
                    builder = builder.header(CONTENT_TYPE, content_type);
                }
                builder.body(Body::from(response.body)).unwrap()
            }
            None => Response::builder()
                .status(404)
                .body(Body::from(format!("no stub for {key}")))
                .unwrap(),
        }
    }
}

/// Serve any router on a loopback port, returning its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Gateway configuration pointed at a stub upstream
pub fn test_config(base_url: &str) -> Arc<GatewayConfig> {
    Arc::new(GatewayConfig {
        api_key: "test-key".into(),
        base_url: base_url.trim_end_matches('/').to_owned(),
        athlete_id: "0".into(),
        gateway_secret: None,
        webhook_secret: None,
        http_port: 0,
        request_timeout: Duration::from_secs(5),
    })
}

/// Provider with a millisecond-scale retry backoff for fast tests
pub fn test_provider(base_url: &str) -> IntervalsProvider {
    let retry = RetryConfig {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(10),
    };
    IntervalsProvider::new(UpstreamClient::with_retry(test_config(base_url), retry))
}
