// ABOUTME: Authenticated request executor for the Intervals.icu API
// ABOUTME: Basic credential, rate-limit retry with backoff, content-type-aware decoding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! The single chokepoint for outbound HTTP.
//!
//! Every upstream call flows through [`UpstreamClient::execute`], which owns
//! credential encoding, the 429 retry policy, and response decoding. File
//! downloads use [`UpstreamClient::download`], a one-shot variant that
//! returns the raw bytes base64-encoded.

use crate::config::GatewayConfig;
use crate::errors::{GatewayError, GatewayResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Fixed Basic-auth username the upstream expects alongside the API key
const BASIC_AUTH_USER: &str = "API_KEY";

/// Content type reported for downloads when the upstream omits one
const OCTET_STREAM: &str = "application/octet-stream";

/// Configuration for rate-limit retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first included
    pub max_attempts: u32,
    /// Backoff before the first retry; doubles on each subsequent one
    pub initial_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

/// One outbound request, constructed per call and never retained
#[derive(Debug)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    /// GET request for a path
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Append a query parameter only when the value is present. Absent
    /// values never reach the wire; there is no `key=undefined` serialization.
    #[must_use]
    pub fn query_opt(mut self, key: &'static str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.query.push((key, value.to_string()));
        }
        self
    }

    /// Attach a JSON body
    #[must_use]
    pub fn body(mut self, body: impl Serialize) -> Self {
        self.body = serde_json::to_value(body).ok();
        self
    }
}

/// Decoded upstream response, tagged by status and content type
#[derive(Debug)]
pub enum UpstreamResponse {
    /// Parsed JSON document
    Json(Value),
    /// Raw CSV text
    Csv(String),
    /// 204 No Content
    Empty,
}

/// Result of a binary file download
#[derive(Debug, Clone, Serialize)]
pub struct BinaryDownload {
    /// Full response body, base64-encoded
    pub file_base64: String,
    /// Upstream content type, or `application/octet-stream` when omitted
    pub content_type: String,
}

/// Authenticated HTTP client for the upstream service
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    config: Arc<GatewayConfig>,
    retry: RetryConfig,
    http: Client,
}

impl UpstreamClient {
    /// Create a client with the default retry policy
    #[must_use]
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self::with_retry(config, RetryConfig::default())
    }

    /// Create a client with an explicit retry policy (tests shrink the backoff)
    #[must_use]
    pub fn with_retry(config: Arc<GatewayConfig>, retry: RetryConfig) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            config,
            retry,
            http,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Arc<GatewayConfig> {
        &self.config
    }

    /// Execute one request against the upstream service.
    ///
    /// HTTP 429 is retried with exponential backoff up to the configured
    /// attempt budget; every other non-2xx status surfaces immediately as
    /// [`GatewayError::Upstream`], 5xx included.
    ///
    /// # Errors
    ///
    /// `Upstream` for non-2xx statuses, `RetryExhausted` once the 429 budget
    /// is spent, `Internal` for transport failures and undecodable bodies.
    pub async fn execute(&self, spec: RequestSpec) -> GatewayResult<UpstreamResponse> {
        let url = format!("{}{}", self.config.base_url, spec.path);
        debug!("upstream {} {}", spec.method, spec.path);

        let mut attempt: u32 = 0;
        loop {
            let mut request = self
                .http
                .request(spec.method.clone(), &url)
                .header(AUTHORIZATION, self.basic_credential());
            if !spec.query.is_empty() {
                request = request.query(&spec.query);
            }
            if let Some(body) = &spec.body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(|e| {
                GatewayError::Internal(format!("request to {} failed: {e}", spec.path))
            })?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                attempt += 1;
                if attempt >= self.retry.max_attempts {
                    warn!(
                        "rate limit retries exhausted for {} after {} attempts",
                        spec.path, self.retry.max_attempts
                    );
                    return Err(GatewayError::RetryExhausted { path: spec.path });
                }
                let backoff = self.retry.initial_backoff * 2_u32.pow(attempt - 1);
                warn!(
                    "rate limited on {} - retry {}/{} after {:?}",
                    spec.path,
                    attempt,
                    self.retry.max_attempts - 1,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                error!("upstream {} failed - status: {status}, body: {body}", spec.path);
                return Err(GatewayError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            return Self::decode(response, &spec.path).await;
        }
    }

    /// Decode a successful response by status and content type
    async fn decode(response: reqwest::Response, path: &str) -> GatewayResult<UpstreamResponse> {
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(UpstreamResponse::Empty);
        }

        let content_type = header_str(&response, CONTENT_TYPE.as_str());
        if content_type.contains("text/csv") {
            let text = response.text().await.map_err(|e| {
                GatewayError::Internal(format!("failed to read CSV body from {path}: {e}"))
            })?;
            return Ok(UpstreamResponse::Csv(text));
        }

        // Anything else on this API is JSON; an unparsable success body is a
        // fault worth surfacing, not data worth passing along.
        let value = response.json().await.map_err(|e| {
            GatewayError::Internal(format!("failed to parse JSON from {path}: {e}"))
        })?;
        Ok(UpstreamResponse::Json(value))
    }

    /// Download a binary file export.
    ///
    /// Unlike [`execute`](Self::execute), a 429 here is not retried and
    /// surfaces as `Upstream` immediately. Downloads have not been observed
    /// to be rate limited; the asymmetry is kept on purpose pending a
    /// stakeholder decision to unify the two paths.
    ///
    /// # Errors
    ///
    /// `Upstream` for any non-2xx status, `Internal` for transport failures.
    pub async fn download(&self, path: &str) -> GatewayResult<BinaryDownload> {
        let url = format!("{}{path}", self.config.base_url);
        debug!("upstream download {path}");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.basic_credential())
            .send()
            .await
            .map_err(|e| GatewayError::Internal(format!("download of {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("upstream download {path} failed - status: {status}, body: {body}");
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = match header_str(&response, CONTENT_TYPE.as_str()) {
            ct if ct.is_empty() => OCTET_STREAM.to_owned(),
            ct => ct,
        };

        let bytes = response.bytes().await.map_err(|e| {
            GatewayError::Internal(format!("failed to read download body from {path}: {e}"))
        })?;

        Ok(BinaryDownload {
            file_base64: BASE64.encode(&bytes),
            content_type,
        })
    }

    /// Basic credential with the fixed username, recomputed per call
    fn basic_credential(&self) -> String {
        let token = BASE64.encode(format!("{BASIC_AUTH_USER}:{}", self.config.api_key));
        format!("Basic {token}")
    }
}

fn header_str(response: &reqwest::Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}
