// ABOUTME: Tool execution handlers routing MCP tool calls to the upstream API
// ABOUTME: Extracts and validates arguments, runs the call, wraps results as text content
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! Tool call routing and execution.
//!
//! One match arm per declared tool. Results are JSON serialized into a text
//! content block; the CSV export returns its text verbatim. Failures become
//! JSON-RPC errors, except for the status tool, which exists to report
//! connectivity problems and therefore folds them into a success-shaped
//! result instead.

use super::schema::{tool_schemas, ServerInfo, ToolResponse, PROTOCOL_VERSION};
use crate::errors::{GatewayError, GatewayResult};
use crate::jsonrpc::{error_codes, JsonRpcRequest, JsonRpcResponse};
use crate::pipelines;
use crate::upstream::{IntervalsProvider, WorkoutFileFormat};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default forward window for the planning context, in days
const DEFAULT_SPAN_DAYS: u32 = 7;

/// Default wellness lookback for the planning context, in days
const DEFAULT_WELLNESS_DAYS_BACK: u32 = 7;

/// Tool execution handlers for the MCP protocol
pub struct ToolHandlers;

impl ToolHandlers {
    /// Handle one JSON-RPC request against the MCP surface
    pub async fn handle(request: JsonRpcRequest, api: &IntervalsProvider) -> JsonRpcResponse {
        let method = request.method.clone();
        match method.as_str() {
            "initialize" => JsonRpcResponse::success(
                request.id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": ServerInfo {
                        name: env!("CARGO_PKG_NAME").to_owned(),
                        version: env!("CARGO_PKG_VERSION").to_owned(),
                    },
                }),
            ),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => {
                JsonRpcResponse::success(request.id, json!({ "tools": tool_schemas() }))
            }
            "tools/call" => Self::handle_tools_call(request, api).await,
            other => {
                debug!("unknown MCP method: {other}");
                JsonRpcResponse::error(
                    request.id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("method '{other}' not found"),
                )
            }
        }
    }

    async fn handle_tools_call(request: JsonRpcRequest, api: &IntervalsProvider) -> JsonRpcResponse {
        let params = request.params.unwrap_or(Value::Null);
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_PARAMS,
                "tools/call requires a tool name",
            );
        };
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let started = Instant::now();
        match Self::dispatch(name, &arguments, api).await {
            Ok(response) => {
                info!(
                    "tool {name} completed in {}ms",
                    started.elapsed().as_millis()
                );
                JsonRpcResponse::success(request.id, json!(response))
            }
            Err(error) => {
                warn!("tool {name} failed: {error}");
                let (code, data) = rpc_error_parts(&error);
                JsonRpcResponse::error_with_data(request.id, code, error.to_string(), data)
            }
        }
    }

    /// Route one tool call to the API or a pipeline
    async fn dispatch(
        name: &str,
        args: &Value,
        api: &IntervalsProvider,
    ) -> GatewayResult<ToolResponse> {
        match name {
            "get_wellness" => {
                let value = api
                    .wellness_range(require_str(args, "oldest")?, require_str(args, "newest")?)
                    .await?;
                json_result(&value)
            }
            "get_activities" => {
                let value = api
                    .activities_range(
                        require_str(args, "oldest")?,
                        require_str(args, "newest")?,
                        opt_str(args, "type"),
                        opt_u32(args, "limit")?,
                    )
                    .await?;
                json_result(&value)
            }
            "get_activity_details" => {
                let value = api
                    .activity(
                        require_str(args, "activity_id")?,
                        opt_bool(args, "include_intervals").unwrap_or(true),
                    )
                    .await?;
                json_result(&value)
            }
            "get_events" => {
                let value = api
                    .events_range(
                        require_str(args, "oldest")?,
                        require_str(args, "newest")?,
                        opt_str(args, "category"),
                    )
                    .await?;
                json_result(&value)
            }
            "get_event" => {
                let value = api.event(require_str(args, "event_id")?).await?;
                json_result(&value)
            }
            "list_workouts" => {
                let value = api.workouts().await?;
                json_result(&value)
            }
            "get_power_curves" => {
                let value = api
                    .power_curves(
                        require_str(args, "newest")?,
                        opt_str(args, "oldest"),
                        opt_str(args, "type"),
                    )
                    .await?;
                json_result(&value)
            }
            "export_activities_csv" => {
                let csv = api
                    .activities_csv(require_str(args, "oldest")?, require_str(args, "newest")?)
                    .await?;
                Ok(ToolResponse::text(csv))
            }
            "download_workout_file" => {
                let format: WorkoutFileFormat =
                    opt_str(args, "format").unwrap_or("zwo").parse()?;
                let download = api
                    .download_workout(require_str(args, "workout_id")?, format)
                    .await?;
                json_result(&json!(download))
            }
            "get_training_overview" => {
                let value = pipelines::training_overview(
                    api,
                    require_str(args, "oldest")?,
                    require_str(args, "newest")?,
                    opt_str(args, "activity_type"),
                )
                .await?;
                json_result(&value)
            }
            "get_planning_context" => {
                let value = pipelines::planning_context(
                    api,
                    require_str(args, "from_date")?,
                    opt_u32(args, "span_days")?.unwrap_or(DEFAULT_SPAN_DAYS),
                    opt_u32(args, "wellness_days_back")?.unwrap_or(DEFAULT_WELLNESS_DAYS_BACK),
                )
                .await?;
                json_result(&value)
            }
            "get_activities_with_details" => {
                let value = pipelines::activities_with_details(
                    api,
                    require_str(args, "oldest")?,
                    require_str(args, "newest")?,
                    opt_str(args, "type"),
                )
                .await?;
                json_result(&value)
            }
            "get_event_with_activity" => {
                let value =
                    pipelines::event_completed_activity(api, require_str(args, "event_id")?)
                        .await?;
                json_result(&value)
            }
            "get_gateway_status" => Ok(Self::gateway_status(api).await),
            other => Err(GatewayError::InvalidInput(format!(
                "unknown tool '{other}'"
            ))),
        }
    }

    /// Connectivity probe. Designed to report failure, not raise it: a dead
    /// upstream still yields a success-shaped envelope describing the fault.
    async fn gateway_status(api: &IntervalsProvider) -> ToolResponse {
        let config = api.client().config();
        let status = match api.athlete_profile().await {
            Ok(profile) => json!({
                "connected": true,
                "base_url": config.base_url,
                "athlete_id": config.athlete_id,
                "athlete": profile.get("name").cloned().unwrap_or(Value::Null),
            }),
            Err(error) => json!({
                "connected": false,
                "base_url": config.base_url,
                "athlete_id": config.athlete_id,
                "error": error.to_string(),
            }),
        };
        ToolResponse::text(serialize_pretty(&status))
    }
}

/// Wrap a JSON document as a text tool result
fn json_result(value: &Value) -> GatewayResult<ToolResponse> {
    Ok(ToolResponse::text(serialize_pretty(value)))
}

fn serialize_pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn require_str<'a>(args: &'a Value, key: &str) -> GatewayResult<&'a str> {
    args.get(key).and_then(Value::as_str).ok_or_else(|| {
        GatewayError::InvalidInput(format!("required argument '{key}' is missing"))
    })
}

fn opt_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn opt_bool(args: &Value, key: &str) -> Option<bool> {
    args.get(key).and_then(Value::as_bool)
}

fn opt_u32(args: &Value, key: &str) -> GatewayResult<Option<u32>> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                GatewayError::InvalidInput(format!(
                    "argument '{key}' must be a non-negative integer"
                ))
            }),
    }
}

/// JSON-RPC error code and data payload for a failed tool call
fn rpc_error_parts(error: &GatewayError) -> (i32, Value) {
    let code = match error {
        GatewayError::InvalidInput(_) => error_codes::INVALID_PARAMS,
        GatewayError::Upstream { .. } | GatewayError::RetryExhausted { .. } => {
            error_codes::SERVER_ERROR
        }
        _ => error_codes::INTERNAL_ERROR,
    };
    let data = json!({
        "error": error.tag(),
        "http_status": error.http_status().as_u16(),
    });
    (code, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_extraction() {
        let args = json!({"oldest": "2026-01-01", "limit": 5, "include_intervals": false});
        assert_eq!(require_str(&args, "oldest").unwrap(), "2026-01-01");
        assert!(require_str(&args, "newest").is_err());
        assert_eq!(opt_u32(&args, "limit").unwrap(), Some(5));
        assert_eq!(opt_u32(&args, "missing").unwrap(), None);
        assert!(opt_u32(&json!({"limit": "five"}), "limit").is_err());
        assert_eq!(opt_bool(&args, "include_intervals"), Some(false));
    }

    #[test]
    fn test_rpc_error_mapping() {
        let (code, data) = rpc_error_parts(&GatewayError::InvalidInput("x".into()));
        assert_eq!(code, error_codes::INVALID_PARAMS);
        assert_eq!(data["http_status"], 400);

        let (code, data) = rpc_error_parts(&GatewayError::Upstream {
            status: 500,
            body: String::new(),
        });
        assert_eq!(code, error_codes::SERVER_ERROR);
        assert_eq!(data["http_status"], 502);
    }
}
