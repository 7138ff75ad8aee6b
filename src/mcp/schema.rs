// ABOUTME: MCP protocol schema definitions and the gateway's tool declarations
// ABOUTME: Typed tool schemas so the protocol surface is built in code, not JSON blobs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! MCP protocol schema definitions.
//!
//! Type-safe structures for tool declarations and tool-call results, plus
//! the full declared tool list of the gateway.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// MCP protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server information reported on initialize
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// MCP tool schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonSchema,
}

/// JSON Schema definition for tool inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, PropertySchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// JSON Schema property definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Content block of a tool result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Tool response after execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub content: Vec<Content>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResponse {
    /// Success result wrapping one text block
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::Text { text: text.into() }],
            is_error: false,
        }
    }
}

fn prop(property_type: &str, description: &str) -> PropertySchema {
    PropertySchema {
        property_type: property_type.to_owned(),
        description: Some(description.to_owned()),
    }
}

fn schema(properties: Vec<(&str, PropertySchema)>, required: Vec<&str>) -> JsonSchema {
    JsonSchema {
        schema_type: "object".to_owned(),
        properties: if properties.is_empty() {
            None
        } else {
            Some(
                properties
                    .into_iter()
                    .map(|(name, schema)| (name.to_owned(), schema))
                    .collect(),
            )
        },
        required: if required.is_empty() {
            None
        } else {
            Some(required.into_iter().map(str::to_owned).collect())
        },
    }
}

fn tool(name: &str, description: &str, input_schema: JsonSchema) -> ToolSchema {
    ToolSchema {
        name: name.to_owned(),
        description: description.to_owned(),
        input_schema,
    }
}

/// The gateway's declared tool list
#[must_use]
pub fn tool_schemas() -> Vec<ToolSchema> {
    let oldest = || prop("string", "Start of the date range, yyyy-MM-dd");
    let newest = || prop("string", "End of the date range, yyyy-MM-dd");

    vec![
        tool(
            "get_wellness",
            "Wellness records (sleep, HRV, fatigue, weight) for a date range",
            schema(
                vec![("oldest", oldest()), ("newest", newest())],
                vec!["oldest", "newest"],
            ),
        ),
        tool(
            "get_activities",
            "Completed activity summaries for a date range",
            schema(
                vec![
                    ("oldest", oldest()),
                    ("newest", newest()),
                    (
                        "type",
                        prop("string", "Only activities of this sport type, e.g. Ride"),
                    ),
                    (
                        "limit",
                        prop("number", "Maximum number of activities to return"),
                    ),
                ],
                vec!["oldest", "newest"],
            ),
        ),
        tool(
            "get_activity_details",
            "Full detail for one activity, including interval breakdown",
            schema(
                vec![
                    ("activity_id", prop("string", "Activity id")),
                    (
                        "include_intervals",
                        prop("boolean", "Include interval data (default true)"),
                    ),
                ],
                vec!["activity_id"],
            ),
        ),
        tool(
            "get_events",
            "Planned calendar events for a date range",
            schema(
                vec![
                    ("oldest", oldest()),
                    ("newest", newest()),
                    (
                        "category",
                        prop("string", "Only events of this category, e.g. WORKOUT"),
                    ),
                ],
                vec!["oldest", "newest"],
            ),
        ),
        tool(
            "get_event",
            "One calendar event by id",
            schema(
                vec![("event_id", prop("string", "Event id"))],
                vec!["event_id"],
            ),
        ),
        tool(
            "list_workouts",
            "The athlete's workout library",
            schema(vec![], vec![]),
        ),
        tool(
            "get_power_curves",
            "Power duration curves ending at a date",
            schema(
                vec![
                    (
                        "newest",
                        prop("string", "End date of the curve window, yyyy-MM-dd"),
                    ),
                    (
                        "oldest",
                        prop("string", "Start date of the curve window, yyyy-MM-dd"),
                    ),
                    ("type", prop("string", "Sport type, e.g. Ride")),
                ],
                vec!["newest"],
            ),
        ),
        tool(
            "export_activities_csv",
            "Activity export for a date range as raw CSV",
            schema(
                vec![("oldest", oldest()), ("newest", newest())],
                vec!["oldest", "newest"],
            ),
        ),
        tool(
            "download_workout_file",
            "Download a workout from the library as a training file (base64)",
            schema(
                vec![
                    ("workout_id", prop("string", "Workout id in the library")),
                    (
                        "format",
                        prop("string", "File format: zwo, mrc, erg, or fit (default zwo)"),
                    ),
                ],
                vec!["workout_id"],
            ),
        ),
        tool(
            "get_training_overview",
            "Wellness, completed activities, and planned events for one range, side by side",
            schema(
                vec![
                    ("oldest", oldest()),
                    ("newest", newest()),
                    (
                        "activity_type",
                        prop("string", "Only activities of this sport type"),
                    ),
                ],
                vec!["oldest", "newest"],
            ),
        ),
        tool(
            "get_planning_context",
            "Upcoming events, workout library, and recent wellness around a pivot date",
            schema(
                vec![
                    ("from_date", prop("string", "Pivot date, yyyy-MM-dd")),
                    (
                        "span_days",
                        prop("number", "Days to look forward for events (default 7)"),
                    ),
                    (
                        "wellness_days_back",
                        prop("number", "Days of wellness history (default 7)"),
                    ),
                ],
                vec!["from_date"],
            ),
        ),
        tool(
            "get_activities_with_details",
            "Activities in a range, each expanded with interval detail (capped at 20)",
            schema(
                vec![
                    ("oldest", oldest()),
                    ("newest", newest()),
                    ("type", prop("string", "Only activities of this sport type")),
                ],
                vec!["oldest", "newest"],
            ),
        ),
        tool(
            "get_event_with_activity",
            "A calendar event plus the completed activity it links to, if any",
            schema(
                vec![("event_id", prop("string", "Event id"))],
                vec!["event_id"],
            ),
        ),
        tool(
            "get_gateway_status",
            "Gateway and upstream connectivity status; reports failures instead of erroring",
            schema(vec![], vec![]),
        ),
    ]
}
