// ABOUTME: Webhook action router classifying payloads into create, update, or delete
// ABOUTME: Normalizes loose inbound fields into one typed request before dispatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! # Webhook Action Router
//!
//! One inbound payload maps to exactly one of three terminal outcomes:
//! create, update, or delete of a calendar event. The body may arrive as
//! JSON, as a form field holding a JSON string, or with no declared content
//! type at all. Whatever the transport, the payload is normalized into a
//! typed action before anything touches the upstream, so the dispatch logic
//! never sees the loose field spellings clients actually send.

use crate::errors::{GatewayError, GatewayResult};
use crate::upstream::IntervalsProvider;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::{debug, info};

/// Form field names that may carry the JSON document
const FORM_PAYLOAD_FIELDS: [&str; 3] = ["payload", "json", "data"];

/// Accepted spellings of the event start date
const START_DATE_FIELDS: [&str; 2] = ["start_date_local", "start_date"];

/// Accepted spellings of the event id
const EVENT_ID_FIELDS: [&str; 2] = ["id", "event_id"];

/// Fields that route the request and are never forwarded upstream
const ROUTING_FIELDS: [&str; 6] = ["action", "_action", "id", "event_id", "athlete_id", "athlete"];

/// Scalar type a create field is coerced to
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    Number,
    Flag,
}

/// Allow-listed optional create fields and their declared types
const CREATE_FIELDS: [(&str, FieldKind); 7] = [
    ("name", FieldKind::Text),
    ("description", FieldKind::Text),
    ("type", FieldKind::Text),
    ("category", FieldKind::Text),
    ("color", FieldKind::Text),
    ("distance", FieldKind::Number),
    ("icu_training_load", FieldKind::Number),
];

/// The three terminal webhook outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    Create,
    Update,
    Delete,
}

/// A parsed and validated inbound request, ready for dispatch
#[derive(Debug)]
enum RoutedRequest {
    Create { body: Value },
    Update { event_id: String, body: Value },
    Delete { event_id: String },
}

/// Webhook router over the upstream provider
pub struct WebhookRouter<'a> {
    api: &'a IntervalsProvider,
}

impl<'a> WebhookRouter<'a> {
    #[must_use]
    pub const fn new(api: &'a IntervalsProvider) -> Self {
        Self { api }
    }

    /// Handle one webhook request end to end.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for malformed bodies or missing required fields (no
    /// upstream call is made), `Upstream` when the service rejects the
    /// dispatched request.
    pub async fn handle(&self, content_type: Option<&str>, body: &[u8]) -> GatewayResult<Value> {
        let document = parse_document(content_type, body)?;
        let routed = route(document)?;

        match routed {
            RoutedRequest::Create { body } => {
                info!("webhook create event");
                let created = self.api.create_event(body).await?;
                Ok(json!({"status": "ok", "event": created}))
            }
            RoutedRequest::Update { event_id, body } => {
                info!("webhook update event {event_id}");
                let updated = self.api.update_event(&event_id, body).await?;
                Ok(json!({"status": "ok", "event": updated}))
            }
            RoutedRequest::Delete { event_id } => {
                info!("webhook delete event {event_id}");
                self.api.delete_event(&event_id).await?;
                Ok(json!({"status": "ok", "deleted": event_id}))
            }
        }
    }
}

/// Static capability descriptor served on GET
#[must_use]
pub fn capability_descriptor() -> Value {
    json!({
        "actions": ["create", "update", "delete"],
        "action_fields": ["action", "_action"],
        "default_action": "create",
        "start_date_fields": START_DATE_FIELDS,
        "event_id_fields": EVENT_ID_FIELDS,
        "form_payload_fields": FORM_PAYLOAD_FIELDS,
        "create_fields": {
            "name": "string",
            "description": "string",
            "type": "string",
            "category": "string",
            "color": "string",
            "distance": "number",
            "icu_training_load": "number",
            "indoor": "boolean",
            "moving_time": "number (alias: duration)",
            "workout_doc": "object",
        },
    })
}

/// Decode the raw body into a JSON object by declared content type
fn parse_document(content_type: Option<&str>, body: &[u8]) -> GatewayResult<Map<String, Value>> {
    let content_type = content_type.unwrap_or_default();

    let value: Value = if content_type.contains("application/x-www-form-urlencoded") {
        let form: HashMap<String, String> = serde_urlencoded::from_bytes(body)
            .map_err(|e| GatewayError::InvalidInput(format!("unparsable form body: {e}")))?;
        let raw = FORM_PAYLOAD_FIELDS
            .iter()
            .find_map(|field| form.get(*field))
            .ok_or_else(|| {
                GatewayError::InvalidInput(format!(
                    "form body must carry the JSON document under one of: {}",
                    FORM_PAYLOAD_FIELDS.join(", ")
                ))
            })?;
        serde_json::from_str(raw)
            .map_err(|e| GatewayError::InvalidInput(format!("form payload is not valid JSON: {e}")))?
    } else {
        // application/json, or no declared content type: best-effort JSON
        serde_json::from_slice(body)
            .map_err(|e| GatewayError::InvalidInput(format!("request body is not valid JSON: {e}")))?
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(GatewayError::InvalidInput(format!(
            "webhook payload must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Classify and normalize the document into one typed request
fn route(document: Map<String, Value>) -> GatewayResult<RoutedRequest> {
    let action = classify(&document)?;
    debug!("webhook action classified as {action:?}");

    match action {
        WebhookAction::Create => Ok(RoutedRequest::Create {
            body: normalize_create(&document)?,
        }),
        WebhookAction::Update => {
            let event_id = require_event_id(&document)?;
            Ok(RoutedRequest::Update {
                event_id,
                body: strip_routing_fields(document),
            })
        }
        WebhookAction::Delete => Ok(RoutedRequest::Delete {
            event_id: require_event_id(&document)?,
        }),
    }
}

/// Read `action` (or `_action`), case-insensitively, defaulting to create
fn classify(document: &Map<String, Value>) -> GatewayResult<WebhookAction> {
    let raw = document
        .get("action")
        .or_else(|| document.get("_action"))
        .and_then(Value::as_str);

    match raw.map(str::to_lowercase).as_deref() {
        None | Some("create") => Ok(WebhookAction::Create),
        Some("update") => Ok(WebhookAction::Update),
        Some("delete") => Ok(WebhookAction::Delete),
        Some(other) => Err(GatewayError::InvalidInput(format!(
            "unsupported action '{other}' (expected create, update, or delete)"
        ))),
    }
}

/// Build the upstream create body: required start date, allow-listed
/// optional fields with per-field coercion, canonical duration field.
fn normalize_create(document: &Map<String, Value>) -> GatewayResult<Value> {
    let raw_date = START_DATE_FIELDS
        .iter()
        .find_map(|field| document.get(*field))
        .ok_or_else(|| {
            GatewayError::InvalidInput(format!(
                "create requires a start date under one of: {}",
                START_DATE_FIELDS.join(", ")
            ))
        })?;
    let raw_date = raw_date.as_str().ok_or_else(|| {
        GatewayError::InvalidInput("start date must be a string".to_owned())
    })?;

    let mut body = Map::new();
    body.insert(
        "start_date_local".to_owned(),
        Value::String(normalize_start_date(raw_date)?),
    );

    for (field, kind) in CREATE_FIELDS {
        if let Some(value) = document.get(field) {
            body.insert(field.to_owned(), coerce(field, value, kind)?);
        }
    }

    // Either duration spelling lands in the canonical seconds field
    if let Some(value) = document.get("moving_time").or_else(|| document.get("duration")) {
        body.insert(
            "moving_time".to_owned(),
            coerce("moving_time", value, FieldKind::Number)?,
        );
    }

    if let Some(value) = document.get("indoor") {
        body.insert("indoor".to_owned(), coerce("indoor", value, FieldKind::Flag)?);
    }

    // A structured workout document is forwarded only as a plain object;
    // arrays and scalars here have produced broken calendar entries upstream.
    if let Some(doc) = document.get("workout_doc") {
        if !doc.is_object() {
            return Err(GatewayError::InvalidInput(format!(
                "workout_doc must be a JSON object, got {}",
                json_kind(doc)
            )));
        }
        body.insert("workout_doc".to_owned(), doc.clone());
    }

    Ok(Value::Object(body))
}

/// Normalize a start date: bare `yyyy-MM-dd` gains a midnight time suffix
/// (the upstream rejects date-only strings), anything already carrying a
/// time component passes through unchanged.
fn normalize_start_date(raw: &str) -> GatewayResult<String> {
    if chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() {
        return Ok(format!("{raw}T00:00:00"));
    }
    if raw.contains('T') {
        return Ok(raw.to_owned());
    }
    Err(GatewayError::InvalidInput(format!(
        "'{raw}' is not a yyyy-MM-dd date or ISO-8601 date-time"
    )))
}

/// Coerce a loose inbound value to the field's declared scalar type
fn coerce(field: &str, value: &Value, kind: FieldKind) -> GatewayResult<Value> {
    let coerced = match kind {
        FieldKind::Text => match value {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        FieldKind::Number => match value {
            Value::Number(n) => Some(Value::Number(n.clone())),
            Value::String(s) => s
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(Value::Number)
                }),
            _ => None,
        },
        FieldKind::Flag => match value {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::String(s) => match s.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
    };

    coerced.ok_or_else(|| {
        GatewayError::InvalidInput(format!(
            "field '{field}' has the wrong type ({})",
            json_kind(value)
        ))
    })
}

/// Event id under either accepted spelling, as number or numeric string
fn require_event_id(document: &Map<String, Value>) -> GatewayResult<String> {
    EVENT_ID_FIELDS
        .iter()
        .find_map(|field| document.get(*field))
        .and_then(|value| match value {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
        .ok_or_else(|| {
            GatewayError::InvalidInput(format!(
                "an event id is required under one of: {}",
                EVENT_ID_FIELDS.join(", ")
            ))
        })
}

/// Drop routing fields and forward the rest verbatim as a partial update.
/// An empty remainder is a legitimate empty update, not an error.
fn strip_routing_fields(document: Map<String, Value>) -> Value {
    let remainder: Map<String, Value> = document
        .into_iter()
        .filter(|(key, _)| !ROUTING_FIELDS.contains(&key.as_str()))
        .collect();
    Value::Object(remainder)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
