// ABOUTME: Read-only aggregation pipelines composing multiple upstream calls
// ABOUTME: Fan-out joins are all-or-nothing; sequential flows cap their call count
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2026 Tempo Gateway Contributors

//! # Aggregation Pipelines
//!
//! Four compositions over the upstream API. The fan-out pipelines issue
//! their sub-calls concurrently and join at a single point; a failed
//! sub-call fails the whole pipeline and may cancel its in-flight siblings.
//! A partial aggregate is never returned. The sequential pipelines bound
//! their worst-case call count so a large result set cannot blow the
//! per-request latency budget.

use crate::errors::{GatewayError, GatewayResult};
use crate::upstream::IntervalsProvider;
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Maximum detail calls one `activities_with_details` invocation may issue
pub const MAX_DETAIL_CALLS: usize = 20;

/// Event field naming the completed activity paired with a planned event
const LINKED_ACTIVITY_FIELD: &str = "activity_id";

/// Wellness, completed activities, and planned events for one date range,
/// returned side by side for the caller to correlate by date.
pub async fn training_overview(
    api: &IntervalsProvider,
    oldest: &str,
    newest: &str,
    activity_type: Option<&str>,
) -> GatewayResult<Value> {
    let (wellness, activities, events) = tokio::try_join!(
        api.wellness_range(oldest, newest),
        api.activities_range(oldest, newest, activity_type, None),
        api.events_range(oldest, newest, None),
    )?;

    Ok(json!({
        "oldest": oldest,
        "newest": newest,
        "wellness": wellness,
        "completed_activities": activities,
        "planned_events": events,
    }))
}

/// Upcoming events, the workout library, and recent wellness around a pivot
/// date. `span_days` looks forward from the pivot, `wellness_days_back`
/// looks backward.
pub async fn planning_context(
    api: &IntervalsProvider,
    from_date: &str,
    span_days: u32,
    wellness_days_back: u32,
) -> GatewayResult<Value> {
    let pivot = parse_date(from_date)?;
    let horizon = format_date(pivot + Duration::days(i64::from(span_days)));
    let lookback = format_date(pivot - Duration::days(i64::from(wellness_days_back)));

    let (events, workouts, wellness) = tokio::try_join!(
        api.events_range(from_date, &horizon, None),
        api.workouts(),
        api.wellness_range(&lookback, from_date),
    )?;

    Ok(json!({
        "from_date": from_date,
        "upcoming_events": events,
        "workout_library": workouts,
        "recent_wellness": wellness,
    }))
}

/// Activity summaries for a range, each expanded with its interval detail.
///
/// Detail calls are strictly sequential and capped at [`MAX_DETAIL_CALLS`];
/// summaries past the cap are dropped and the result is marked truncated.
pub async fn activities_with_details(
    api: &IntervalsProvider,
    oldest: &str,
    newest: &str,
    activity_type: Option<&str>,
) -> GatewayResult<Value> {
    let summaries = api
        .activities_range(oldest, newest, activity_type, None)
        .await?;
    let summaries = summaries.as_array().cloned().unwrap_or_default();

    let total = summaries.len();
    if total > MAX_DETAIL_CALLS {
        warn!(
            "activities_with_details: {total} summaries in range, expanding the first {MAX_DETAIL_CALLS}"
        );
    }

    let mut detailed = Vec::with_capacity(total.min(MAX_DETAIL_CALLS));
    for summary in summaries.iter().take(MAX_DETAIL_CALLS) {
        let Some(id) = scalar_id(summary.get("id")) else {
            debug!("skipping activity summary without an id");
            continue;
        };
        detailed.push(api.activity(&id, true).await?);
    }

    Ok(json!({
        "oldest": oldest,
        "newest": newest,
        "activities": detailed,
        "detail_count": detailed.len(),
        "total_in_range": total,
        "truncated": total > MAX_DETAIL_CALLS,
    }))
}

/// One event, merged with the full detail of its completed activity when the
/// event links one. An unlinked event is a normal answer, not an error, and
/// costs no extra upstream call.
pub async fn event_completed_activity(
    api: &IntervalsProvider,
    event_id: &str,
) -> GatewayResult<Value> {
    let event = api.event(event_id).await?;

    let Some(activity_id) = scalar_id(event.get(LINKED_ACTIVITY_FIELD)) else {
        return Ok(json!({
            "event": event,
            "has_completed_activity": false,
            "completed_activity": Value::Null,
        }));
    };

    let activity = api.activity(&activity_id, true).await?;
    Ok(json!({
        "event": event,
        "has_completed_activity": true,
        "completed_activity": activity,
    }))
}

/// Render a JSON id field (number or non-empty string) as a path segment
fn scalar_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_date(raw: &str) -> GatewayResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| GatewayError::InvalidInput(format!("'{raw}' is not a yyyy-MM-dd date")))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
