use crate::client::JellyfinClient;
use crate::error::Result;
use crate::models::*;
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde_json::{Number, Value};
use std::time::Duration;

const CONTENT_FILTER: &str = "Movie,Episode";

/// Latency of `/System/Info`; the body itself is not used.
pub async fn system_info_latency(client: &JellyfinClient) -> Result<Duration> {
    let (elapsed, _) = client.get("/System/Info").await?;
    Ok(elapsed)
}

pub async fn item_counts(client: &JellyfinClient) -> Result<ItemCounts> {
    let (_, dto) = client.get_json::<ItemCountsDto>("/Items/Counts").await?;
    let counts = ItemCounts::from(dto);
    tracing::debug!(
        "Library: {} movies, {} shows, {} episodes, {} collections",
        counts.movies,
        counts.shows,
        counts.episodes,
        counts.collections
    );
    Ok(counts)
}

pub async fn sessions(client: &JellyfinClient) -> Result<Vec<Session>> {
    let (_, dtos) = client.get_json::<Vec<SessionDto>>("/Sessions").await?;
    let sessions: Vec<Session> = dtos.into_iter().map(Session::from).collect();
    for s in &sessions {
        tracing::debug!(
            "Session {} on {}: active={} method={} item={}",
            s.client.as_deref().unwrap_or("-"),
            s.device_name.as_deref().unwrap_or("-"),
            s.active,
            s.play_method
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            s.item_name.as_deref().unwrap_or("-")
        );
    }
    Ok(sessions)
}

pub async fn users(client: &JellyfinClient) -> Result<Vec<Value>> {
    let (_, users) = client.get_json::<Vec<Value>>("/Users").await?;
    Ok(users)
}

pub fn breakdown_path(breakdown: Breakdown, days: u32) -> String {
    format!(
        "/user_usage_stats/{}/BreakDownReport?days={}&filter={}",
        breakdown.group_by(),
        days,
        CONTENT_FILTER
    )
}

/// Play time per user, device or platform over the last `days` days.
/// `None` when the report is empty.
pub async fn duration_by(
    client: &JellyfinClient,
    breakdown: Breakdown,
    days: u32,
) -> Result<Option<Vec<UsageEntry>>> {
    let (_, report) = client
        .get_json::<Value>(&breakdown_path(breakdown, days))
        .await?;
    Ok(parse_breakdown(breakdown, report))
}

pub fn parse_breakdown(breakdown: Breakdown, report: Value) -> Option<Vec<UsageEntry>> {
    let items = match report {
        Value::Array(items) if !items.is_empty() => items,
        Value::Array(_) | Value::Null | Value::Bool(false) => return None,
        other => {
            tracing::warn!(
                "{} breakdown is not a list, ignoring: {}",
                breakdown.metric_key(),
                other
            );
            return None;
        }
    };

    let entries = items
        .into_iter()
        .filter_map(|item| {
            let dto: BreakdownEntryDto = match serde_json::from_value(item) {
                Ok(dto) => dto,
                Err(e) => {
                    tracing::warn!("Skipping malformed breakdown entry: {}", e);
                    return None;
                }
            };
            match (dto.label, dto.time) {
                (Some(label), Some(Value::Number(duration))) => Some(UsageEntry {
                    label: breakdown.normalize_label(&label),
                    duration,
                }),
                (label, time) => {
                    tracing::warn!(
                        "Skipping {} breakdown entry label={:?} time={:?}",
                        breakdown.metric_key(),
                        label,
                        time
                    );
                    None
                }
            }
        })
        .collect();

    Some(entries)
}

/// Key of the hourly report bucket: ISO weekday (Monday = 1) and zero-padded hour.
pub fn hourly_selector(weekday: u32, hour: u32) -> String {
    format!("{}-{:02}", weekday, hour)
}

/// Numeric bucket `selector` of an hourly report; anything else is `None`.
pub fn hourly_value(report: &Value, selector: &str) -> Option<Number> {
    match report.get(selector) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    }
}

/// Play time recorded for the current local weekday and hour, if any.
pub async fn hourly_play_time(
    client: &JellyfinClient,
    now: NaiveDateTime,
) -> Result<Option<Number>> {
    let path = format!(
        "/user_usage_stats/HourlyReport?days=1&filter={}",
        CONTENT_FILTER
    );
    let (_, report) = client.get_json::<Value>(&path).await?;

    let selector = hourly_selector(now.weekday().number_from_monday(), now.hour());
    let value = hourly_value(&report, &selector);
    tracing::debug!("Hourly play time for {}: {:?}", selector, value);
    Ok(value)
}
