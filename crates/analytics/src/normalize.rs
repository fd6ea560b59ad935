//! Record normalizer — flattens nested CRM deal objects into typed rows.
//!
//! Normalization is total: any field that cannot be derived resolves to
//! `None`, and downstream calculators exclude affected rows instead of
//! erroring. A malformed record never aborts a load cycle.

use chrono::{DateTime, Utc};
use salesdash_core::types::{DealStatus, RawDeal};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One flattened deal. The in-memory table all calculators consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRow {
    pub id: i64,
    pub title: Option<String>,
    /// Missing monetary values coerce to zero.
    pub value: f64,
    pub status: Option<DealStatus>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub won_at: Option<DateTime<Utc>>,
    pub lost_at: Option<DateTime<Utc>>,
    /// Canonical closing date: won date if present, else lost date.
    pub closed_at: Option<DateTime<Utc>>,
    pub owner_id: Option<i64>,
    pub owner_name: Option<String>,
    pub stage_id: Option<i64>,
    pub stage_name: Option<String>,
    pub stage_order: Option<i64>,
    pub funnel_id: Option<i64>,
    pub funnel_name: Option<String>,
    pub organization_id: Option<i64>,
    pub organization_name: Option<String>,
}

fn nested_i64(v: &Value, key: &str) -> Option<i64> {
    v.as_object()?.get(key)?.as_i64()
}

fn nested_str(v: &Value, key: &str) -> Option<String> {
    v.as_object()?.get(key)?.as_str().map(str::to_string)
}

fn parse_ts(raw: &Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Flatten one raw deal. Never fails.
pub fn normalize_deal(raw: &RawDeal) -> DealRow {
    let status = nested_i64(&raw.deal_status, "id").and_then(DealStatus::from_status_id);

    let won_at = parse_ts(&raw.won_at);
    let lost_at = parse_ts(&raw.lost_at);

    // Stage carries its funnel one level deeper.
    let funnel = raw
        .deal_stage
        .as_object()
        .and_then(|s| s.get("funnel"))
        .cloned()
        .unwrap_or(Value::Null);

    DealRow {
        id: raw.id,
        title: raw.title.clone(),
        value: raw.value.unwrap_or(0.0),
        status,
        created_at: parse_ts(&raw.created_at),
        updated_at: parse_ts(&raw.updated_at),
        won_at,
        lost_at,
        closed_at: won_at.or(lost_at),
        owner_id: nested_i64(&raw.owner, "id"),
        owner_name: nested_str(&raw.owner, "name"),
        stage_id: nested_i64(&raw.deal_stage, "id"),
        stage_name: nested_str(&raw.deal_stage, "name"),
        stage_order: nested_i64(&raw.deal_stage, "sequence"),
        funnel_id: nested_i64(&funnel, "id"),
        funnel_name: nested_str(&funnel, "name"),
        organization_id: nested_i64(&raw.organization, "id"),
        organization_name: nested_str(&raw.organization, "name"),
    }
}

/// Flatten a full load of raw deals into the analysis table.
pub fn normalize_deals(raws: &[RawDeal]) -> Vec<DealRow> {
    raws.iter().map(normalize_deal).collect()
}
