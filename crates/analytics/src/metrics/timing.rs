//! Cycle-time metrics: days to close and dwell time per funnel stage.

use chrono::{DateTime, Utc};
use salesdash_core::types::DealStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::round1;
use crate::normalize::DealRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeToClose {
    pub tempo_medio_dias: f64,
    pub tempo_medio_ganhos: f64,
    pub tempo_medio_perdidos: f64,
    pub tempo_minimo: i64,
    pub tempo_maximo: i64,
}

/// Mean/min/max whole days between creation and closing, for won and
/// lost deals separately and combined. Rows missing either date are
/// excluded here but still count toward status totals elsewhere.
pub fn calculate_average_time_to_close(rows: &[DealRow]) -> TimeToClose {
    let closed: Vec<(&DealRow, i64)> = rows
        .iter()
        .filter(|r| matches!(r.status, Some(DealStatus::Won) | Some(DealStatus::Lost)))
        .filter_map(|r| match (r.created_at, r.closed_at) {
            (Some(created), Some(closed)) => Some((r, (closed - created).num_days())),
            _ => None,
        })
        .collect();

    if closed.is_empty() {
        return TimeToClose::default();
    }

    let mean = |days: &[i64]| -> f64 {
        if days.is_empty() {
            0.0
        } else {
            round1(days.iter().sum::<i64>() as f64 / days.len() as f64)
        }
    };

    let all: Vec<i64> = closed.iter().map(|(_, d)| *d).collect();
    let won: Vec<i64> = closed
        .iter()
        .filter(|(r, _)| r.status == Some(DealStatus::Won))
        .map(|(_, d)| *d)
        .collect();
    let lost: Vec<i64> = closed
        .iter()
        .filter(|(r, _)| r.status == Some(DealStatus::Lost))
        .map(|(_, d)| *d)
        .collect();

    TimeToClose {
        tempo_medio_dias: mean(&all),
        tempo_medio_ganhos: mean(&won),
        tempo_medio_perdidos: mean(&lost),
        tempo_minimo: all.iter().copied().min().unwrap_or(0),
        tempo_maximo: all.iter().copied().max().unwrap_or(0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDwell {
    pub funil: String,
    pub etapa: String,
    pub tempo_medio_dias: f64,
    pub tempo_mediano_dias: f64,
    pub tempo_max_dias: f64,
}

/// Days ongoing deals have sat in their current stage, using the last
/// update as a proxy for stage entry. `now` is injected so the metric is
/// deterministic under test.
pub fn calculate_time_in_stage(rows: &[DealRow], now: DateTime<Utc>) -> Vec<StageDwell> {
    let mut groups: HashMap<(String, String), Vec<i64>> = HashMap::new();

    for row in rows {
        if row.status != Some(DealStatus::Ongoing) {
            continue;
        }
        let (Some(funnel), Some(stage), Some(updated)) =
            (&row.funnel_name, &row.stage_name, row.updated_at)
        else {
            continue;
        };
        groups
            .entry((funnel.clone(), stage.clone()))
            .or_default()
            .push((now - updated).num_days());
    }

    let mut result: Vec<StageDwell> = groups
        .into_iter()
        .map(|((funil, etapa), mut days)| {
            days.sort_unstable();
            let mean = days.iter().sum::<i64>() as f64 / days.len() as f64;
            let median = if days.len() % 2 == 1 {
                days[days.len() / 2] as f64
            } else {
                (days[days.len() / 2 - 1] + days[days.len() / 2]) as f64 / 2.0
            };
            StageDwell {
                funil,
                etapa,
                tempo_medio_dias: round1(mean),
                tempo_mediano_dias: round1(median),
                tempo_max_dias: days.last().copied().unwrap_or(0) as f64,
            }
        })
        .collect();

    result.sort_by(|a, b| (&a.funil, &a.etapa).cmp(&(&b.funil, &b.etapa)));
    result
}
