//! Per-stage conversion rates relative to each funnel's first stage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::round2;
use crate::normalize::DealRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConversion {
    pub funil: String,
    pub etapa: String,
    pub ordem: i64,
    pub quantidade: u64,
    pub taxa_conversao: f64,
}

/// Deal counts per (funnel, stage), sorted by stage order, with each
/// stage's count expressed as a percentage of the funnel's first stage.
/// Rows missing funnel, stage or order are left out.
pub fn calculate_conversion_rates(rows: &[DealRow]) -> Vec<StageConversion> {
    let mut counts: HashMap<(String, String, i64), u64> = HashMap::new();
    for row in rows {
        let (Some(funnel), Some(stage), Some(order)) =
            (&row.funnel_name, &row.stage_name, row.stage_order)
        else {
            continue;
        };
        *counts
            .entry((funnel.clone(), stage.clone(), order))
            .or_insert(0) += 1;
    }

    let mut stages: Vec<(String, String, i64, u64)> = counts
        .into_iter()
        .map(|((funnel, stage, order), count)| (funnel, stage, order, count))
        .collect();
    stages.sort_by(|a, b| (&a.0, a.2).cmp(&(&b.0, b.2)));

    let mut result = Vec::with_capacity(stages.len());
    let mut current_funnel: Option<&str> = None;
    let mut first_count = 0u64;

    for (funnel, stage, order, count) in &stages {
        if current_funnel != Some(funnel.as_str()) {
            current_funnel = Some(funnel.as_str());
            first_count = *count;
        }
        let rate = if first_count > 0 {
            round2(*count as f64 / first_count as f64 * 100.0)
        } else {
            0.0
        };
        result.push(StageConversion {
            funil: funnel.clone(),
            etapa: stage.clone(),
            ordem: *order,
            quantidade: *count,
            taxa_conversao: rate,
        });
    }

    result
}
