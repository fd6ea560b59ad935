//! Revenue metrics: pipeline forecast, period aggregation, growth trend.

use chrono::{DateTime, Datelike, Duration, Utc};
use salesdash_core::types::DealStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::round2;
use crate::normalize::DealRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueForecast {
    pub receita_confirmada: f64,
    pub receita_potencial: f64,
    pub receita_ponderada: f64,
    pub total_negocios_abertos: u64,
}

/// Confirmed (won), potential (ongoing) and stage-weighted revenue.
/// Weighting scales each open deal by stage_order / max_order; deals
/// without a stage order contribute nothing. When no open deal carries an
/// order at all, weighted falls back to half the potential.
pub fn calculate_revenue_forecast(rows: &[DealRow]) -> RevenueForecast {
    let ongoing: Vec<&DealRow> = rows
        .iter()
        .filter(|r| r.status == Some(DealStatus::Ongoing))
        .collect();

    let potential: f64 = ongoing.iter().map(|r| r.value).sum();
    let confirmed: f64 = rows
        .iter()
        .filter(|r| r.status == Some(DealStatus::Won))
        .map(|r| r.value)
        .sum();

    let max_order = ongoing.iter().filter_map(|r| r.stage_order).max();
    let weighted = match max_order {
        Some(max) if max > 0 => ongoing
            .iter()
            .filter_map(|r| r.stage_order.map(|o| r.value * o as f64 / max as f64))
            .sum(),
        _ => potential * 0.5,
    };

    RevenueForecast {
        receita_confirmada: round2(confirmed),
        receita_potencial: round2(potential),
        receita_ponderada: round2(weighted),
        total_negocios_abertos: ongoing.len() as u64,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodGranularity {
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRevenue {
    pub periodo: String,
    pub receita: f64,
    pub quantidade: u64,
}

fn period_label(date: DateTime<Utc>, granularity: PeriodGranularity) -> String {
    match granularity {
        PeriodGranularity::Day => date.format("%Y-%m-%d").to_string(),
        PeriodGranularity::Week => {
            let week = date.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        PeriodGranularity::Month => date.format("%Y-%m").to_string(),
    }
}

/// Won revenue grouped by closing date truncated to the given period,
/// chronologically sorted.
pub fn calculate_revenue_by_period(
    rows: &[DealRow],
    granularity: PeriodGranularity,
) -> Vec<PeriodRevenue> {
    let mut buckets: HashMap<String, (f64, u64)> = HashMap::new();
    for row in rows {
        if row.status != Some(DealStatus::Won) {
            continue;
        }
        let Some(closed) = row.closed_at else { continue };
        let entry = buckets
            .entry(period_label(closed, granularity))
            .or_insert((0.0, 0));
        entry.0 += row.value;
        entry.1 += 1;
    }

    let mut result: Vec<PeriodRevenue> = buckets
        .into_iter()
        .map(|(periodo, (receita, quantidade))| PeriodRevenue {
            periodo,
            receita: round2(receita),
            quantidade,
        })
        .collect();
    result.sort_by(|a, b| a.periodo.cmp(&b.periodo));
    result
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthTrend {
    pub receita_ultimos_30_dias: f64,
    pub receita_30_dias_anteriores: f64,
    pub crescimento_percentual: f64,
    pub negocios_ultimos_30: u64,
    pub negocios_30_anteriores: u64,
}

/// Won revenue in the trailing 30-day window against the 30 days before
/// it, relative to the injected reference time. Growth is 0 when the
/// prior window had no revenue.
pub fn calculate_growth_trend(rows: &[DealRow], now: DateTime<Utc>) -> GrowthTrend {
    let window_start = now - Duration::days(30);
    let prior_start = now - Duration::days(60);

    let mut recent = (0.0f64, 0u64);
    let mut prior = (0.0f64, 0u64);

    for row in rows {
        if row.status != Some(DealStatus::Won) {
            continue;
        }
        let Some(closed) = row.closed_at else { continue };
        if closed >= window_start && closed <= now {
            recent.0 += row.value;
            recent.1 += 1;
        } else if closed >= prior_start && closed < window_start {
            prior.0 += row.value;
            prior.1 += 1;
        }
    }

    let growth = if prior.0 > 0.0 {
        round2((recent.0 - prior.0) / prior.0 * 100.0)
    } else {
        0.0
    };

    GrowthTrend {
        receita_ultimos_30_dias: round2(recent.0),
        receita_30_dias_anteriores: round2(prior.0),
        crescimento_percentual: growth,
        negocios_ultimos_30: recent.1,
        negocios_30_anteriores: prior.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_deals;
    use salesdash_core::types::RawDeal;
    use serde_json::json;

    fn rows(v: serde_json::Value) -> Vec<DealRow> {
        let raws: Vec<RawDeal> = serde_json::from_value(v).unwrap();
        normalize_deals(&raws)
    }

    #[test]
    fn test_forecast_with_stage_weighting() {
        let rows = rows(json!([
            {"id": 1, "value": 1000.0, "dealStatus": {"id": 2}},
            {"id": 2, "value": 400.0, "dealStatus": {"id": 1},
             "dealStage": {"id": 1, "name": "Contato", "sequence": 1,
                           "funnel": {"id": 1, "name": "V"}}},
            {"id": 3, "value": 600.0, "dealStatus": {"id": 1},
             "dealStage": {"id": 2, "name": "Proposta", "sequence": 4,
                           "funnel": {"id": 1, "name": "V"}}}
        ]));

        let result = calculate_revenue_forecast(&rows);
        assert_eq!(result.receita_confirmada, 1000.0);
        assert_eq!(result.receita_potencial, 1000.0);
        // 400 * 1/4 + 600 * 4/4
        assert_eq!(result.receita_ponderada, 700.0);
        assert_eq!(result.total_negocios_abertos, 2);
    }

    #[test]
    fn test_forecast_falls_back_to_half_potential_without_orders() {
        let rows = rows(json!([
            {"id": 1, "value": 800.0, "dealStatus": {"id": 1}},
            {"id": 2, "value": 200.0, "dealStatus": {"id": 1}}
        ]));
        let result = calculate_revenue_forecast(&rows);
        assert_eq!(result.receita_ponderada, 500.0);
    }

    #[test]
    fn test_forecast_empty() {
        assert_eq!(calculate_revenue_forecast(&[]), RevenueForecast::default());
    }

    #[test]
    fn test_revenue_by_month_sorted() {
        let rows = rows(json!([
            {"id": 1, "value": 100.0, "dealStatus": {"id": 2}, "wonAt": "2025-03-10T00:00:00Z"},
            {"id": 2, "value": 200.0, "dealStatus": {"id": 2}, "wonAt": "2025-01-05T00:00:00Z"},
            {"id": 3, "value": 300.0, "dealStatus": {"id": 2}, "wonAt": "2025-01-20T00:00:00Z"},
            {"id": 4, "value": 999.0, "dealStatus": {"id": 3}, "lostAt": "2025-01-21T00:00:00Z"}
        ]));

        let result = calculate_revenue_by_period(&rows, PeriodGranularity::Month);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].periodo, "2025-01");
        assert_eq!(result[0].receita, 500.0);
        assert_eq!(result[0].quantidade, 2);
        assert_eq!(result[1].periodo, "2025-03");
    }

    #[test]
    fn test_week_labels_use_iso_weeks() {
        let rows = rows(json!([
            {"id": 1, "value": 50.0, "dealStatus": {"id": 2}, "wonAt": "2025-01-06T00:00:00Z"}
        ]));
        let result = calculate_revenue_by_period(&rows, PeriodGranularity::Week);
        assert_eq!(result[0].periodo, "2025-W02");
    }

    #[test]
    fn test_growth_trend_windows() {
        let now: DateTime<Utc> = "2025-06-30T00:00:00Z".parse().unwrap();
        let rows = rows(json!([
            {"id": 1, "value": 1100.0, "dealStatus": {"id": 2}, "wonAt": "2025-06-20T00:00:00Z"},
            {"id": 2, "value": 1000.0, "dealStatus": {"id": 2}, "wonAt": "2025-05-10T00:00:00Z"},
            {"id": 3, "value": 500.0, "dealStatus": {"id": 2}, "wonAt": "2025-01-01T00:00:00Z"}
        ]));

        let result = calculate_growth_trend(&rows, now);
        assert_eq!(result.receita_ultimos_30_dias, 1100.0);
        assert_eq!(result.receita_30_dias_anteriores, 1000.0);
        assert_eq!(result.crescimento_percentual, 10.0);
        assert_eq!(result.negocios_ultimos_30, 1);
        assert_eq!(result.negocios_30_anteriores, 1);
    }

    #[test]
    fn test_growth_zero_when_prior_window_empty() {
        let now: DateTime<Utc> = "2025-06-30T00:00:00Z".parse().unwrap();
        let rows = rows(json!([
            {"id": 1, "value": 1100.0, "dealStatus": {"id": 2}, "wonAt": "2025-06-20T00:00:00Z"}
        ]));
        assert_eq!(calculate_growth_trend(&rows, now).crescimento_percentual, 0.0);
    }
}
