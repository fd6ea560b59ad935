//! Report assembly: one snapshot bundling every calculator's output for a
//! single load cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::*;
use crate::normalize::DealRow;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReportOptions {
    pub top_limit: usize,
    pub target_revenue: f64,
    pub period: PeriodGranularity,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_limit: 5,
            target_revenue: 100_000.0,
            period: PeriodGranularity::Month,
        }
    }
}

/// All derived metrics for one dataset. Calculators are independent, so
/// assembly order is irrelevant; they run sequentially because the data
/// volume is small and the upstream fetch dominates latency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReport {
    pub computed_at: DateTime<Utc>,
    pub total_deals: u64,
    pub conversion_rates: Vec<StageConversion>,
    pub win_loss: WinLossRate,
    pub time_to_close: TimeToClose,
    pub time_in_stage: Vec<StageDwell>,
    pub sellers: Vec<SellerPerformance>,
    pub forecast: RevenueForecast,
    pub revenue_by_period: Vec<PeriodRevenue>,
    pub lost_deals: LostDealSummary,
    pub growth: GrowthTrend,
    pub top_customers: Vec<CustomerRevenue>,
    pub top_segments: Vec<SegmentRevenue>,
    pub proposals_per_sale: ProposalsPerSale,
    pub proposals_for_target: ProposalsForTarget,
    pub visits_to_close: VisitsToClose,
}

impl SalesReport {
    /// Run every calculator over the normalized table. `now` anchors the
    /// time-windowed metrics.
    pub fn compute(rows: &[DealRow], now: DateTime<Utc>, opts: &ReportOptions) -> Self {
        debug!(rows = rows.len(), "computing sales report");
        Self {
            computed_at: now,
            total_deals: rows.len() as u64,
            conversion_rates: calculate_conversion_rates(rows),
            win_loss: calculate_win_loss_rate(rows),
            time_to_close: calculate_average_time_to_close(rows),
            time_in_stage: calculate_time_in_stage(rows, now),
            sellers: calculate_seller_performance(rows),
            forecast: calculate_revenue_forecast(rows),
            revenue_by_period: calculate_revenue_by_period(rows, opts.period),
            lost_deals: analyze_lost_deals(rows),
            growth: calculate_growth_trend(rows, now),
            top_customers: calculate_top_customers(rows, opts.top_limit),
            top_segments: calculate_top_segments(rows, opts.top_limit),
            proposals_per_sale: calculate_proposals_per_sale(rows),
            proposals_for_target: calculate_proposals_for_target(rows, opts.target_revenue),
            visits_to_close: calculate_visits_to_close(rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_deals;
    use salesdash_core::types::RawDeal;
    use serde_json::json;

    #[test]
    fn test_empty_dataset_yields_zero_shapes_everywhere() {
        let now: DateTime<Utc> = "2025-06-30T00:00:00Z".parse().unwrap();
        let report = SalesReport::compute(&[], now, &ReportOptions::default());

        assert_eq!(report.total_deals, 0);
        assert!(report.conversion_rates.is_empty());
        assert_eq!(report.win_loss, WinLossRate::default());
        assert_eq!(report.time_to_close, TimeToClose::default());
        assert!(report.time_in_stage.is_empty());
        assert!(report.sellers.is_empty());
        assert_eq!(report.forecast, RevenueForecast::default());
        assert!(report.revenue_by_period.is_empty());
        assert_eq!(report.lost_deals, LostDealSummary::default());
        assert_eq!(report.growth, GrowthTrend::default());
        assert!(report.top_customers.is_empty());
        assert!(report.top_segments.is_empty());
        assert_eq!(report.proposals_per_sale, ProposalsPerSale::default());
        assert_eq!(report.proposals_for_target, ProposalsForTarget::default());
        assert_eq!(report.visits_to_close, VisitsToClose::default());
    }

    #[test]
    fn test_report_over_realistic_snapshot() {
        let now: DateTime<Utc> = "2025-06-30T00:00:00Z".parse().unwrap();
        let raws: Vec<RawDeal> = serde_json::from_value(json!([
            {"id": 1, "value": 12_000.0, "dealStatus": {"id": 2},
             "owner": {"id": 1, "name": "Ana"},
             "organization": {"id": 1, "name": "Mineração Norte"},
             "createdAt": "2025-06-01T00:00:00Z", "wonAt": "2025-06-15T00:00:00Z",
             "dealStage": {"id": 3, "name": "Fechamento", "sequence": 3,
                           "funnel": {"id": 1, "name": "Vendas"}}},
            {"id": 2, "value": 8_000.0, "dealStatus": {"id": 3},
             "owner": {"id": 1, "name": "Ana"},
             "createdAt": "2025-05-01T00:00:00Z", "lostAt": "2025-05-20T00:00:00Z",
             "dealStage": {"id": 2, "name": "Proposta", "sequence": 2,
                           "funnel": {"id": 1, "name": "Vendas"}}},
            {"id": 3, "value": 20_000.0, "dealStatus": {"id": 1},
             "owner": {"id": 2, "name": "Bruno"},
             "updatedAt": "2025-06-25T00:00:00Z",
             "dealStage": {"id": 1, "name": "Contato", "sequence": 1,
                           "funnel": {"id": 1, "name": "Vendas"}}}
        ]))
        .unwrap();

        let rows = normalize_deals(&raws);
        let report = SalesReport::compute(&rows, now, &ReportOptions::default());

        assert_eq!(report.total_deals, 3);
        assert_eq!(report.win_loss.taxa_vitoria, 50.0);
        assert_eq!(report.forecast.receita_confirmada, 12_000.0);
        assert_eq!(report.forecast.receita_potencial, 20_000.0);
        assert_eq!(report.sellers.len(), 2);
        assert_eq!(report.top_segments[0].segmento, "Mineração");
        assert_eq!(report.revenue_by_period[0].periodo, "2025-06");
        assert_eq!(report.growth.receita_ultimos_30_dias, 12_000.0);
    }
}
