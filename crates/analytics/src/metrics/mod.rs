//! Metric calculators. Each is an independent pure function over the
//! normalized deal table, returning a fixed-shape serde struct with the
//! output keys the presentation and export layers consume verbatim.
//!
//! Uniform edge-case policy: empty or degenerate input yields the
//! calculator's documented zero-shape; any division by zero yields 0.0.

pub mod conversion;
pub mod customers;
pub mod estimators;
pub mod losses;
pub mod revenue;
pub mod sellers;
pub mod timing;
pub mod win_loss;

pub use conversion::{calculate_conversion_rates, StageConversion};
pub use customers::{
    calculate_top_customers, calculate_top_segments, CustomerRevenue, SegmentRevenue,
};
pub use estimators::{
    calculate_proposals_for_target, calculate_proposals_per_sale, calculate_visits_to_close,
    ProposalsForTarget, ProposalsPerSale, VisitsToClose,
};
pub use losses::{analyze_lost_deals, LostDealSummary};
pub use revenue::{
    calculate_growth_trend, calculate_revenue_by_period, calculate_revenue_forecast, GrowthTrend,
    PeriodGranularity, PeriodRevenue, RevenueForecast,
};
pub use sellers::{calculate_seller_performance, SellerPerformance};
pub use timing::{calculate_average_time_to_close, calculate_time_in_stage, StageDwell, TimeToClose};
pub use win_loss::{calculate_win_loss_rate, WinLossRate};

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
