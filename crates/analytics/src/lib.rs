//! Analytics engine: turns raw CRM deal records into the metrics,
//! forecasts and report snapshot the dashboard serves.
//!
//! The pipeline is one-way: raw records are normalized once into typed
//! rows, every calculator is a pure function over those rows, and the
//! report bundles the calculator outputs. Reference time is always an
//! explicit parameter so time-windowed metrics stay deterministic.

pub mod filter;
pub mod metrics;
pub mod normalize;
pub mod report;

pub use filter::{filter_by_period, filter_by_sellers, PeriodFilter};
pub use normalize::{normalize_deals, DealRow};
pub use report::{ReportOptions, SalesReport};
