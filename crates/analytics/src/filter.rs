//! Dataset filters applied before the calculators run: a date window
//! over each deal's reference date and seller selection.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::DealRow;

/// Date window over each deal's reference date. Relative variants are
/// resolved against an injected reference time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodFilter {
    All,
    LastMonth,
    LastThreeMonths,
    LastSixMonths,
    LastYear,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl PeriodFilter {
    fn bounds(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let days = match self {
            PeriodFilter::All => return None,
            PeriodFilter::LastMonth => 30,
            PeriodFilter::LastThreeMonths => 90,
            PeriodFilter::LastSixMonths => 180,
            PeriodFilter::LastYear => 365,
            PeriodFilter::Custom { start, end } => {
                let start = start.and_hms_opt(0, 0, 0)?.and_utc();
                let end = end.and_hms_opt(23, 59, 59)?.and_utc();
                return Some((start, end));
            }
        };
        Some((now - Duration::days(days), now))
    }
}

/// Keep rows whose reference date falls inside the window. The reference
/// date is the closing date when the deal has one, else the creation
/// date, so a won deal counts in the period it closed regardless of when
/// it was opened. With an active filter, rows with neither date are
/// excluded.
pub fn filter_by_period(rows: &[DealRow], filter: PeriodFilter, now: DateTime<Utc>) -> Vec<DealRow> {
    match filter.bounds(now) {
        None => rows.to_vec(),
        Some((start, end)) => rows
            .iter()
            .filter(|r| {
                r.closed_at
                    .or(r.created_at)
                    .map(|d| d >= start && d <= end)
                    .unwrap_or(false)
            })
            .cloned()
            .collect(),
    }
}

/// Keep rows owned by one of the named sellers. An empty selection means
/// no filtering.
pub fn filter_by_sellers(rows: &[DealRow], sellers: &[String]) -> Vec<DealRow> {
    if sellers.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|r| {
            r.owner_name
                .as_ref()
                .map(|n| sellers.iter().any(|s| s == n))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_deals;
    use salesdash_core::types::RawDeal;
    use serde_json::json;

    fn rows() -> Vec<DealRow> {
        let raws: Vec<RawDeal> = serde_json::from_value(json!([
            {"id": 1, "createdAt": "2025-06-01T00:00:00Z",
             "owner": {"id": 1, "name": "Ana"}},
            {"id": 2, "createdAt": "2025-01-01T00:00:00Z",
             "owner": {"id": 2, "name": "Bruno"}},
            {"id": 3, "owner": {"id": 1, "name": "Ana"}}
        ]))
        .unwrap();
        normalize_deals(&raws)
    }

    fn now() -> DateTime<Utc> {
        "2025-06-15T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_all_keeps_everything() {
        assert_eq!(filter_by_period(&rows(), PeriodFilter::All, now()).len(), 3);
    }

    #[test]
    fn test_last_month_window() {
        let kept = filter_by_period(&rows(), PeriodFilter::LastMonth, now());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[test]
    fn test_closing_date_wins_over_creation_date() {
        let raws: Vec<RawDeal> = serde_json::from_value(json!([
            // Opened in January, won in June: belongs to June's window.
            {"id": 1, "dealStatus": {"id": 2},
             "createdAt": "2025-01-10T00:00:00Z", "wonAt": "2025-06-20T00:00:00Z"},
            // Opened in June, lost back in February: falls outside it.
            {"id": 2, "dealStatus": {"id": 3},
             "createdAt": "2025-06-05T00:00:00Z", "lostAt": "2025-02-10T00:00:00Z"}
        ]))
        .unwrap();
        let kept = filter_by_period(
            &normalize_deals(&raws),
            PeriodFilter::LastMonth,
            "2025-06-30T00:00:00Z".parse().unwrap(),
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[test]
    fn test_custom_range() {
        let filter = PeriodFilter::Custom {
            start: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        };
        let kept = filter_by_period(&rows(), filter, now());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 2);
    }

    #[test]
    fn test_seller_filter() {
        let kept = filter_by_sellers(&rows(), &["Ana".to_string()]);
        assert_eq!(kept.len(), 2);
        assert!(filter_by_sellers(&rows(), &[]).len() == 3);
    }
}
