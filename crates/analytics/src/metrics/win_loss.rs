//! Win/loss rate over closed deals.

use salesdash_core::types::DealStatus;
use serde::{Deserialize, Serialize};

use super::round2;
use crate::normalize::DealRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinLossRate {
    pub taxa_vitoria: f64,
    pub taxa_perda: f64,
    pub total_fechados: u64,
    pub ganhos: u64,
    pub perdidos: u64,
}

/// Won and lost shares of closed deals, in percent. Zero-shape when no
/// deal has closed.
pub fn calculate_win_loss_rate(rows: &[DealRow]) -> WinLossRate {
    let won = rows
        .iter()
        .filter(|r| r.status == Some(DealStatus::Won))
        .count() as u64;
    let lost = rows
        .iter()
        .filter(|r| r.status == Some(DealStatus::Lost))
        .count() as u64;
    let total_closed = won + lost;

    if total_closed == 0 {
        return WinLossRate::default();
    }

    WinLossRate {
        taxa_vitoria: round2(won as f64 / total_closed as f64 * 100.0),
        taxa_perda: round2(lost as f64 / total_closed as f64 * 100.0),
        total_fechados: total_closed,
        ganhos: won,
        perdidos: lost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_deals;
    use salesdash_core::types::RawDeal;
    use serde_json::json;

    fn rows(statuses: &[i64]) -> Vec<DealRow> {
        let raws: Vec<RawDeal> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| {
                serde_json::from_value(json!({"id": i as i64, "dealStatus": {"id": s}})).unwrap()
            })
            .collect();
        normalize_deals(&raws)
    }

    #[test]
    fn test_fifty_fifty() {
        let result = calculate_win_loss_rate(&rows(&[2, 3]));
        assert_eq!(result.taxa_vitoria, 50.0);
        assert_eq!(result.taxa_perda, 50.0);
        assert_eq!(result.ganhos, 1);
        assert_eq!(result.perdidos, 1);
        assert_eq!(result.total_fechados, 2);
    }

    #[test]
    fn test_rates_sum_to_one_hundred() {
        let result = calculate_win_loss_rate(&rows(&[2, 2, 2, 3, 3, 3, 3, 1]));
        assert!((result.taxa_vitoria + result.taxa_perda - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        // 1 won, 2 lost: 33.33 / 66.67
        let result = calculate_win_loss_rate(&rows(&[2, 3, 3]));
        assert_eq!(result.taxa_vitoria, 33.33);
        assert_eq!(result.taxa_perda, 66.67);
    }

    #[test]
    fn test_no_closed_deals_is_zero_shape() {
        assert_eq!(calculate_win_loss_rate(&rows(&[1, 1])), WinLossRate::default());
        assert_eq!(calculate_win_loss_rate(&[]), WinLossRate::default());
    }

    #[test]
    fn test_null_status_ignored() {
        let result = calculate_win_loss_rate(&rows(&[2, 99]));
        assert_eq!(result.total_fechados, 1);
        assert_eq!(result.taxa_vitoria, 100.0);
    }
}
