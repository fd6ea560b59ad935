//! Per-seller performance table.

use salesdash_core::types::DealStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::round2;
use crate::normalize::DealRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerPerformance {
    pub vendedor: String,
    pub total_negocios: u64,
    pub ganhos: u64,
    pub perdidos: u64,
    pub em_andamento: u64,
    pub taxa_vitoria: f64,
    pub valor_total: f64,
    pub ticket_medio: f64,
}

/// Deal counts, win rate and won-revenue totals per distinct owner,
/// sorted descending by total won value. Rows with no owner are skipped.
pub fn calculate_seller_performance(rows: &[DealRow]) -> Vec<SellerPerformance> {
    let mut by_owner: HashMap<i64, Vec<&DealRow>> = HashMap::new();
    for row in rows {
        if let Some(owner_id) = row.owner_id {
            by_owner.entry(owner_id).or_default().push(row);
        }
    }

    let mut result: Vec<SellerPerformance> = by_owner
        .into_values()
        .map(|deals| {
            let name = deals
                .iter()
                .find_map(|d| d.owner_name.clone())
                .unwrap_or_default();

            let won: Vec<&&DealRow> = deals
                .iter()
                .filter(|d| d.status == Some(DealStatus::Won))
                .collect();
            let lost = deals
                .iter()
                .filter(|d| d.status == Some(DealStatus::Lost))
                .count() as u64;
            let ongoing = deals
                .iter()
                .filter(|d| d.status == Some(DealStatus::Ongoing))
                .count() as u64;

            let won_count = won.len() as u64;
            let closed = won_count + lost;
            let win_rate = if closed > 0 {
                round2(won_count as f64 / closed as f64 * 100.0)
            } else {
                0.0
            };

            let total_value: f64 = won.iter().map(|d| d.value).sum();
            let avg_value = if won.is_empty() {
                0.0
            } else {
                total_value / won.len() as f64
            };

            SellerPerformance {
                vendedor: name,
                total_negocios: deals.len() as u64,
                ganhos: won_count,
                perdidos: lost,
                em_andamento: ongoing,
                taxa_vitoria: win_rate,
                valor_total: round2(total_value),
                ticket_medio: round2(avg_value),
            }
        })
        .collect();

    result.sort_by(|a, b| {
        b.valor_total
            .partial_cmp(&a.valor_total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.vendedor.cmp(&b.vendedor))
    });
    result
}
