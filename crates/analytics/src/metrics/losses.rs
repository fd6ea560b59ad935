//! Lost-deal summary.

use salesdash_core::types::DealStatus;
use serde::{Deserialize, Serialize};

use super::round2;
use crate::normalize::DealRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostDealSummary {
    pub total_perdidos: u64,
    pub valor_perdido: f64,
    pub ticket_medio_perdido: f64,
    pub etapa_mais_comum_perda: String,
}

impl Default for LostDealSummary {
    fn default() -> Self {
        Self {
            total_perdidos: 0,
            valor_perdido: 0.0,
            ticket_medio_perdido: 0.0,
            etapa_mais_comum_perda: "N/A".to_string(),
        }
    }
}

/// Count, value and modal losing stage over lost deals. On a tied mode
/// the stage seen first in the input wins.
pub fn analyze_lost_deals(rows: &[DealRow]) -> LostDealSummary {
    let lost: Vec<&DealRow> = rows
        .iter()
        .filter(|r| r.status == Some(DealStatus::Lost))
        .collect();

    if lost.is_empty() {
        return LostDealSummary::default();
    }

    let total_value: f64 = lost.iter().map(|r| r.value).sum();

    // Insertion-ordered frequency count so ties break on first occurrence.
    let mut stage_counts: Vec<(&str, u64)> = Vec::new();
    for row in &lost {
        let Some(stage) = row.stage_name.as_deref() else {
            continue;
        };
        match stage_counts.iter_mut().find(|(s, _)| *s == stage) {
            Some((_, n)) => *n += 1,
            None => stage_counts.push((stage, 1)),
        }
    }
    // max_by_key would keep the last maximal entry; scan manually so a
    // tie keeps the stage seen first.
    let mut most_common = ("N/A", 0u64);
    for (stage, n) in &stage_counts {
        if *n > most_common.1 {
            most_common = (stage, *n);
        }
    }
    let most_common = most_common.0.to_string();

    LostDealSummary {
        total_perdidos: lost.len() as u64,
        valor_perdido: round2(total_value),
        ticket_medio_perdido: round2(total_value / lost.len() as f64),
        etapa_mais_comum_perda: most_common,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_deals;
    use salesdash_core::types::RawDeal;
    use serde_json::json;

    fn lost(id: i64, value: f64, stage: &str) -> serde_json::Value {
        json!({"id": id, "value": value, "dealStatus": {"id": 3},
               "dealStage": {"id": 1, "name": stage,
                             "funnel": {"id": 1, "name": "V"}}})
    }

    #[test]
    fn test_summary_and_modal_stage() {
        let raws: Vec<RawDeal> = serde_json::from_value(json!([
            lost(1, 100.0, "Proposta"),
            lost(2, 200.0, "Proposta"),
            lost(3, 300.0, "Contato"),
            {"id": 4, "value": 999.0, "dealStatus": {"id": 2}}
        ]))
        .unwrap();

        let result = analyze_lost_deals(&normalize_deals(&raws));
        assert_eq!(result.total_perdidos, 3);
        assert_eq!(result.valor_perdido, 600.0);
        assert_eq!(result.ticket_medio_perdido, 200.0);
        assert_eq!(result.etapa_mais_comum_perda, "Proposta");
    }

    #[test]
    fn test_tie_breaks_on_first_seen() {
        let raws: Vec<RawDeal> = serde_json::from_value(json!([
            lost(1, 1.0, "Negociação"),
            lost(2, 1.0, "Contato"),
            lost(3, 1.0, "Contato"),
            lost(4, 1.0, "Negociação")
        ]))
        .unwrap();
        let result = analyze_lost_deals(&normalize_deals(&raws));
        assert_eq!(result.etapa_mais_comum_perda, "Negociação");
    }

    #[test]
    fn test_no_losses_is_zero_shape() {
        assert_eq!(analyze_lost_deals(&[]), LostDealSummary::default());
    }
}
