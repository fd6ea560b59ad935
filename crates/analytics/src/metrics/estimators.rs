//! Effort estimators: proposals per sale, proposals to hit a revenue
//! target, and a visit-count heuristic.

use salesdash_core::types::DealStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{round1, round2};
use crate::normalize::DealRow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalsPerSale {
    pub propostas_por_venda: f64,
    pub taxa_conversao: f64,
    pub total_propostas: u64,
    pub total_vendas: u64,
}

/// How many proposals one sale costs on average: the inverse of the
/// closed-deal conversion rate. 50% conversion means 2 proposals per sale.
pub fn calculate_proposals_per_sale(rows: &[DealRow]) -> ProposalsPerSale {
    let won = rows
        .iter()
        .filter(|r| r.status == Some(DealStatus::Won))
        .count() as u64;
    let closed = rows
        .iter()
        .filter(|r| matches!(r.status, Some(DealStatus::Won) | Some(DealStatus::Lost)))
        .count() as u64;

    if won == 0 || closed == 0 {
        return ProposalsPerSale::default();
    }

    let conversion = won as f64 / closed as f64;
    ProposalsPerSale {
        propostas_por_venda: round1(1.0 / conversion),
        taxa_conversao: round2(conversion * 100.0),
        total_propostas: closed,
        total_vendas: won,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalsForTarget {
    pub propostas_necessarias: f64,
    pub ticket_medio: f64,
    pub taxa_conversao: f64,
    pub receita_esperada_por_proposta: f64,
    pub meta_receita: f64,
}

/// Proposals needed to reach a revenue target, from the expected revenue
/// each proposal yields (mean won ticket × conversion rate).
pub fn calculate_proposals_for_target(rows: &[DealRow], target_revenue: f64) -> ProposalsForTarget {
    let won: Vec<&DealRow> = rows
        .iter()
        .filter(|r| r.status == Some(DealStatus::Won))
        .collect();
    let closed = rows
        .iter()
        .filter(|r| matches!(r.status, Some(DealStatus::Won) | Some(DealStatus::Lost)))
        .count();

    if won.is_empty() || closed == 0 {
        return ProposalsForTarget::default();
    }

    let avg_ticket = won.iter().map(|r| r.value).sum::<f64>() / won.len() as f64;
    let conversion = won.len() as f64 / closed as f64;
    let expected_per_proposal = avg_ticket * conversion;

    let proposals_needed = if expected_per_proposal > 0.0 {
        round1(target_revenue / expected_per_proposal)
    } else {
        0.0
    };

    ProposalsForTarget {
        propostas_necessarias: proposals_needed,
        ticket_medio: round2(avg_ticket),
        taxa_conversao: round2(conversion * 100.0),
        receita_esperada_por_proposta: round2(expected_per_proposal),
        meta_receita: target_revenue,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitsToClose {
    pub estimativa_visitas: i64,
    pub tempo_medio_dias: f64,
    pub recorrencia_media: f64,
}

/// Rough visit-count estimate: one visit every ~8 days over the mean
/// sales cycle, plus half a visit per repeat deal of the same customer.
/// An approximate proxy, not a measured quantity; floored at 1.
pub fn calculate_visits_to_close(rows: &[DealRow]) -> VisitsToClose {
    let won: Vec<&DealRow> = rows
        .iter()
        .filter(|r| r.status == Some(DealStatus::Won))
        .collect();

    let days: Vec<i64> = won
        .iter()
        .filter_map(|r| match (r.created_at, r.won_at) {
            (Some(created), Some(won_at)) => Some((won_at - created).num_days()),
            _ => None,
        })
        .collect();

    if days.is_empty() {
        return VisitsToClose::default();
    }

    let avg_days = days.iter().sum::<i64>() as f64 / days.len() as f64;

    let mut per_customer: HashMap<i64, u64> = HashMap::new();
    for deal in &won {
        if let Some(org_id) = deal.organization_id {
            *per_customer.entry(org_id).or_insert(0) += 1;
        }
    }
    let avg_deals_per_customer = if per_customer.is_empty() {
        1.0
    } else {
        per_customer.values().sum::<u64>() as f64 / per_customer.len() as f64
    };

    let estimate = (avg_days / 8.0 + avg_deals_per_customer * 0.5).round().max(1.0);

    VisitsToClose {
        estimativa_visitas: estimate as i64,
        tempo_medio_dias: round1(avg_days),
        recorrencia_media: round2(avg_deals_per_customer),
    }
}
