//! Top customers and top industry segments by won revenue.

use salesdash_core::types::DealStatus;
use salesdash_segmentation::classify;
use serde::{Deserialize, Serialize};

use super::round2;
use crate::normalize::DealRow;

const NO_ORGANIZATION: &str = "Sem Organização";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRevenue {
    pub cliente: String,
    pub receita_total: f64,
    pub qtd_negocios: u64,
    pub percentual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRevenue {
    pub segmento: String,
    pub receita_total: f64,
    pub qtd_negocios: u64,
    pub percentual: f64,
}

// Insertion-ordered grouping keeps output deterministic for equal values.
fn group_won_revenue<F>(rows: &[DealRow], key: F) -> Vec<(String, f64, u64)>
where
    F: Fn(&DealRow) -> String,
{
    let mut groups: Vec<(String, f64, u64)> = Vec::new();
    for row in rows {
        if row.status != Some(DealStatus::Won) {
            continue;
        }
        let k = key(row);
        match groups.iter_mut().find(|(g, _, _)| *g == k) {
            Some((_, value, count)) => {
                *value += row.value;
                *count += 1;
            }
            None => groups.push((k, row.value, 1)),
        }
    }
    groups
}

fn top_n(mut groups: Vec<(String, f64, u64)>, limit: usize) -> Vec<(String, f64, u64, f64)> {
    let total: f64 = groups.iter().map(|(_, v, _)| v).sum();
    groups.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    groups
        .into_iter()
        .take(limit)
        .map(|(name, value, count)| {
            let pct = if total > 0.0 {
                round2(value / total * 100.0)
            } else {
                0.0
            };
            (name, round2(value), count, pct)
        })
        .collect()
}

/// Top N customers by won revenue, with each one's share of the total.
/// Deals without an organization group under a single placeholder.
pub fn calculate_top_customers(rows: &[DealRow], limit: usize) -> Vec<CustomerRevenue> {
    let groups = group_won_revenue(rows, |r| {
        r.organization_name
            .clone()
            .unwrap_or_else(|| NO_ORGANIZATION.to_string())
    });
    top_n(groups, limit)
        .into_iter()
        .map(|(cliente, receita_total, qtd_negocios, percentual)| CustomerRevenue {
            cliente,
            receita_total,
            qtd_negocios,
            percentual,
        })
        .collect()
}

/// Top N industry segments by won revenue. Segments come from keyword
/// classification of the customer name; unmatched names fall in "Outros".
pub fn calculate_top_segments(rows: &[DealRow], limit: usize) -> Vec<SegmentRevenue> {
    let groups = group_won_revenue(rows, |r| {
        classify(r.organization_name.as_deref().unwrap_or(""))
            .label()
            .to_string()
    });
    top_n(groups, limit)
        .into_iter()
        .map(|(segmento, receita_total, qtd_negocios, percentual)| SegmentRevenue {
            segmento,
            receita_total,
            qtd_negocios,
            percentual,
        })
        .collect()
}
