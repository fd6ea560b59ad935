//! Goal tracking: progress against monthly targets and a linear
//! month-end projection.

use std::collections::HashSet;

use chrono::Datelike;
use salesdash_analytics::DealRow;
use salesdash_core::types::{DealStatus, MonthlyGoal};
use serde::{Deserialize, Serialize};

/// Progress toward a target, in percent. Zero for non-positive targets.
pub fn calcular_progresso(valor_atual: f64, meta: f64) -> f64 {
    if meta <= 0.0 {
        return 0.0;
    }
    valor_atual / meta * 100.0
}

/// Naive linear extrapolation of the month-end value from the pace so
/// far. With a non-positive current day there is no pace to extrapolate,
/// so the accumulated value is returned unchanged.
pub fn calcular_projecao_mes(valor_atual: f64, dia_atual: u32, dias_no_mes: u32) -> f64 {
    if dia_atual == 0 {
        return valor_atual;
    }
    valor_atual / dia_atual as f64 * dias_no_mes as f64
}

/// Actual-to-date values for one month, derived from the deal table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthActuals {
    pub receita: f64,
    pub vendas: i64,
    pub propostas: i64,
    pub novos_clientes: i64,
}

impl MonthActuals {
    /// Derive the month's actuals: revenue and sales from deals won in
    /// the month, proposals from deals created in the month, and new
    /// customers from organizations whose first deal was created in it.
    pub fn from_rows(rows: &[DealRow], month: &str) -> Self {
        let in_month = |d: chrono::DateTime<chrono::Utc>| -> bool {
            format!("{:04}-{:02}", d.year(), d.month()) == month
        };

        let mut receita = 0.0;
        let mut vendas = 0;
        let mut propostas = 0;

        for row in rows {
            if row.status == Some(DealStatus::Won) && row.closed_at.map(in_month).unwrap_or(false) {
                receita += row.value;
                vendas += 1;
            }
            if row.created_at.map(in_month).unwrap_or(false) {
                propostas += 1;
            }
        }

        // First-seen month per organization, over the whole table.
        let mut seen: HashSet<i64> = HashSet::new();
        let mut novos_clientes = 0;
        let mut by_creation: Vec<&DealRow> = rows
            .iter()
            .filter(|r| r.organization_id.is_some() && r.created_at.is_some())
            .collect();
        by_creation.sort_by_key(|r| r.created_at);
        for row in by_creation {
            let Some(org) = row.organization_id else { continue };
            if seen.insert(org) && row.created_at.map(in_month).unwrap_or(false) {
                novos_clientes += 1;
            }
        }

        Self {
            receita,
            vendas,
            propostas,
            novos_clientes,
        }
    }
}

/// One goal line: target, actual, progress and month-end projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalLine {
    pub meta: f64,
    pub atual: f64,
    pub progresso: f64,
    pub projecao: f64,
}

fn line(atual: f64, meta: f64, dia_atual: u32, dias_no_mes: u32) -> GoalLine {
    GoalLine {
        meta,
        atual,
        progresso: calcular_progresso(atual, meta),
        projecao: calcular_projecao_mes(atual, dia_atual, dias_no_mes),
    }
}

/// Goal progress for one month across the four tracked targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub mes: String,
    pub receita: GoalLine,
    pub vendas: GoalLine,
    pub propostas: GoalLine,
    pub novos_clientes: GoalLine,
}

impl GoalProgress {
    pub fn compute(
        month: &str,
        goal: &MonthlyGoal,
        actuals: &MonthActuals,
        dia_atual: u32,
        dias_no_mes: u32,
    ) -> Self {
        Self {
            mes: month.to_string(),
            receita: line(actuals.receita, goal.receita, dia_atual, dias_no_mes),
            vendas: line(
                actuals.vendas as f64,
                goal.vendas as f64,
                dia_atual,
                dias_no_mes,
            ),
            propostas: line(
                actuals.propostas as f64,
                goal.propostas as f64,
                dia_atual,
                dias_no_mes,
            ),
            novos_clientes: line(
                actuals.novos_clientes as f64,
                goal.novos_clientes as f64,
                dia_atual,
                dias_no_mes,
            ),
        }
    }
}
