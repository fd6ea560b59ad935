//! Rule evaluation. Each rule reads one or two metric results and may
//! emit a single insight; thresholds are fixed constants and the rules
//! are independent, so the output order is stable. A rule whose
//! condition does not hold emits nothing.

use salesdash_analytics::SalesReport;
use salesdash_core::types::{Insight, InsightKind, Severity};
use tracing::debug;

const LOW_WIN_RATE_PCT: f64 = 30.0;
const HIGH_LOSS_SHARE_PCT: f64 = 60.0;
const LONG_CYCLE_DAYS: f64 = 90.0;
const GROWTH_HIGHLIGHT_PCT: f64 = 10.0;
const STRONG_WIN_RATE_PCT: f64 = 50.0;
const TOP_SELLER_FACTOR: f64 = 2.0;
const SELLER_WIN_RATE_PCT: f64 = 60.0;
const CUSTOMER_CONCENTRATION_PCT: f64 = 60.0;

/// Scan a computed report and emit alerts, highlights, comparisons and
/// recommendations.
pub fn generate_insights(report: &SalesReport) -> Vec<Insight> {
    let mut insights = Vec::new();

    let win_loss = &report.win_loss;
    if win_loss.total_fechados > 0 && win_loss.taxa_vitoria < LOW_WIN_RATE_PCT {
        insights.push(
            Insight::new(
                InsightKind::Alert,
                Severity::Warning,
                format!(
                    "Taxa de vitória em {:.1}%, abaixo de {:.0}%",
                    win_loss.taxa_vitoria, LOW_WIN_RATE_PCT
                ),
            )
            .with_action("Revisar a qualificação de oportunidades antes da proposta"),
        );
    }

    if win_loss.total_fechados > 0 && win_loss.taxa_perda > HIGH_LOSS_SHARE_PCT {
        insights.push(Insight::new(
            InsightKind::Alert,
            Severity::Danger,
            format!(
                "{:.1}% dos negócios fechados foram perdidos; etapa mais comum de perda: {}",
                win_loss.taxa_perda, report.lost_deals.etapa_mais_comum_perda
            ),
        ));
    }

    if report.time_to_close.tempo_medio_ganhos > LONG_CYCLE_DAYS {
        insights.push(Insight::new(
            InsightKind::Alert,
            Severity::Warning,
            format!(
                "Ciclo de venda longo: {:.1} dias em média até ganhar um negócio",
                report.time_to_close.tempo_medio_ganhos
            ),
        ));
    }

    let growth = &report.growth;
    if growth.crescimento_percentual > GROWTH_HIGHLIGHT_PCT {
        insights.push(Insight::new(
            InsightKind::Highlight,
            Severity::Success,
            format!(
                "Receita cresceu {:.1}% nos últimos 30 dias (R$ {:.2} vs R$ {:.2})",
                growth.crescimento_percentual,
                growth.receita_ultimos_30_dias,
                growth.receita_30_dias_anteriores
            ),
        ));
    } else if growth.crescimento_percentual < -GROWTH_HIGHLIGHT_PCT {
        insights.push(Insight::new(
            InsightKind::Alert,
            Severity::Danger,
            format!(
                "Receita caiu {:.1}% nos últimos 30 dias",
                growth.crescimento_percentual.abs()
            ),
        ));
    }

    if win_loss.taxa_vitoria > STRONG_WIN_RATE_PCT {
        insights.push(Insight::new(
            InsightKind::Highlight,
            Severity::Success,
            format!("Taxa de vitória forte: {:.1}%", win_loss.taxa_vitoria),
        ));
    }

    if report.sellers.len() >= 2 {
        let team_mean = report
            .sellers
            .iter()
            .map(|s| s.valor_total)
            .sum::<f64>()
            / report.sellers.len() as f64;
        // Sorted descending by won value, so the first row is the top seller.
        let top = &report.sellers[0];
        if team_mean > 0.0 && top.valor_total > TOP_SELLER_FACTOR * team_mean {
            insights.push(Insight::new(
                InsightKind::Comparison,
                Severity::Info,
                format!(
                    "{} vendeu R$ {:.2}, mais que o dobro da média da equipe (R$ {:.2})",
                    top.vendedor, top.valor_total, team_mean
                ),
            ));
        }

        let best_rate = report
            .sellers
            .iter()
            .filter(|s| s.ganhos + s.perdidos > 0)
            .max_by(|a, b| {
                a.taxa_vitoria
                    .partial_cmp(&b.taxa_vitoria)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        if let Some(seller) = best_rate {
            if seller.taxa_vitoria > SELLER_WIN_RATE_PCT {
                insights.push(Insight::new(
                    InsightKind::Highlight,
                    Severity::Info,
                    format!(
                        "{} tem a maior taxa de vitória: {:.1}%",
                        seller.vendedor, seller.taxa_vitoria
                    ),
                ));
            }
        }
    }

    let top5_share: f64 = report
        .top_customers
        .iter()
        .take(5)
        .map(|c| c.percentual)
        .sum();
    if top5_share > CUSTOMER_CONCENTRATION_PCT {
        insights.push(
            Insight::new(
                InsightKind::Recommendation,
                Severity::Warning,
                format!(
                    "Os 5 maiores clientes concentram {:.1}% da receita",
                    top5_share
                ),
            )
            .with_action("Diversificar a carteira para reduzir a dependência"),
        );
    }

    if report.proposals_per_sale.propostas_por_venda > 0.0 {
        insights.push(
            Insight::new(
                InsightKind::Recommendation,
                Severity::Info,
                format!(
                    "São necessárias {:.1} propostas, em média, para fechar 1 venda",
                    report.proposals_per_sale.propostas_por_venda
                ),
            )
            .with_action("Usar este número para dimensionar a meta de propostas"),
        );
    }

    debug!(count = insights.len(), "insights generated");
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use salesdash_analytics::{normalize_deals, ReportOptions, SalesReport};
    use salesdash_core::types::RawDeal;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        "2025-06-30T00:00:00Z".parse().unwrap()
    }

    fn report(v: serde_json::Value) -> SalesReport {
        let raws: Vec<RawDeal> = serde_json::from_value(v).unwrap();
        SalesReport::compute(&normalize_deals(&raws), now(), &ReportOptions::default())
    }

    fn deal(id: i64, status: i64, value: f64, owner: i64, name: &str) -> serde_json::Value {
        json!({"id": id, "value": value, "dealStatus": {"id": status},
               "owner": {"id": owner, "name": name}})
    }

    #[test]
    fn test_low_win_rate_alert() {
        // 1 won, 4 lost -> 20% win rate and 80% loss share
        let report = report(json!([
            deal(1, 2, 100.0, 1, "Ana"),
            deal(2, 3, 100.0, 1, "Ana"),
            deal(3, 3, 100.0, 1, "Ana"),
            deal(4, 3, 100.0, 1, "Ana"),
            deal(5, 3, 100.0, 1, "Ana"),
        ]));
        let insights = generate_insights(&report);

        let alert = insights
            .iter()
            .find(|i| i.kind == InsightKind::Alert && i.severity == Severity::Warning)
            .expect("low win rate alert");
        assert!(alert.message.contains("20.0%"));
        assert!(alert.action.is_some());

        // Loss share above 60% also fires the danger alert.
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightKind::Alert && i.severity == Severity::Danger));
    }

    #[test]
    fn test_strong_win_rate_highlight() {
        let report = report(json!([
            deal(1, 2, 100.0, 1, "Ana"),
            deal(2, 2, 100.0, 1, "Ana"),
            deal(3, 3, 100.0, 1, "Ana"),
        ]));
        let insights = generate_insights(&report);
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightKind::Highlight && i.severity == Severity::Success));
        // No low-win-rate alert at 66.7%.
        assert!(!insights
            .iter()
            .any(|i| i.kind == InsightKind::Alert && i.severity == Severity::Warning));
    }

    #[test]
    fn test_long_cycle_alert() {
        let report = report(json!([
            {"id": 1, "value": 100.0, "dealStatus": {"id": 2},
             "createdAt": "2025-01-01T00:00:00Z", "wonAt": "2025-05-01T00:00:00Z"}
        ]));
        let insights = generate_insights(&report);
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightKind::Alert && i.message.contains("Ciclo")));
    }

    #[test]
    fn test_top_seller_comparison() {
        let report = report(json!([
            deal(1, 2, 10_000.0, 1, "Ana"),
            deal(2, 2, 1_000.0, 2, "Bruno"),
            deal(3, 2, 1_000.0, 3, "Carla"),
        ]));
        let insights = generate_insights(&report);
        let comparison = insights
            .iter()
            .find(|i| i.kind == InsightKind::Comparison)
            .expect("top seller comparison");
        assert!(comparison.message.contains("Ana"));
    }

    #[test]
    fn test_customer_concentration_recommendation() {
        let report = report(json!([
            {"id": 1, "value": 9_000.0, "dealStatus": {"id": 2},
             "organization": {"id": 1, "name": "Alfa"}},
            {"id": 2, "value": 1_000.0, "dealStatus": {"id": 2},
             "organization": {"id": 2, "name": "Beta"}}
        ]));
        let insights = generate_insights(&report);
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightKind::Recommendation
                && i.message.contains("concentram")));
    }

    #[test]
    fn test_proposals_recommendation_always_present_when_computable() {
        let report = report(json!([deal(1, 2, 100.0, 1, "Ana"), deal(2, 3, 100.0, 1, "Ana")]));
        let insights = generate_insights(&report);
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightKind::Recommendation && i.message.contains("propostas")));
    }

    #[test]
    fn test_empty_report_emits_nothing() {
        let report = SalesReport::compute(&[], now(), &ReportOptions::default());
        assert!(generate_insights(&report).is_empty());
    }
}
