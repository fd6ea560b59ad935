//! Workbook building: one sheet per report section, header row plus
//! value rows.

use chrono::{DateTime, Utc};
use salesdash_analytics::SalesReport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Sheet {
    fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push_row(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportWorkbook {
    pub name: String,
    pub sheets: Vec<Sheet>,
    pub generated_at: DateTime<Utc>,
}

/// Assemble the download workbook from a computed report.
pub fn build_workbook(report: &SalesReport) -> ReportWorkbook {
    let mut kpis = Sheet::new("KPIs Principais", &["Indicador", "Valor"]);
    for (label, value) in [
        ("Taxa de Vitória (%)", json!(report.win_loss.taxa_vitoria)),
        ("Taxa de Perda (%)", json!(report.win_loss.taxa_perda)),
        ("Negócios Fechados", json!(report.win_loss.total_fechados)),
        (
            "Tempo Médio p/ Fechar (dias)",
            json!(report.time_to_close.tempo_medio_dias),
        ),
        (
            "Receita Confirmada (R$)",
            json!(report.forecast.receita_confirmada),
        ),
        (
            "Receita Potencial (R$)",
            json!(report.forecast.receita_potencial),
        ),
        (
            "Receita Ponderada (R$)",
            json!(report.forecast.receita_ponderada),
        ),
        (
            "Crescimento 30 dias (%)",
            json!(report.growth.crescimento_percentual),
        ),
        (
            "Propostas por Venda",
            json!(report.proposals_per_sale.propostas_por_venda),
        ),
    ] {
        kpis.push_row(vec![json!(label), value]);
    }

    let mut sellers = Sheet::new(
        "Performance Vendedores",
        &[
            "Vendedor",
            "Total",
            "Ganhos",
            "Perdidos",
            "Em Andamento",
            "Taxa Vitória (%)",
            "Valor Total (R$)",
            "Ticket Médio (R$)",
        ],
    );
    for s in &report.sellers {
        sellers.push_row(vec![
            json!(s.vendedor),
            json!(s.total_negocios),
            json!(s.ganhos),
            json!(s.perdidos),
            json!(s.em_andamento),
            json!(s.taxa_vitoria),
            json!(s.valor_total),
            json!(s.ticket_medio),
        ]);
    }

    let mut revenue = Sheet::new("Receita por Período", &["Período", "Receita (R$)", "Negócios"]);
    for p in &report.revenue_by_period {
        revenue.push_row(vec![json!(p.periodo), json!(p.receita), json!(p.quantidade)]);
    }

    let mut customers = Sheet::new(
        "Top Clientes",
        &["Cliente", "Receita (R$)", "Negócios", "% da Receita"],
    );
    for c in &report.top_customers {
        customers.push_row(vec![
            json!(c.cliente),
            json!(c.receita_total),
            json!(c.qtd_negocios),
            json!(c.percentual),
        ]);
    }

    let mut segments = Sheet::new(
        "Top Segmentos",
        &["Segmento", "Receita (R$)", "Negócios", "% da Receita"],
    );
    for s in &report.top_segments {
        segments.push_row(vec![
            json!(s.segmento),
            json!(s.receita_total),
            json!(s.qtd_negocios),
            json!(s.percentual),
        ]);
    }

    let mut funnel = Sheet::new(
        "Funil",
        &["Funil", "Etapa", "Ordem", "Negócios", "Taxa Conversão (%)"],
    );
    for stage in &report.conversion_rates {
        funnel.push_row(vec![
            json!(stage.funil),
            json!(stage.etapa),
            json!(stage.ordem),
            json!(stage.quantidade),
            json!(stage.taxa_conversao),
        ]);
    }

    let mut losses = Sheet::new("Análise de Perdas", &["Indicador", "Valor"]);
    for (label, value) in [
        ("Negócios Perdidos", json!(report.lost_deals.total_perdidos)),
        ("Valor Perdido (R$)", json!(report.lost_deals.valor_perdido)),
        (
            "Ticket Médio Perdido (R$)",
            json!(report.lost_deals.ticket_medio_perdido),
        ),
        (
            "Etapa Mais Comum de Perda",
            json!(report.lost_deals.etapa_mais_comum_perda),
        ),
    ] {
        losses.push_row(vec![json!(label), value]);
    }

    ReportWorkbook {
        name: "Relatório Gerencial".to_string(),
        sheets: vec![kpis, sellers, revenue, customers, segments, funnel, losses],
        generated_at: report.computed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdash_analytics::{normalize_deals, ReportOptions, SalesReport};
    use salesdash_core::types::RawDeal;

    fn report() -> SalesReport {
        let raws: Vec<RawDeal> = serde_json::from_value(serde_json::json!([
            {"id": 1, "value": 1_000.0, "dealStatus": {"id": 2},
             "owner": {"id": 1, "name": "Ana"},
             "organization": {"id": 1, "name": "Alfa"},
             "createdAt": "2025-06-01T00:00:00Z", "wonAt": "2025-06-10T00:00:00Z"},
            {"id": 2, "value": 500.0, "dealStatus": {"id": 3},
             "owner": {"id": 1, "name": "Ana"},
             "dealStage": {"id": 1, "name": "Proposta", "sequence": 1,
                           "funnel": {"id": 1, "name": "Vendas"}}}
        ]))
        .unwrap();
        SalesReport::compute(
            &normalize_deals(&raws),
            "2025-06-30T00:00:00Z".parse().unwrap(),
            &ReportOptions::default(),
        )
    }

    #[test]
    fn test_workbook_has_all_sheets() {
        let workbook = build_workbook(&report());
        let names: Vec<&str> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "KPIs Principais",
                "Performance Vendedores",
                "Receita por Período",
                "Top Clientes",
                "Top Segmentos",
                "Funil",
                "Análise de Perdas"
            ]
        );
    }

    #[test]
    fn test_funnel_sheet_serializes_conversion_rates() {
        let report = report();
        let workbook = build_workbook(&report);
        let funnel = workbook
            .sheets
            .iter()
            .find(|s| s.name == "Funil")
            .expect("funnel sheet");
        // The lost deal carries stage metadata, so one funnel row exists.
        assert_eq!(funnel.rows.len(), report.conversion_rates.len());
        assert_eq!(funnel.rows[0][0], serde_json::json!("Vendas"));
        assert_eq!(funnel.rows[0][1], serde_json::json!("Proposta"));
    }

    #[test]
    fn test_rows_match_headers() {
        let workbook = build_workbook(&report());
        for sheet in &workbook.sheets {
            for row in &sheet.rows {
                assert_eq!(row.len(), sheet.headers.len(), "sheet {}", sheet.name);
            }
        }
    }

    #[test]
    fn test_seller_sheet_content() {
        let workbook = build_workbook(&report());
        let sellers = &workbook.sheets[1];
        assert_eq!(sellers.rows.len(), 1);
        assert_eq!(sellers.rows[0][0], serde_json::json!("Ana"));
    }
}
