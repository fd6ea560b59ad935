//! Shared domain types: raw CRM records as the API returns them, deal
//! status, monthly goals, and insight records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A deal exactly as the CRM returns it. Nested objects (status, owner,
/// stage, organization) stay loose `Value`s: the CRM is not consistent
/// about their shape, so extraction happens in the normalizer, where a
/// wrong shape resolves to null instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDeal {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub deal_status: Value,
    #[serde(default)]
    pub owner: Value,
    #[serde(default)]
    pub deal_stage: Value,
    #[serde(default)]
    pub organization: Value,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub won_at: Option<String>,
    #[serde(default)]
    pub lost_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUser {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFunnel {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Deal lifecycle status, mapped from the CRM's numeric status id
/// (1 = ongoing, 2 = won, 3 = lost). Unmapped ids normalize to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealStatus {
    Ongoing,
    Won,
    Lost,
}

impl DealStatus {
    pub fn from_status_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(DealStatus::Ongoing),
            2 => Some(DealStatus::Won),
            3 => Some(DealStatus::Lost),
            _ => None,
        }
    }
}

/// Targets for one calendar month, keyed externally by `"YYYY-MM"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGoal {
    pub receita: f64,
    pub vendas: i64,
    pub propostas: i64,
    pub novos_clientes: i64,
}

impl Default for MonthlyGoal {
    fn default() -> Self {
        Self {
            receita: 150_000.0,
            vendas: 15,
            propostas: 50,
            novos_clientes: 5,
        }
    }
}

// ─── Insights ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Alert,
    Highlight,
    Comparison,
    Recommendation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Danger,
    Success,
    Info,
}

/// A single generated insight. Ephemeral: recomputed on every analysis
/// pass, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl Insight {
    pub fn new(kind: InsightKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            action: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_id_mapping() {
        assert_eq!(DealStatus::from_status_id(1), Some(DealStatus::Ongoing));
        assert_eq!(DealStatus::from_status_id(2), Some(DealStatus::Won));
        assert_eq!(DealStatus::from_status_id(3), Some(DealStatus::Lost));
        assert_eq!(DealStatus::from_status_id(0), None);
        assert_eq!(DealStatus::from_status_id(7), None);
    }

    #[test]
    fn test_raw_deal_tolerates_malformed_nested_fields() {
        let json = serde_json::json!({
            "id": 42,
            "dealStatus": "not-an-object",
            "owner": 17,
            "value": null
        });
        let deal: RawDeal = serde_json::from_value(json).unwrap();
        assert_eq!(deal.id, 42);
        assert!(deal.value.is_none());
        assert!(deal.deal_stage.is_null());
    }

    #[test]
    fn test_default_goal() {
        let goal = MonthlyGoal::default();
        assert_eq!(goal.receita, 150_000.0);
        assert_eq!(goal.vendas, 15);
        assert_eq!(goal.propostas, 50);
        assert_eq!(goal.novos_clientes, 5);
    }
}
