//! REST API handlers for report refresh, metric queries, goal CRUD and
//! the login gate.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use salesdash_analytics::{
    filter_by_period, filter_by_sellers, normalize_deals, DealRow, PeriodFilter, ReportOptions,
    SalesReport,
};
use salesdash_core::types::{Insight, MonthlyGoal, RawFunnel, RawUser};
use salesdash_core::DashError;
use salesdash_crm::CrmClient;
use salesdash_export::{build_workbook, ReportWorkbook};
use salesdash_goals::{GoalProgress, GoalStore, MonthActuals};
use salesdash_insights::generate_insights;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::auth::Authenticator;

/// Latest computed state, swapped wholesale on each successful refresh.
pub struct Snapshot {
    pub report: SalesReport,
    pub insights: Vec<Insight>,
    pub rows: Vec<DealRow>,
    pub users: Vec<RawUser>,
    pub funnels: Vec<RawFunnel>,
}

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub crm: Arc<CrmClient>,
    pub goals: Arc<GoalStore>,
    pub auth: Arc<Authenticator>,
    pub opts: ReportOptions,
    pub snapshot: Arc<tokio::sync::RwLock<Option<Snapshot>>>,
    pub start_time: Instant,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: message.into(),
        }),
    )
}

/// Bearer-token check for the `/v1/*` data routes. A gate with no
/// configured users is open.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if !state.auth.enabled() {
        return Ok(());
    }
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        Some(token) if state.auth.session_valid(token) => Ok(()),
        _ => {
            metrics::counter!("api.unauthorized").increment(1);
            Err(api_error(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "missing or invalid session token",
            ))
        }
    }
}

fn validate_month(month: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "invalid_month",
            format!("'{month}' is not a YYYY-MM month"),
        )
    })
}

fn days_in_month(first: NaiveDate) -> u32 {
    let (year, month) = (first.year(), first.month());
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match next {
        Some(next) => (next - first).num_days() as u32,
        None => 30,
    }
}

// ─── Login ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /v1/login — open a session for a configured user.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !state.auth.enabled() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            "auth_disabled",
            "no users are configured",
        ));
    }
    match state.auth.login(&request.email, &request.password) {
        Some(token) => {
            info!(email = %request.email, "login succeeded");
            Ok(Json(LoginResponse { token }))
        }
        None => {
            warn!(email = %request.email, "login rejected");
            metrics::counter!("api.login_failures").increment(1);
            Err(api_error(
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "email or password rejected",
            ))
        }
    }
}

// ─── Refresh and report ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RefreshResponse {
    pub total_deals: u64,
    pub computed_at: DateTime<Utc>,
    pub insights: usize,
}

/// POST /v1/refresh — full load cycle: fetch, normalize, compute, swap.
/// A CRM failure leaves the previous snapshot untouched.
pub async fn handle_refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    authorize(&state, &headers)?;

    let loaded = async {
        let deals = state.crm.fetch_deals().await?;
        let users = state.crm.fetch_users().await?;
        let funnels = state.crm.fetch_funnels().await?;
        Ok::<_, DashError>((deals, users, funnels))
    }
    .await;

    let (deals, users, funnels) = match loaded {
        Ok(loaded) => loaded,
        Err(e @ DashError::Crm(_)) => {
            error!(error = %e, "refresh aborted, keeping previous snapshot");
            metrics::counter!("api.refresh_failures").increment(1);
            return Err(api_error(StatusCode::BAD_GATEWAY, "crm_unavailable", e.to_string()));
        }
        Err(e) => {
            error!(error = %e, "refresh failed");
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "refresh_failed",
                e.to_string(),
            ));
        }
    };

    let rows = normalize_deals(&deals);
    let now = Utc::now();
    let report = SalesReport::compute(&rows, now, &state.opts);
    let insights = generate_insights(&report);

    info!(
        deals = rows.len(),
        insights = insights.len(),
        "snapshot refreshed"
    );
    metrics::counter!("api.refreshes").increment(1);

    let response = RefreshResponse {
        total_deals: report.total_deals,
        computed_at: report.computed_at,
        insights: insights.len(),
    };
    let mut guard = state.snapshot.write().await;
    *guard = Some(Snapshot {
        report,
        insights,
        rows,
        users,
        funnels,
    });
    Ok(Json(response))
}

fn no_snapshot() -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "no_snapshot",
        "no report computed yet; call /v1/refresh first",
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodChoice {
    All,
    LastMonth,
    LastThreeMonths,
    LastSixMonths,
    LastYear,
    Custom,
}

#[derive(Deserialize)]
pub struct ReportQuery {
    pub period: Option<PeriodChoice>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Comma-separated seller names.
    pub sellers: Option<String>,
}

impl ReportQuery {
    fn is_empty(&self) -> bool {
        self.period.is_none() && self.sellers.is_none()
    }

    fn period_filter(&self) -> Result<PeriodFilter, ApiError> {
        Ok(match self.period {
            None | Some(PeriodChoice::All) => PeriodFilter::All,
            Some(PeriodChoice::LastMonth) => PeriodFilter::LastMonth,
            Some(PeriodChoice::LastThreeMonths) => PeriodFilter::LastThreeMonths,
            Some(PeriodChoice::LastSixMonths) => PeriodFilter::LastSixMonths,
            Some(PeriodChoice::LastYear) => PeriodFilter::LastYear,
            Some(PeriodChoice::Custom) => match (self.start, self.end) {
                (Some(start), Some(end)) => PeriodFilter::Custom { start, end },
                _ => {
                    return Err(api_error(
                        StatusCode::BAD_REQUEST,
                        "invalid_period",
                        "period=custom requires start and end dates",
                    ))
                }
            },
        })
    }

    fn seller_names(&self) -> Vec<String> {
        self.sellers
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// GET /v1/report — latest computed report. With filter parameters the
/// report is recomputed over the filtered snapshot rows; the stored
/// snapshot itself is never replaced here.
pub async fn handle_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> Result<Json<SalesReport>, ApiError> {
    authorize(&state, &headers)?;
    let guard = state.snapshot.read().await;
    let Some(snapshot) = guard.as_ref() else {
        return Err(no_snapshot());
    };

    if query.is_empty() {
        return Ok(Json(snapshot.report.clone()));
    }

    let period = query.period_filter()?;
    let now = Utc::now();
    let rows = filter_by_period(&snapshot.rows, period, now);
    let rows = filter_by_sellers(&rows, &query.seller_names());
    Ok(Json(SalesReport::compute(&rows, now, &state.opts)))
}

#[derive(Serialize)]
pub struct FilterOptions {
    pub sellers: Vec<String>,
    pub funnels: Vec<String>,
}

/// GET /v1/filters — seller and funnel names available for report
/// filtering, from the latest snapshot.
pub async fn handle_filters(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FilterOptions>, ApiError> {
    authorize(&state, &headers)?;
    let guard = state.snapshot.read().await;
    let Some(snapshot) = guard.as_ref() else {
        return Err(no_snapshot());
    };

    let mut sellers: Vec<String> = snapshot.users.iter().filter_map(|u| u.name.clone()).collect();
    sellers.sort();
    sellers.dedup();
    let mut funnels: Vec<String> = snapshot
        .funnels
        .iter()
        .filter_map(|f| f.name.clone())
        .collect();
    funnels.sort();
    funnels.dedup();

    Ok(Json(FilterOptions { sellers, funnels }))
}

/// GET /v1/insights — insights from the latest snapshot.
pub async fn handle_insights(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Insight>>, ApiError> {
    authorize(&state, &headers)?;
    let guard = state.snapshot.read().await;
    match guard.as_ref() {
        Some(snapshot) => Ok(Json(snapshot.insights.clone())),
        None => Err(no_snapshot()),
    }
}

/// GET /v1/export — workbook structure for the latest snapshot.
pub async fn handle_export(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReportWorkbook>, ApiError> {
    authorize(&state, &headers)?;
    let guard = state.snapshot.read().await;
    match guard.as_ref() {
        Some(snapshot) => Ok(Json(build_workbook(&snapshot.report))),
        None => Err(no_snapshot()),
    }
}

// ─── Goals ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct GoalResponse {
    pub meta: MonthlyGoal,
    pub progresso: GoalProgress,
}

/// GET /v1/goals/{month} — stored goal plus progress against the latest
/// snapshot. Projection uses today's day for the current month and the
/// full month length for past months.
pub async fn handle_get_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(month): Path<String>,
) -> Result<Json<GoalResponse>, ApiError> {
    authorize(&state, &headers)?;
    let first = validate_month(&month)?;

    let goal = state.goals.read(&month);
    let guard = state.snapshot.read().await;
    let rows: &[DealRow] = guard.as_ref().map(|s| s.rows.as_slice()).unwrap_or(&[]);
    let actuals = MonthActuals::from_rows(rows, &month);

    let today = Utc::now().date_naive();
    let dias_no_mes = days_in_month(first);
    let dia_atual = if today.year() == first.year() && today.month() == first.month() {
        today.day()
    } else {
        dias_no_mes
    };

    let progresso = GoalProgress::compute(&month, &goal, &actuals, dia_atual, dias_no_mes);
    Ok(Json(GoalResponse {
        meta: goal,
        progresso,
    }))
}

/// PUT /v1/goals/{month} — set the month's targets.
pub async fn handle_put_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(month): Path<String>,
    Json(goal): Json<MonthlyGoal>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers)?;
    validate_month(&month)?;

    match state.goals.write(&month, goal) {
        Ok(()) => {
            info!(month = %month, "goals updated");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            error!(error = %e, month = %month, "goal write failed");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "goal_write_failed",
                e.to_string(),
            ))
        }
    }
}

// ─── Probes ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub has_snapshot: bool,
}

/// GET /health — health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let has_snapshot = state.snapshot.read().await.is_some();
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        has_snapshot,
    })
}

/// GET /ready — readiness probe. Ready once the CRM answers the probe.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.crm.test_connection().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — liveness probe.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_month() {
        assert!(validate_month("2025-06").is_ok());
        assert!(validate_month("2025-13").is_err());
        assert!(validate_month("junho").is_err());
        assert!(validate_month("2025-06-15").is_err());
    }

    #[test]
    fn test_report_query_custom_period_requires_dates() {
        let query = ReportQuery {
            period: Some(PeriodChoice::Custom),
            start: Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            end: None,
            sellers: None,
        };
        assert!(query.period_filter().is_err());
    }

    #[test]
    fn test_report_query_seller_list_parsing() {
        let query = ReportQuery {
            period: None,
            start: None,
            end: None,
            sellers: Some("Ana, Bruno,,  ".to_string()),
        };
        assert_eq!(query.seller_names(), vec!["Ana", "Bruno"]);
        assert!(!query.is_empty());
    }

    #[test]
    fn test_days_in_month() {
        let jun = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let dec = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let feb_leap = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(days_in_month(jun), 30);
        assert_eq!(days_in_month(dec), 31);
        assert_eq!(days_in_month(feb_leap), 29);
    }
}
