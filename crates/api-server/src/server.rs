//! HTTP server assembly: routing, middleware, shared state.

use crate::auth::Authenticator;
use crate::rest::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use salesdash_analytics::ReportOptions;
use salesdash_core::config::AppConfig;
use salesdash_crm::CrmClient;
use salesdash_goals::GoalStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct ApiServer {
    config: AppConfig,
    crm: Arc<CrmClient>,
    goals: Arc<GoalStore>,
}

impl ApiServer {
    pub fn new(config: AppConfig, crm: Arc<CrmClient>, goals: Arc<GoalStore>) -> Self {
        Self { config, crm, goals }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState {
            crm: self.crm.clone(),
            goals: self.goals.clone(),
            auth: Arc::new(Authenticator::from_config(&self.config.auth)),
            opts: ReportOptions {
                top_limit: self.config.analytics.top_limit,
                target_revenue: self.config.analytics.target_revenue,
                ..ReportOptions::default()
            },
            snapshot: Arc::new(tokio::sync::RwLock::new(None)),
            start_time: Instant::now(),
        };

        let app = Router::new()
            // Data endpoints
            .route("/v1/login", post(rest::handle_login))
            .route("/v1/refresh", post(rest::handle_refresh))
            .route("/v1/report", get(rest::handle_report))
            .route("/v1/filters", get(rest::handle_filters))
            .route("/v1/insights", get(rest::handle_insights))
            .route("/v1/export", get(rest::handle_export))
            .route(
                "/v1/goals/:month",
                get(rest::handle_get_goal).put(rest::handle_put_goal),
            )
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
