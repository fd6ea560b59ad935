//! Salesdash — management reporting service over the Agendor CRM.
//!
//! Main entry point: initializes logging, loads configuration and starts
//! the API server.

use clap::Parser;
use salesdash_api::ApiServer;
use salesdash_core::config::AppConfig;
use salesdash_crm::CrmClient;
use salesdash_goals::GoalStore;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "salesdash")]
#[command(about = "Management reporting service over the Agendor CRM")]
#[command(version)]
struct Cli {
    /// CRM API token (overrides config)
    #[arg(long, env = "SALESDASH__CRM__TOKEN")]
    crm_token: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "SALESDASH__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Goal file path (overrides config)
    #[arg(long, env = "SALESDASH__GOALS__PATH")]
    goals_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salesdash=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Salesdash starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(token) = cli.crm_token {
        config.crm.token = token;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(path) = cli.goals_path {
        config.goals.path = path;
    }

    info!(
        crm_base_url = %config.crm.base_url,
        http_port = config.api.http_port,
        goals_path = %config.goals.path,
        "Configuration loaded"
    );

    let crm = Arc::new(CrmClient::new(&config.crm)?);
    let goals = Arc::new(GoalStore::new(config.goals.path.clone()));

    if crm.test_connection().await {
        info!("CRM connectivity check passed");
    } else {
        warn!("CRM connectivity check failed, refresh will retry on demand");
    }

    info!("Salesdash is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    let api_server = ApiServer::new(config, crm, goals);
    api_server.start_http().await?;

    Ok(())
}
