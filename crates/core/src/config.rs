use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `SALESDASH__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub crm: CrmConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
    #[serde(default = "default_crm_base_url")]
    pub base_url: String,
    /// API token. Empty means unconfigured; the client refuses to start a
    /// load cycle without one.
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Pause between paginated requests, to stay under the CRM rate limit.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoalsConfig {
    #[serde(default = "default_goals_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Required email domain for login, without the leading `@`.
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
    /// email -> SHA-256 password hash (hex), comma-separated `email:hash`
    /// pairs when provided via environment.
    #[serde(default)]
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
    #[serde(default = "default_target_revenue")]
    pub target_revenue: f64,
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_crm_base_url() -> String {
    "https://api.agendor.com.br/v3".to_string()
}
fn default_page_size() -> usize {
    100
}
fn default_page_delay_ms() -> u64 {
    100
}
fn default_goals_path() -> String {
    "metas.json".to_string()
}
fn default_email_domain() -> String {
    "gebrasil.com".to_string()
}
fn default_top_limit() -> usize {
    5
}
fn default_target_revenue() -> f64 {
    100_000.0
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            base_url: default_crm_base_url(),
            token: String::new(),
            page_size: default_page_size(),
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            path: default_goals_path(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            email_domain: default_email_domain(),
            users: Vec::new(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_limit: default_top_limit(),
            target_revenue: default_target_revenue(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            crm: CrmConfig::default(),
            goals: GoalsConfig::default(),
            auth: AuthConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("SALESDASH")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
