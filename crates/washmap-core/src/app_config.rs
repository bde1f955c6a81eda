use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime configuration for the washmap client.
///
/// All values come from `WASHMAP_*` environment variables (see
/// [`crate::config::load_app_config`]); everything except the base URL has a
/// sensible default so the CLI works against a local dev server out of the box.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Origin of the car-wash service, e.g. `http://localhost:8000`.
    pub base_url: String,
    pub env: Environment,
    pub log_level: String,
    /// Per-request timeout for the HTTP client.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Default circle radius for business circle recommendations.
    pub default_radius_km: f64,
    /// Minimum distance from an existing car wash for a candidate site.
    pub default_min_distance_km: f64,
    /// Search radius for counting settlements around a candidate site.
    pub default_max_settlement_distance_km: f64,
    /// Competition analysis radius.
    pub default_competition_radius_km: f64,
    /// Where the mobile-style auth token is persisted between runs.
    pub token_path: PathBuf,
}
