use crate::auth::jwt::AuthConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment name (default: `development`).
    pub env: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `FRONTEND_URL`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight search propagations at shutdown.
    pub shutdown_timeout_secs: u64,
    /// Search engine connection settings.
    pub meilisearch: MeiliSearchConfig,
    /// Token verification settings.
    pub auth: AuthConfig,
}

/// Connection settings for the Meilisearch instance.
#[derive(Debug, Clone)]
pub struct MeiliSearchConfig {
    pub host_url: String,
    pub master_key: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `ENV`                    | `development`            |
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `8080`                   |
    /// | `FRONTEND_URL`           | `http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                     |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                     |
    /// | `MEILISEARCH_HOST_URL`   | `http://localhost:7700`  |
    /// | `MEILISEARCH_MASTER_KEY` | unset                    |
    ///
    /// Auth variables are documented on [`AuthConfig::from_env`].
    pub fn from_env() -> Self {
        let env = std::env::var("ENV").unwrap_or_else(|_| "development".into());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let meilisearch = MeiliSearchConfig {
            host_url: std::env::var("MEILISEARCH_HOST_URL")
                .unwrap_or_else(|_| "http://localhost:7700".into()),
            master_key: std::env::var("MEILISEARCH_MASTER_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
        };

        let auth = AuthConfig::from_env();

        Self {
            env,
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            meilisearch,
            auth,
        }
    }
}
