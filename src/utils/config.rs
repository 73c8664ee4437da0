use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Upstream API configuration
    pub upstream: UpstreamConfig,
    /// Deployment mode
    pub mode: DeploymentMode,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    /// Total request timeout; `None` leaves the transport defaults in place.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Development,
    Production,
}

impl DeploymentMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let base_url = env::var("API_BASE_URL")
            .map_err(|_| anyhow::anyhow!("API_BASE_URL is required"))?;
        if base_url.trim().is_empty() {
            anyhow::bail!("API_BASE_URL cannot be empty");
        }

        let timeout_secs = match env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(raw) => Some(
                raw.parse()
                    .map_err(|_| anyhow::anyhow!("Invalid UPSTREAM_TIMEOUT_SECS value"))?,
            ),
            Err(_) => None,
        };

        let config = Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid PORT value"))?,
                cors_origins: env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            upstream: UpstreamConfig {
                base_url: base_url.trim().trim_end_matches('/').to_string(),
                timeout_secs,
            },
            mode: DeploymentMode::parse(
                &env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            ),
        };

        Ok(config)
    }

    /// Build a configuration directly, bypassing the environment.
    pub fn new(api_base_url: impl Into<String>, dev: bool) -> Self {
        let base_url: String = api_base_url.into();
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            upstream: UpstreamConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout_secs: None,
            },
            mode: if dev {
                DeploymentMode::Development
            } else {
                DeploymentMode::Production
            },
        }
    }

    pub fn is_dev(&self) -> bool {
        self.mode == DeploymentMode::Development
    }

    /// Cookies carry `Secure` everywhere except development.
    pub fn secure_cookies(&self) -> bool {
        !self.is_dev()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
