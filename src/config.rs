use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderValue;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub environment: Environment,
    pub log_level: String,
    pub run_migrations: bool,
    /// Browser origins allowed cross-origin access in production.
    pub cors_origins: Vec<HeaderValue>,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        match raw {
            "production" => Self::Production,
            "staging" => Self::Staging,
            _ => Self::Development,
        }
    }
}

const DEFAULT_DATABASE_URL: &str = "sqlite://app.db?mode=rwc";
const DEFAULT_PORT: &str = "5555";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional: `DATABASE_URL`, `SERVER_HOST`, `SERVER_PORT` (or `PORT`),
    /// `ENVIRONMENT`, `LOG_LEVEL`, `RUN_MIGRATIONS`, `CORS_ORIGINS` (comma-separated).
    ///
    /// # Errors
    ///
    /// Returns an error if `SERVER_HOST`, `SERVER_PORT`, `RUN_MIGRATIONS` or `CORS_ORIGINS`
    /// contain invalid values.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let environment = Environment::parse(
            &std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        );

        let server_port = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("SERVER_PORT / PORT must be a valid u16"))?;

        // Bind every interface in production so the process is reachable behind a proxy
        let default_host = if environment == Environment::Production {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let server_host = std::env::var("SERVER_HOST")
            .unwrap_or_else(|_| default_host.to_string())
            .parse::<IpAddr>()
            .map_err(|_| anyhow::anyhow!("SERVER_HOST must be a valid IP address"))?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let run_migrations = parse_flag(
            &std::env::var("RUN_MIGRATIONS").unwrap_or_else(|_| "true".to_string()),
        )
        .ok_or_else(|| anyhow::anyhow!("RUN_MIGRATIONS must be true or false"))?;

        let cors_origins = parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or_default())?;

        Ok(Self {
            database_url,
            server_host,
            server_port,
            environment,
            log_level,
            run_migrations,
            cors_origins,
        })
    }

    /// Build the socket address for the server to bind to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_origins(raw: &str) -> anyhow::Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            if origin == "*" {
                anyhow::bail!("CORS_ORIGINS must list explicit origins, not '*'");
            }
            HeaderValue::from_str(origin)
                .map_err(|_| anyhow::anyhow!("CORS_ORIGINS contains an invalid origin: {origin}"))
        })
        .collect()
}
