//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// SQLite database URL.
    /// Env: `DATABASE_URL`
    /// Default: `sqlite://natter.db`
    pub database_url: String,

    /// Maximum number of pooled database connections.
    /// Env: `DATABASE_MAX_CONNECTIONS`
    /// Default: `5`
    pub database_max_connections: u32,

    /// Base URL of the upstream weather service.
    /// Env: `WEATHER_BASE_URL`
    /// Default: `https://api.weather.gov`
    pub weather_base_url: String,

    /// User agent sent to the weather service, which rejects anonymous
    /// clients.  Operators should set this to something with contact info.
    /// Env: `WEATHER_USER_AGENT`
    /// Default: `natter-server/<version>`
    pub weather_user_agent: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            database_url: "sqlite://natter.db".to_string(),
            database_max_connections: 5,
            weather_base_url: "https://api.weather.gov".to_string(),
            weather_user_agent: concat!("natter-server/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(
                    value = %addr,
                    "Invalid HTTP_ADDR, using default"
                );
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Ok(val) = std::env::var("DATABASE_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse::<u32>() {
                config.database_max_connections = n;
            } else {
                tracing::warn!(
                    value = %val,
                    "Invalid DATABASE_MAX_CONNECTIONS, using default"
                );
            }
        }

        if let Ok(url) = std::env::var("WEATHER_BASE_URL") {
            config.weather_base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(agent) = std::env::var("WEATHER_USER_AGENT") {
            config.weather_user_agent = agent;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.database_url, "sqlite://natter.db");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.weather_base_url, "https://api.weather.gov");
    }
}
