use std::{net::SocketAddr, str::FromStr, time::Duration};

use axum::http::HeaderValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Which cache provider backs the Broker store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheProvider {
    Memory,
    Sqlite,
}

impl FromStr for CacheProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheProvider::Memory),
            "sqlite" => Ok(CacheProvider::Sqlite),
            other => Err(format!("unknown cache provider '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else if s.eq_ignore_ascii_case("text") {
            Ok(LogFormat::Text)
        } else {
            Err(format!("expected 'text' or 'json', got '{}'", s))
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cache_provider: CacheProvider,
    pub cache_path: String,
    pub cache_name: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub portfolio_url: Option<String>,
    pub portfolio_token: Option<String>,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads `BQ_*` variables, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Unset and blank
    /// variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr = parse_or(&var, "BQ_LISTEN_ADDR", "0.0.0.0:9080")?;
        let cache_provider = parse_or(&var, "BQ_CACHE_PROVIDER", "memory")?;
        let cache_path = var("BQ_CACHE_PATH").unwrap_or_else(|| "./data/cache.db".into());
        let cache_name = var("BQ_CACHE_NAME").unwrap_or_else(|| "broker".into());

        let cors_raw = var("BQ_CORS_ALLOW_ORIGINS").unwrap_or_else(|| "*".into());
        let cors_allow: Vec<String> = cors_raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in cors_allow.iter().filter(|o| o.as_str() != "*") {
            HeaderValue::from_str(origin)
                .map_err(|e| invalid("BQ_CORS_ALLOW_ORIGINS", origin, e))?;
        }

        let timeout_ms: u64 = parse_or(&var, "BQ_REQUEST_TIMEOUT_MS", "30000")?;
        if timeout_ms == 0 {
            return Err(invalid(
                "BQ_REQUEST_TIMEOUT_MS",
                "0",
                "timeout must be positive",
            ));
        }

        let portfolio_url = var("BQ_PORTFOLIO_URL");
        if let Some(url) = &portfolio_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid(
                    "BQ_PORTFOLIO_URL",
                    url,
                    "expected an http(s) URL",
                ));
            }
        }

        Ok(Self {
            listen_addr,
            cache_provider,
            cache_path,
            cache_name,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            portfolio_url,
            portfolio_token: var("BQ_PORTFOLIO_TOKEN"),
            log_format: parse_or(&var, "BQ_LOG_FORMAT", "text")?,
        })
    }
}

fn parse_or<T, V>(var: &V, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    V: Fn(&str) -> Option<String>,
{
    let raw = var(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| invalid(key, &raw, e))
}
