use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub retrieval: RetrievalConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            retrieval: RetrievalConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.45;
pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_CITATION_MIN_RELEVANCE: f32 = 0.10;
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: usize = 1024;

/// Knowledge-base retrieval policy. The escalation threshold is a business dial,
/// so it is read from the environment rather than fixed in the gate.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    pub confidence_threshold: f32,
    pub max_results: usize,
    pub citation_min_relevance: f32,
    pub embedding_cache_capacity: usize,
    pub seed_csv: Option<PathBuf>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
            citation_min_relevance: DEFAULT_CITATION_MIN_RELEVANCE,
            embedding_cache_capacity: DEFAULT_EMBEDDING_CACHE_CAPACITY,
            seed_csv: None,
        }
    }
}

impl RetrievalConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let confidence_threshold = match env::var("APP_KB_CONFIDENCE_THRESHOLD") {
            Ok(raw) => parse_unit_interval("APP_KB_CONFIDENCE_THRESHOLD", &raw)?,
            Err(_) => defaults.confidence_threshold,
        };
        let citation_min_relevance = match env::var("APP_KB_CITATION_MIN_RELEVANCE") {
            Ok(raw) => parse_unit_interval("APP_KB_CITATION_MIN_RELEVANCE", &raw)?,
            Err(_) => defaults.citation_min_relevance,
        };
        let max_results = match env::var("APP_KB_MAX_RESULTS") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidCount {
                    variable: "APP_KB_MAX_RESULTS",
                })?,
            Err(_) => defaults.max_results,
        };
        let embedding_cache_capacity = match env::var("APP_KB_EMBEDDING_CACHE") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidCount {
                    variable: "APP_KB_EMBEDDING_CACHE",
                })?,
            Err(_) => defaults.embedding_cache_capacity,
        };
        let seed_csv = env::var("APP_KB_SEED_CSV")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            confidence_threshold,
            max_results,
            citation_min_relevance,
            embedding_cache_capacity,
            seed_csv,
        })
    }
}

fn parse_unit_interval(variable: &'static str, raw: &str) -> Result<f32, ConfigError> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|value| (0.0..=1.0).contains(value))
        .ok_or(ConfigError::InvalidScore { variable })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScore { variable: &'static str },
    InvalidCount { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScore { variable } => {
                write!(f, "{variable} must be a number between 0.0 and 1.0")
            }
            ConfigError::InvalidCount { variable } => {
                write!(f, "{variable} must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidScore { .. }
            | ConfigError::InvalidCount { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for variable in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_KB_CONFIDENCE_THRESHOLD",
            "APP_KB_MAX_RESULTS",
            "APP_KB_CITATION_MIN_RELEVANCE",
            "APP_KB_EMBEDDING_CACHE",
            "APP_KB_SEED_CSV",
        ] {
            env::remove_var(variable);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.retrieval, RetrievalConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn threshold_is_tunable_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_KB_CONFIDENCE_THRESHOLD", "0.6");
        env::set_var("APP_KB_MAX_RESULTS", "3");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.retrieval.confidence_threshold, 0.6);
        assert_eq!(config.retrieval.max_results, 3);
        reset_env();
    }

    #[test]
    fn rejects_threshold_outside_unit_interval() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_KB_CONFIDENCE_THRESHOLD", "1.5");
        match AppConfig::load() {
            Err(ConfigError::InvalidScore { variable }) => {
                assert_eq!(variable, "APP_KB_CONFIDENCE_THRESHOLD")
            }
            other => panic!("expected invalid score, got {other:?}"),
        }
        reset_env();
    }
}
