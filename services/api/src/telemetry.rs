use csf_compliance::config::{AppEnvironment, TelemetryConfig};
use csf_compliance::error::AppError;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

#[derive(Debug)]
pub(crate) enum TelemetryError {
    InvalidLevel(String),
    Filter { directives: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidLevel(level) => write!(
                f,
                "invalid log level '{}': expected one of {}",
                level,
                LEVELS.join(", ")
            ),
            TelemetryError::Filter { directives, .. } => {
                write!(f, "unable to build log filter from '{}'", directives)
            }
            TelemetryError::Subscriber(err) => write!(f, "subscriber already installed: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidLevel(_) => None,
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        AppError::Telemetry(Box::new(value))
    }
}

/// Filter applied when `RUST_LOG` is unset: our crates at `level`, HTTP plumbing at warn.
pub(crate) fn default_directives(level: &str) -> Result<String, TelemetryError> {
    let level = level.trim().to_ascii_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        return Err(TelemetryError::InvalidLevel(level));
    }
    Ok(format!(
        "csf_compliance={level},csf_compliance_api={level},tower_http=warn"
    ))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub(crate) fn init(
    config: &TelemetryConfig,
    environment: AppEnvironment,
) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = default_directives(&config.log_level)?;
            EnvFilter::try_new(&directives)
                .map_err(|source| TelemetryError::Filter { directives, source })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(environment == AppEnvironment::Development)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
