use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::loan_approval::NormalizerPolicy;

pub const DEFAULT_MODEL_PATH: &str = "models/loan_approval_logistic.json";

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
    pub model: ModelConfig,
    pub form: FormConfig,
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
        let ansi = flag("APP_LOG_ANSI")?.unwrap_or(false);

        let artifact_path = env::var("LOAN_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, ansi },
            model: ModelConfig { artifact_path },
            form: FormConfig {
                collect_credit_score: flag("LOAN_COLLECT_CREDIT_SCORE")?,
                collect_credit_history: flag("LOAN_COLLECT_CREDIT_HISTORY")?,
            },
        })
    }
}

fn flag(name: &'static str) -> Result<Option<bool>, ConfigError> {
    let Ok(value) = env::var(name) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidFlag { name, value }),
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
    pub ansi: bool,
}

/// Location of the trained classifier artifact.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub artifact_path: PathBuf,
}

/// Optional overrides for which optional features the form collects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormConfig {
    pub collect_credit_score: Option<bool>,
    pub collect_credit_history: Option<bool>,
}

impl FormConfig {
    pub fn is_overridden(&self) -> bool {
        self.collect_credit_score.is_some() || self.collect_credit_history.is_some()
    }

    /// Apply the overrides on top of a policy derived from the loaded artifact.
    pub fn apply(&self, derived: NormalizerPolicy) -> NormalizerPolicy {
        NormalizerPolicy {
            collect_credit_score: self
                .collect_credit_score
                .unwrap_or(derived.collect_credit_score),
            collect_credit_history: self
                .collect_credit_history
                .unwrap_or(derived.collect_credit_history),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort | ConfigError::InvalidFlag { .. } => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_ANSI",
            "LOAN_MODEL_PATH",
            "LOAN_COLLECT_CREDIT_SCORE",
            "LOAN_COLLECT_CREDIT_HISTORY",
        ] {
            env::remove_var(name);
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
        assert!(!config.telemetry.ansi);
        assert_eq!(
            config.model.artifact_path,
            PathBuf::from("models/loan_approval_logistic.json")
        );
        assert!(!config.form.is_overridden());
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
    fn reads_form_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOAN_COLLECT_CREDIT_SCORE", "No");
        env::set_var("LOAN_MODEL_PATH", "/srv/models/loan.json");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.form.collect_credit_score, Some(false));
        assert_eq!(config.form.collect_credit_history, None);
        assert_eq!(
            config.form.apply(NormalizerPolicy::default()),
            NormalizerPolicy {
                collect_credit_score: false,
                collect_credit_history: true,
            }
        );
        assert_eq!(
            config.model.artifact_path,
            PathBuf::from("/srv/models/loan.json")
        );
    }

    #[test]
    fn rejects_malformed_flags() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LOAN_COLLECT_CREDIT_HISTORY", "sometimes");
        let result = AppConfig::load();
        reset_env();

        match result {
            Err(ConfigError::InvalidFlag { name, value }) => {
                assert_eq!(name, "LOAN_COLLECT_CREDIT_HISTORY");
                assert_eq!(value, "sometimes");
            }
            other => panic!("expected invalid flag, got {other:?}"),
        }
    }
}
