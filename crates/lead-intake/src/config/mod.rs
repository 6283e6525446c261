use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::leads::RoutingConfig;

const DEFAULT_CHANNEL_TIMEOUT_MS: u64 = 5_000;

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
    pub routing: RoutingConfig,
    pub notifications: NotificationConfig,
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

        let routing = match optional_var("ROUTING_CONFIG_PATH") {
            Some(path) => load_routing_config(PathBuf::from(path))?,
            None => RoutingConfig::default(),
        };

        let timeout_ms = match optional_var("NOTIFY_CHANNEL_TIMEOUT_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::InvalidChannelTimeout)?,
            None => DEFAULT_CHANNEL_TIMEOUT_MS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            routing,
            notifications: NotificationConfig {
                channel_timeout: Duration::from_millis(timeout_ms),
                sms_url: optional_var("NOTIFY_SMS_URL"),
                email_url: optional_var("NOTIFY_EMAIL_URL"),
                alert_url: optional_var("NOTIFY_ALERT_URL"),
                auth_token: optional_var("NOTIFY_AUTH_TOKEN"),
            },
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a JSON routing table; missing sections fall back to defaults.
pub fn load_routing_config(path: PathBuf) -> Result<RoutingConfig, ConfigError> {
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::RoutingFile {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::RoutingParse { path, source })
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Relay endpoints for each notification channel. A channel without a URL is not wired.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub channel_timeout: Duration,
    pub sms_url: Option<String>,
    pub email_url: Option<String>,
    pub alert_url: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidChannelTimeout,
    RoutingFile {
        path: PathBuf,
        source: std::io::Error,
    },
    RoutingParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidChannelTimeout => write!(
                f,
                "NOTIFY_CHANNEL_TIMEOUT_MS must be a positive number of milliseconds"
            ),
            ConfigError::RoutingFile { path, .. } => {
                write!(f, "unable to read routing config {}", path.display())
            }
            ConfigError::RoutingParse { path, .. } => {
                write!(f, "routing config {} is not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidChannelTimeout => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::RoutingFile { source, .. } => Some(source),
            ConfigError::RoutingParse { source, .. } => Some(source),
        }
    }
}
