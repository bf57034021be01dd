use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::access::policy::{
    AccessPolicy, PolicyError, PolicySettings, DEFAULT_DATE_FORMAT, DEFAULT_EXPIRING_SOON_DAYS,
    DEFAULT_PERMANENT_LABEL, DEFAULT_RENEWAL_URL_TEMPLATE,
};
use crate::access::views::{PanelLinks, DEFAULT_RENEW_COURSE_TEMPLATE, DEFAULT_SHOP_URL};
use crate::access::{CourseAccessClassifier, CourseId, SelectionSettings, TitleMarker};

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
    pub access: AccessConfig,
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
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            access: AccessConfig::from_env()?,
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
    pub ansi: bool,
}

/// Classification policy, featured-course defaults and renderer fallbacks.
#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    pub policy: PolicySettings,
    pub links: PanelLinks,
    pub priority_marker: Option<String>,
    pub preferred_course_id: Option<String>,
}

impl AccessConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let expiring_soon_days = match env::var("ACCESS_EXPIRING_SOON_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .map_err(|_| ConfigError::InvalidNumber("ACCESS_EXPIRING_SOON_DAYS"))?,
            Err(_) => DEFAULT_EXPIRING_SOON_DAYS,
        };

        let utc_offset_seconds = match env::var("ACCESS_UTC_OFFSET_SECONDS") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .map_err(|_| ConfigError::InvalidNumber("ACCESS_UTC_OFFSET_SECONDS"))?,
            Err(_) => 0,
        };

        let policy = PolicySettings {
            expiring_soon_days,
            date_format: env_or("ACCESS_DATE_FORMAT", DEFAULT_DATE_FORMAT),
            utc_offset_seconds,
            permanent_label: env_or("ACCESS_PERMANENT_LABEL", DEFAULT_PERMANENT_LABEL),
            renewal_url_template: env_or(
                "ACCESS_RENEWAL_URL_TEMPLATE",
                DEFAULT_RENEWAL_URL_TEMPLATE,
            ),
        };

        let links = PanelLinks {
            shop_url: env_or("ACCESS_SHOP_URL", DEFAULT_SHOP_URL),
            renew_course_template: env_or(
                "ACCESS_RENEW_COURSE_TEMPLATE",
                DEFAULT_RENEW_COURSE_TEMPLATE,
            ),
        };

        Ok(Self {
            policy,
            links,
            priority_marker: env_non_empty("ACCESS_PRIORITY_MARKER"),
            preferred_course_id: env_non_empty("ACCESS_PREFERRED_COURSE_ID"),
        })
    }

    pub fn classifier(&self) -> Result<CourseAccessClassifier, PolicyError> {
        AccessPolicy::new(self.policy.clone()).map(CourseAccessClassifier::new)
    }

    pub fn selection(&self) -> SelectionSettings {
        SelectionSettings {
            priority_marker: self.priority_marker.clone().and_then(TitleMarker::new),
            preferred_course_id: self.preferred_course_id.clone().map(CourseId::new),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber(key) => write!(f, "{key} must be an integer"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
