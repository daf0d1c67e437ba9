use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::reimbursement::{
    CalculationPolicy, FuelLitersRounding, StatementPolicy, DEFAULT_OFFICE_ADDRESS,
};
use crate::routing::MapySettings;

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
    pub calculation: CalculationConfig,
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

        let timeout_secs = env::var("APP_ROUTING_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let routing = RoutingConfig {
            api_key: non_empty_var("MAPY_API_KEY"),
            base_url: non_empty_var("MAPY_BASE_URL")
                .unwrap_or_else(|| "https://api.mapy.cz".to_string()),
            referer: non_empty_var("MAPY_REFERER"),
            office_address: non_empty_var("APP_OFFICE_ADDRESS")
                .unwrap_or_else(|| DEFAULT_OFFICE_ADDRESS.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let fuel_liters = match non_empty_var("APP_FUEL_ROUNDING") {
            Some(raw) => FuelLitersRounding::parse(&raw)
                .ok_or(ConfigError::InvalidFuelRounding { value: raw })?,
            None => FuelLitersRounding::Exact,
        };
        let disclose_trip_cap = match non_empty_var("APP_DISCLOSE_TRIP_CAP") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "APP_DISCLOSE_TRIP_CAP",
                value: raw,
            })?,
            None => false,
        };

        let calculation = CalculationConfig {
            policy: CalculationPolicy { fuel_liters },
            statement: StatementPolicy { disclose_trip_cap },
            vehicles_csv: non_empty_var("APP_VEHICLES_CSV").map(PathBuf::from),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            routing,
            calculation,
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

/// Mapy.cz access and the fixed trip origin.
#[derive(Clone)]
pub struct RoutingConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub referer: Option<String>,
    pub office_address: String,
    pub timeout: Duration,
}

impl RoutingConfig {
    /// `None` when no API key is configured.
    pub fn mapy_settings(&self) -> Option<MapySettings> {
        self.api_key.as_ref().map(|api_key| MapySettings {
            api_key: api_key.clone(),
            base_url: self.base_url.clone(),
            referer: self.referer.clone(),
            timeout: self.timeout,
        })
    }
}

impl fmt::Debug for RoutingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("referer", &self.referer)
            .field("office_address", &self.office_address)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Rounding and disclosure policies plus the optional fleet file.
#[derive(Debug, Clone)]
pub struct CalculationConfig {
    pub policy: CalculationPolicy,
    pub statement: StatementPolicy,
    pub vehicles_csv: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    InvalidFuelRounding { value: String },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "APP_ROUTING_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidFuelRounding { value } => write!(
                f,
                "APP_FUEL_ROUNDING must be 'exact' or 'one_decimal' (got '{}')",
                value
            ),
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{} must be true or false (got '{}')", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidFuelRounding { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Serialises tests that read or write process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> &'static std::sync::Mutex<()> {
    static GUARD: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();
    GUARD.get_or_init(|| std::sync::Mutex::new(()))
}
