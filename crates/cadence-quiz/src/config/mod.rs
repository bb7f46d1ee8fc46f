use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_KLAVIYO_LIST_ID: &str = "RdvieM";
const DEFAULT_KLAVIYO_API_BASE: &str = "https://a.klaviyo.com/api";
const KLAVIYO_REVISION: &str = "2024-10-15";

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

/// Top-level configuration for the quiz funnel service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub marketing: MarketingConfig,
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

        let api_key = env::var("KLAVIYO_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let list_id = env::var("KLAVIYO_LIST_ID")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_KLAVIYO_LIST_ID.to_string());
        let api_base = env::var("KLAVIYO_API_BASE")
            .unwrap_or_else(|_| DEFAULT_KLAVIYO_API_BASE.to_string());
        if !(api_base.starts_with("http://") || api_base.starts_with("https://")) {
            return Err(ConfigError::InvalidApiBase { value: api_base });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            marketing: MarketingConfig {
                api_key,
                list_id,
                api_base: api_base.trim_end_matches('/').to_string(),
                revision: KLAVIYO_REVISION.to_string(),
            },
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Email-marketing platform credentials. A missing key disables lead forwarding.
#[derive(Clone)]
pub struct MarketingConfig {
    pub api_key: Option<String>,
    pub list_id: String,
    pub api_base: String,
    pub revision: String,
}

impl MarketingConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for MarketingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            list_id: DEFAULT_KLAVIYO_LIST_ID.to_string(),
            api_base: DEFAULT_KLAVIYO_API_BASE.to_string(),
            revision: KLAVIYO_REVISION.to_string(),
        }
    }
}

impl fmt::Debug for MarketingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketingConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("list_id", &self.list_id)
            .field("api_base", &self.api_base)
            .field("revision", &self.revision)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidApiBase { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidApiBase { value } => {
                write!(f, "KLAVIYO_API_BASE must be an http(s) URL, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidApiBase { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
