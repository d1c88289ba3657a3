use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_MAX_BODY_SIZE: usize = 1 << 20;
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_HALT_AFTER: Duration = Duration::from_secs(20 * 60);
const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_BODY_LIMIT: usize = 1 << 20;
const DEFAULT_LATENCY_PRECISION: f64 = 1000.0;
const DEFAULT_URL_PATTERN: &str = r"^https?://httpbin\.org/(range|delay)/[1-9][0-9]{0,5}$";

// Parses a duration string (e.g., "5s", "20m") into a `tokio::time::Duration`.
fn parse_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}

/// HTTP intake settings.
/// Corresponds to the [server] section in the TOML config file.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_addr")]
    pub addr: String,

    // Largest accepted intake payload in bytes.
    #[serde(default = "ServerConfig::default_max_body_size")]
    pub max_body_size: usize,

    // How long running pollers get to stop once shutdown starts.
    #[serde(
        default = "ServerConfig::default_shutdown_timeout",
        deserialize_with = "parse_duration"
    )]
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    fn default_addr() -> String {
        DEFAULT_ADDR.to_string()
    }

    fn default_max_body_size() -> usize {
        DEFAULT_MAX_BODY_SIZE
    }

    fn default_shutdown_timeout() -> Duration {
        DEFAULT_SHUTDOWN_TIMEOUT
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: Self::default_addr(),
            max_body_size: Self::default_max_body_size(),
            shutdown_timeout: Self::default_shutdown_timeout(),
        }
    }
}

/// Per-job polling settings.
/// Corresponds to the [poller] section in the TOML config file.
#[derive(Debug, Deserialize, Clone)]
pub struct PollerConfig {
    // Absolute lifetime of a job, counted from its start.
    #[serde(
        default = "PollerConfig::default_halt_after",
        deserialize_with = "parse_duration"
    )]
    pub halt_after: Duration,

    #[serde(
        default = "PollerConfig::default_attempt_timeout",
        deserialize_with = "parse_duration"
    )]
    pub attempt_timeout: Duration,

    // Hard cap on a response body in bytes.
    #[serde(default = "PollerConfig::default_body_limit")]
    pub body_limit: usize,

    #[serde(default = "PollerConfig::default_latency_precision")]
    pub latency_precision: f64,
}

impl PollerConfig {
    fn default_halt_after() -> Duration {
        DEFAULT_HALT_AFTER
    }

    fn default_attempt_timeout() -> Duration {
        DEFAULT_ATTEMPT_TIMEOUT
    }

    fn default_body_limit() -> usize {
        DEFAULT_BODY_LIMIT
    }

    fn default_latency_precision() -> f64 {
        DEFAULT_LATENCY_PRECISION
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            halt_after: Self::default_halt_after(),
            attempt_timeout: Self::default_attempt_timeout(),
            body_limit: Self::default_body_limit(),
            latency_precision: Self::default_latency_precision(),
        }
    }
}

/// Job intake rules.
/// Corresponds to the [intake] section in the TOML config file.
#[derive(Debug, Deserialize, Clone)]
pub struct IntakeConfig {
    // Regular expression every submitted URL must match.
    #[serde(default = "IntakeConfig::default_url_pattern")]
    pub url_pattern: String,
}

impl IntakeConfig {
    fn default_url_pattern() -> String {
        DEFAULT_URL_PATTERN.to_string()
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            url_pattern: Self::default_url_pattern(),
        }
    }
}

/// Configuration specific to the mirror reporters.
/// Corresponds to the [reporter] section in the TOML config file.
#[derive(Debug, Deserialize, Clone)]
pub struct ReporterConfig {
    // Whether to enable the stdout reporter.
    #[serde(default = "ReporterConfig::default_enable_stdout")]
    pub enable_stdout: bool,

    // Optional file path for file reporter. If specified, file reporter will be enabled.
    pub file_path: Option<String>,
}

impl ReporterConfig {
    // Default setting for enabling the stdout reporter (false).
    fn default_enable_stdout() -> bool {
        false
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            enable_stdout: Self::default_enable_stdout(),
            file_path: None,
        }
    }
}

/// Represents the overall application configuration, loaded from a TOML file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub poller: PollerConfig,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub reporter: ReporterConfig,
}

impl Config {
    pub fn new(config_path: &Path) -> Result<Self> {
        Self::load_from_file(config_path)
    }

    // Loads configuration from a TOML file.
    fn load_from_file(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)?;
        toml::from_str::<Config>(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }
}
