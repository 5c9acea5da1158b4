use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::constants::{ALERT_THRESHOLD, EMOTION_REPORT_INTERVAL_SECS, EMOTION_SAMPLE_INTERVAL_SECS};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub cors_origin: String,
    pub monitor: MonitorConfig,
    pub classifier: ClassifierConfig,
    pub notifier: NotifierConfig,
}

/// Which frame source the monitor pipeline runs with.
///
/// `Off` keeps the HTTP surface and fusion cycle alive without a frame
/// loop; `Synthetic` runs the built-in scripted camera, useful for demos
/// and soak testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Off,
    Synthetic,
}

impl CameraMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Synthetic => "synthetic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub camera: CameraMode,
    pub sample_interval_secs: u64,
    pub report_interval_secs: u64,
    pub alert_threshold: usize,
}

#[derive(Clone)]
pub struct ClassifierConfig {
    pub enabled: bool,
    pub mock: bool,
    pub api_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// External program run per alert; console bell when unset.
    pub command: Option<String>,
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("enabled", &self.enabled)
            .field("mock", &self.mock)
            .field("api_url", &self.api_url)
            .field("api_key", &"***REDACTED***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        let alert_command = env_or("ALERT_COMMAND", "");
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            monitor: MonitorConfig {
                camera: env_camera_mode("CAMERA_MODE", CameraMode::Off),
                sample_interval_secs: env_or_parse(
                    "SAMPLE_INTERVAL_SECS",
                    EMOTION_SAMPLE_INTERVAL_SECS,
                ),
                report_interval_secs: env_or_parse(
                    "REPORT_INTERVAL_SECS",
                    EMOTION_REPORT_INTERVAL_SECS,
                ),
                alert_threshold: env_or_parse("ALERT_THRESHOLD", ALERT_THRESHOLD),
            },
            classifier: ClassifierConfig {
                enabled: env_or_bool("CLASSIFIER_ENABLED", false),
                mock: env_or_bool("CLASSIFIER_MOCK", true),
                api_url: env_or("CLASSIFIER_API_URL", ""),
                api_key: env_or("CLASSIFIER_API_KEY", ""),
                timeout_secs: env_or_parse("CLASSIFIER_TIMEOUT_SECS", 10_u64),
            },
            notifier: NotifierConfig {
                command: if alert_command.is_empty() {
                    None
                } else {
                    Some(alert_command)
                },
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

fn env_camera_mode(key: &str, default: CameraMode) -> CameraMode {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "off" => CameraMode::Off,
            "synthetic" => CameraMode::Synthetic,
            _ => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Unknown camera mode, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}
