// --- File: crates/gatehouse_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- Authority API Config ---
// The bearer token normally comes from the session file; `token` is an override
// and is usually set to "secret_from_env" (GATEHOUSE_SECRET_API_TOKEN).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub base_url: String, // Mandatory
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub token: Option<String>,
}

// --- Session Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Path of the persisted operator session (JSON).
    pub path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: "session.json".to_string(),
        }
    }
}

// --- Agent Bundle Defaults ---
// Static values merged into every generated agent configuration bundle.
// The IP addresses are placeholders the installer edits on site.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BundleDefaults {
    pub agent_version: String,
    /// Overrides `api.base_url` inside the bundle when the agent reaches the
    /// authority through a different address than operators do.
    pub api_base_url: Option<String>,
    pub poll_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub timeout_ms: u64,
    pub controller_kind: String,
    pub controller_ip: String,
    pub controller_port: u16,
    pub relay_board_ip: String,
    pub qr_reader_enabled: bool,
    pub qr_reader_port: String,
    pub qr_reader_baud_rate: u32,
    pub log_level: String,
    pub log_file: String,
    pub log_max_files: u32,
}

impl Default for BundleDefaults {
    fn default() -> Self {
        Self {
            agent_version: "1.0.0".to_string(),
            api_base_url: None,
            poll_interval_ms: 2_000,
            heartbeat_interval_ms: 30_000,
            timeout_ms: 10_000,
            controller_kind: "zkteco".to_string(),
            controller_ip: "192.168.1.201".to_string(),
            controller_port: 4370,
            relay_board_ip: "192.168.1.200".to_string(),
            qr_reader_enabled: false,
            qr_reader_port: "/dev/ttyUSB0".to_string(),
            qr_reader_baud_rate: 9600,
            log_level: "info".to_string(),
            log_file: "logs/agent.log".to_string(),
            log_max_files: 7,
        }
    }
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Authority config is mandatory
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub bundle: BundleDefaults,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Base URL the field agent should use, falling back to the operator API URL.
    pub fn agent_api_base_url(&self) -> &str {
        self.bundle
            .api_base_url
            .as_deref()
            .unwrap_or(&self.api.base_url)
    }
}
