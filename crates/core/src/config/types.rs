use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub net: NetConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base url of the HTTP API, schema included, without `/api/*`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whether detail links carry the api version number
    /// (`/api/1.0/vehicle/detail` vs `/api/vehicle/detail`).
    #[serde(default = "default_true")]
    pub link_has_version: bool,
    /// Verify TLS certificates; stations commonly run self-signed.
    #[serde(default)]
    pub verify_tls: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            link_has_version: true,
            verify_tls: false,
        }
    }
}

/// Network governance configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetConfig {
    /// Network level ordinal (0-3).
    #[serde(default)]
    pub level: u8,
    /// Seconds to wait between requests at the delay-paced levels.
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: f64,
    /// Download budget in megabytes, used only at the byte-budget level.
    #[serde(default = "default_data_limit_mb")]
    pub data_limit_mb: f64,
}

impl NetConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.request_delay_secs.max(0.0))
    }

    pub fn data_limit_bytes(&self) -> u64 {
        (self.data_limit_mb * 1_048_576.0) as u64
    }
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            level: 0,
            request_delay_secs: default_request_delay_secs(),
            data_limit_mb: default_data_limit_mb(),
        }
    }
}

/// Harvest run configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarvestConfig {
    /// Directory downloaded images are stored under.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    /// Path to the already downloaded station export.
    #[serde(default = "default_input_file")]
    pub input_file: PathBuf,
    /// Extension (= format) of images in the API.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    /// Default location code used when the lane description is absent;
    /// a random two-letter code is generated when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_code: Option<String>,
    /// Ordered image tag preference.
    #[serde(default = "default_tag_preference")]
    pub tag_preference: Vec<String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
            input_file: default_input_file(),
            file_extension: default_file_extension(),
            location_code: None,
            tag_preference: default_tag_preference(),
        }
    }
}

fn default_base_url() -> String {
    "https://localhost".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_delay_secs() -> f64 {
    0.5
}

fn default_data_limit_mb() -> f64 {
    10.0
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_input_file() -> PathBuf {
    PathBuf::from("vehicles.csv")
}

fn default_file_extension() -> String {
    "jpg".to_string()
}

fn default_tag_preference() -> Vec<String> {
    vec!["SNAP".to_string(), "SNAPB".to_string()]
}
