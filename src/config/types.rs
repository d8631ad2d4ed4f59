//! Root configuration types.

use super::defaults::{default_cors_origins, default_dev_mode, default_packs_dir, default_port};
use super::game::GameDefaultsConfig;
use super::logging::LoggingConfig;
use super::server::{RateLimitSettings, ServerTimingConfig};
use serde::{Deserialize, Serialize};

/// Root configuration struct for Quiz Rush.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding static JSON question packs
    #[serde(default = "default_packs_dir")]
    pub packs_dir: String,
    /// Comma-separated allowed CORS origins, or "*" for permissive
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// Enables development-only endpoints (pack reload)
    #[serde(default = "default_dev_mode")]
    pub dev_mode: bool,
    #[serde(default)]
    pub server: ServerTimingConfig,
    #[serde(default)]
    pub game: GameDefaultsConfig,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            packs_dir: default_packs_dir(),
            cors_origins: default_cors_origins(),
            dev_mode: default_dev_mode(),
            server: ServerTimingConfig::default(),
            game: GameDefaultsConfig::default(),
            rate_limit: RateLimitSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}
