//! Default value functions shared by the config structs.
//!
//! Kept as free functions so they can double as serde `default =` targets.

pub fn default_port() -> u16 {
    3560
}

pub fn default_packs_dir() -> String {
    "packs".to_string()
}

pub fn default_cors_origins() -> String {
    "*".to_string()
}

pub fn default_dev_mode() -> bool {
    false
}

// Server timing defaults (seconds)

pub fn default_cleanup_interval_secs() -> u64 {
    300
}

pub fn default_idle_room_timeout_secs() -> u64 {
    7_200
}

pub fn default_ended_room_ttl_secs() -> u64 {
    600
}

pub fn default_no_connection_ttl_secs() -> u64 {
    900
}

// Game defaults

pub fn default_max_lives() -> u64 {
    3
}

pub fn default_countdown_ms() -> i64 {
    3_000
}

pub fn default_starting_coins() -> u64 {
    150
}

pub fn default_buyback_cost_coins() -> u64 {
    200
}

pub fn default_boss_hp() -> u64 {
    6
}

// Rate limit defaults

pub fn default_rate_limit_window_ms() -> u64 {
    1_000
}

pub fn default_rate_limit_max_events() -> u32 {
    20
}

// Logging defaults

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub fn default_enable_file_logging() -> bool {
    false
}

pub fn default_log_format() -> super::LogFormat {
    super::LogFormat::Text
}
