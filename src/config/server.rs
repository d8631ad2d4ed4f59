//! Server behavior configuration: room lifecycle timeouts and rate limiting.

use super::defaults::{
    default_cleanup_interval_secs, default_ended_room_ttl_secs, default_idle_room_timeout_secs,
    default_no_connection_ttl_secs, default_rate_limit_max_events, default_rate_limit_window_ms,
};
use serde::{Deserialize, Serialize};

/// Room lifecycle timing. All values in seconds.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerTimingConfig {
    /// Cadence of the room reaper sweep
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
    /// A room with no inbound activity for this long is destroyed
    #[serde(default = "default_idle_room_timeout_secs")]
    pub idle_room_timeout_secs: u64,
    /// An ended room is destroyed after this much idle time
    #[serde(default = "default_ended_room_ttl_secs")]
    pub ended_room_ttl_secs: u64,
    /// A room with no connections is destroyed after this much idle time
    #[serde(default = "default_no_connection_ttl_secs")]
    pub no_connection_ttl_secs: u64,
}

impl Default for ServerTimingConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: default_cleanup_interval_secs(),
            idle_room_timeout_secs: default_idle_room_timeout_secs(),
            ended_room_ttl_secs: default_ended_room_ttl_secs(),
            no_connection_ttl_secs: default_no_connection_ttl_secs(),
        }
    }
}

/// Per-connection inbound event rate limiting.
///
/// Exceeding the limit is the only condition that closes a connection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RateLimitSettings {
    /// Sliding window length in milliseconds
    #[serde(default = "default_rate_limit_window_ms")]
    pub window_ms: u64,
    /// Maximum inbound events per window
    #[serde(default = "default_rate_limit_max_events")]
    pub max_events: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_ms: default_rate_limit_window_ms(),
            max_events: default_rate_limit_max_events(),
        }
    }
}
