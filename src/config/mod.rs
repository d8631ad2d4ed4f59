//! Configuration module for Quiz Rush.
//!
//! Configuration is loaded from a JSON file with environment variable
//! overrides and sensible compiled-in defaults.
//!
//! # Module Structure
//!
//! - [`crate::config::types`]: Root `Config` struct
//! - [`server`]: Server behavior configuration (timeouts, cleanup cadence)
//! - [`game`]: Default per-room game settings
//! - [`logging`]: Logging configuration
//! - [`crate::config::loader`]: Configuration loading functions
//! - [`crate::config::validation`]: Configuration validation functions
//! - [`crate::config::defaults`]: Default value functions

// Submodules
pub mod defaults;
pub mod game;
pub mod loader;
pub mod logging;
pub mod server;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use game::GameDefaultsConfig;

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use server::{RateLimitSettings, ServerTimingConfig};

pub use types::Config;

pub use validation::validate_config;
