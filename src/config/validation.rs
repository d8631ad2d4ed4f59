//! Configuration validation functions.

use super::Config;

/// Validate a loaded configuration. Collects every problem into one error so
/// operators can fix a bad file in a single pass.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut problems = Vec::new();

    if config.rate_limit.max_events == 0 {
        problems.push("rate_limit.max_events must be at least 1".to_string());
    }
    if config.rate_limit.window_ms == 0 {
        problems.push("rate_limit.window_ms must be at least 1".to_string());
    }
    if config.game.max_lives == 0 {
        problems.push("game.max_lives must be at least 1".to_string());
    }
    if config.game.countdown_ms < 0 {
        problems.push("game.countdown_ms must not be negative".to_string());
    }
    if config.game.boss_hp == 0 {
        problems.push("game.boss_hp must be at least 1".to_string());
    }
    if config.server.cleanup_interval_secs == 0 {
        problems.push("server.cleanup_interval_secs must be at least 1".to_string());
    }
    if config.packs_dir.trim().is_empty() {
        problems.push("packs_dir must not be empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn collects_multiple_problems() {
        let mut config = Config::default();
        config.rate_limit.max_events = 0;
        config.game.max_lives = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.contains("rate_limit.max_events"));
        assert!(err.contains("game.max_lives"));
    }
}
