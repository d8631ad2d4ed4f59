//! Configuration loading and environment parsing.

use super::validation::validate_config;
use super::Config;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load configuration with the following precedence (highest first):
/// 1) `QUIZ_RUSH_CONFIG_JSON` env var containing raw JSON
/// 2) File pointed by `QUIZ_RUSH_CONFIG_PATH` env var
/// 3) config.json in current working directory
/// 4) Defaults compiled into the binary
///
/// Additionally, individual fields can be overridden by environment variables
/// with prefix `QUIZ_RUSH` using "__" as a nested separator, e.g.
/// `QUIZ_RUSH__PORT=8080` or `QUIZ_RUSH__LOGGING__LEVEL=debug`.
/// Any errors while reading/parsing are printed to stderr and defaults are used.
///
/// **Note:** Validation errors from [`validate_config`] are logged to stderr
/// but are *not* propagated — `load()` always returns a `Config`. Callers who
/// need hard failure should call `validate_config()` on the returned config
/// and handle the error themselves.
#[must_use]
pub fn load() -> Config {
    use std::env;
    use std::path::PathBuf;

    let defaults = Config::default();
    let mut merged =
        serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    // 1) Inline JSON via env var
    if let Ok(json) = env::var("QUIZ_RUSH_CONFIG_JSON") {
        if let Some(value) = parse_json_document(&json, "QUIZ_RUSH_CONFIG_JSON") {
            merge_values(&mut merged, value);
        }
    }

    // 2) Explicit path via env var
    if let Ok(path) = env::var("QUIZ_RUSH_CONFIG_PATH") {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }

    // 3) config.json in CWD
    merge_file_source(&mut merged, &PathBuf::from("config.json"));

    // Environment overrides with prefix QUIZ_RUSH and nested separator __
    apply_env_overrides(&mut merged);

    let config = match serde_json::from_value::<Config>(merged) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to deserialize config; using defaults: {e}");
            defaults
        }
    };

    // Intentional warn-only behaviour; main.rs calls validate_config() again
    // and propagates errors properly.
    if let Err(e) = validate_config(&config) {
        eprintln!("Configuration validation error: {e}");
    }

    config
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Failed to parse config from {label}: {err}");
            None
        }
    }
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }

    match fs::read_to_string(path) {
        Ok(contents) => {
            if let Some(value) = parse_json_document(&contents, &format!("file {}", path.display()))
            {
                merge_values(target, value);
            }
        }
        Err(err) => {
            eprintln!("Failed to read config from {}: {}", path.display(), err);
        }
    }
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, source_value) => {
            *target_slot = source_value;
        }
    }
}

fn apply_env_overrides(root: &mut Value) {
    for (key, raw_value) in std::env::vars() {
        let Some(stripped) = key.strip_prefix("QUIZ_RUSH__") else {
            continue;
        };

        let segments: Vec<String> = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();

        if segments.is_empty() {
            continue;
        }

        let value = parse_scalar(raw_value.trim());
        set_nested_value(root, &segments, value);
    }
}

fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }

    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn set_nested_value(target: &mut Value, segments: &[String], value: Value) {
    match segments {
        [] => *target = value,
        [leaf] => {
            ensure_object(target).insert(leaf.clone(), value);
        }
        [head, rest @ ..] => {
            let entry = ensure_object(target)
                .entry(head.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            set_nested_value(entry, rest, value);
        }
    }
}

fn ensure_object(value: &mut Value) -> &mut serde_json::Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(serde_json::Map::new());
    }

    // SAFETY: The branch above guarantees `value` is a `Value::Object`, so
    // `as_object_mut()` will always return `Some`.
    #[allow(clippy::expect_used)]
    value
        .as_object_mut()
        .expect("value should be coerced into an object")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_source_leaves() {
        let mut target = serde_json::json!({"port": 3560, "game": {"max_lives": 3}});
        merge_values(
            &mut target,
            serde_json::json!({"game": {"max_lives": 5}, "dev_mode": true}),
        );
        assert_eq!(target["port"], 3560);
        assert_eq!(target["game"]["max_lives"], 5);
        assert_eq!(target["dev_mode"], true);
    }

    #[test]
    fn nested_override_builds_missing_objects() {
        let mut root = Value::Object(serde_json::Map::new());
        set_nested_value(
            &mut root,
            &["logging".to_string(), "level".to_string()],
            Value::String("debug".to_string()),
        );
        assert_eq!(root["logging"]["level"], "debug");
    }

    #[test]
    fn scalar_parsing_keeps_strings() {
        assert_eq!(parse_scalar("8080"), Value::from(8080));
        assert_eq!(parse_scalar("true"), Value::from(true));
        assert_eq!(parse_scalar("daily"), Value::from("daily"));
    }
}
