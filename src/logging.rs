//! Structured logging initialization.
//!
//! Console output always; an optional rolling file appender on top. The
//! filter precedence is config level, then RUST_LOG, then "info".

use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::{fmt::time::UtcTime, prelude::*, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, LoggingConfig};

pub fn init_with_config(cfg: &LoggingConfig) {
    let env_filter = cfg.level.as_ref().map_or_else(
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        |level| EnvFilter::new(level.as_str()),
    );

    let stdout_layer = match cfg.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(std::io::stdout)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_timer(UtcTime::rfc_3339())
            .with_writer(std::io::stdout)
            .boxed(),
    };

    let file_layer = cfg
        .enable_file_logging
        .then(|| build_file_writer(cfg))
        .flatten()
        .map(|writer| match cfg.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(writer)
                .boxed(),
            LogFormat::Text => tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(writer)
                .boxed(),
        });

    let _ = Registry::default()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();
}

fn build_file_writer(cfg: &LoggingConfig) -> Option<NonBlocking> {
    let rotation = match cfg.rotation.to_lowercase().as_str() {
        "hourly" => tracing_appender::rolling::Rotation::HOURLY,
        "never" => tracing_appender::rolling::Rotation::NEVER,
        _ => tracing_appender::rolling::Rotation::DAILY,
    };

    if std::fs::create_dir_all(&cfg.dir).is_err() {
        eprintln!(
            "Failed to create log directory '{}', continuing with stdout logs",
            cfg.dir
        );
        return None;
    }

    let appender =
        tracing_appender::rolling::RollingFileAppender::new(rotation, &cfg.dir, &cfg.filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    // Keep guard alive for process lifetime
    let _leaked: &'static _ = Box::leak(Box::new(guard));

    Some(non_blocking)
}
