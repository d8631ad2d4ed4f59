#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use quiz_rush_server::catalog::Catalog;
use quiz_rush_server::config;
use quiz_rush_server::logging;
use quiz_rush_server::server::{GameServer, ServerConfig};
use quiz_rush_server::websocket;
use std::net::SocketAddr;
use std::sync::Arc;

/// Quiz Rush -- authoritative realtime server for a multi-round trivia party game
#[derive(Parser, Debug)]
#[command(name = "quiz-rush-server")]
#[command(about = "Authoritative realtime WebSocket server for a multi-round trivia party game")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines and pre-deployment checks.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    /// Useful for debugging configuration loading from multiple sources.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from config.json if present; otherwise use code defaults.
    let cfg = Arc::new(config::load());

    // Handle --print-config: output the loaded configuration as JSON
    if cli.print_config {
        let json = serde_json::to_string_pretty(&*cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    // config::load() already validates but only warns; capture the result here
    // to provide a proper exit code for --validate-config and hard failure on
    // normal startup.
    let validation_result = config::validate_config(&cfg);

    // Handle --validate-config: exit after validation
    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Port: {}", cfg.port);
                println!("  Packs directory: {}", cfg.packs_dir);
                println!("  Dev mode: {}", cfg.dev_mode);
                println!("  Max lives: {}", cfg.game.max_lives);
                println!("  Starting coins: {}", cfg.game.starting_coins);
                println!(
                    "  Rate limit: {} events / {} ms",
                    cfg.rate_limit.max_events, cfg.rate_limit.window_ms
                );
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    // In normal operation, propagate validation errors
    validation_result.map_err(|e| anyhow::anyhow!(e))?;

    // Initialize logging from config.
    logging::init_with_config(&cfg.logging);

    let port: u16 = cfg.port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "Starting Quiz Rush server");

    // Load question packs. An empty catalogue is allowed at boot; room
    // creation fails with a domain error until packs appear.
    let catalog = match Catalog::load_from_dir(&cfg.packs_dir) {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::warn!(error = %err, dir = %cfg.packs_dir, "Starting with no question packs");
            Catalog::empty()
        }
    };

    let game_server = GameServer::new(ServerConfig::from_config(&cfg), catalog);

    // Start the room reaper
    let cleanup_server = Arc::clone(&game_server);
    tokio::spawn(async move {
        cleanup_server.cleanup_task().await;
    });

    let app = websocket::create_router(&cfg.cors_origins).with_state(game_server);

    // Start the server over plain TCP (typically behind a reverse proxy).
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cfg.cors_origins,
        "Server started - WebSocket protocol: /ws, packs: /packs, LAN discovery: /lan-ip"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
