#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::similar_names
)]

//! # Quiz Rush Server
//!
//! Authoritative realtime WebSocket server for a multi-round trivia party game.
//!
//! One host and up to thirty players connect to a room; the server owns all
//! game state, drives phase transitions on wall-clock timers, adjudicates
//! answers, computes scoring, and fans out state snapshots.

/// Static JSON question-pack catalogue
pub mod catalog;

/// Server configuration and environment variables
pub mod config;

/// Per-room game state machine: acts, questions, wagers, scoring, shop
pub mod game;

/// Structured logging configuration
pub mod logging;

/// WebSocket message protocol definitions
pub mod protocol;

/// Rate limiting implementation
pub mod rate_limit;

/// Process-wide room registry and reaper
pub mod registry;

/// Main server orchestration
pub mod server;

/// WebSocket connection handling
pub mod websocket;
