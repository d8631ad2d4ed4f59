// WebSocket transport: upgrade handling, per-connection pumps, side endpoints

mod connection;
pub mod handler;
pub mod routes;

pub use routes::create_router;
