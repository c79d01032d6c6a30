// HTTP API for the pricing console: local price edits, sync triggers, and
// sync status reads.

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::ApiServer;
