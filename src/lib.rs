pub mod api;
pub mod browser;
pub mod env_boot;
pub mod identity;
pub mod logging;
pub mod normalization;
pub mod orchestrator;
pub mod store;
pub mod sync_log;
pub mod sync_ops;

pub mod util {
    pub mod env;
}

pub use api::{ApiServer, AppState};
pub use orchestrator::SyncOrchestrator;
