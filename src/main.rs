use anyhow::{Context, Result};
use pricesync::api::{ApiServer, AppState};
use pricesync::browser::webdriver::WebDriverEngine;
use pricesync::browser::BrowserEngine;
use pricesync::identity::{IdentityResolver, IdentityTables};
use pricesync::orchestrator::SyncOrchestrator;
use pricesync::store::Store;
use pricesync::sync_log::SyncLog;
use pricesync::sync_ops::anewgo::{AnewgoConfig, AnewgoPlatform};
use pricesync::sync_ops::homefiniti::{HomefinitiConfig, HomefinitiPlatform};
use pricesync::sync_ops::newhomefeed::{NewHomeFeedConfig, NewHomeFeedPlatform};
use pricesync::sync_ops::SyncPlatform;
use pricesync::util::env::env_opt;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    pricesync::env_boot::ensure_dotenv();
    pricesync::logging::init_tracing("info")?;

    // --- local database ------------------------------------------------------
    let db_path = env_opt("DB_PATH").unwrap_or_else(|| "db/pricing.db".to_string());
    if let Some(parent) = Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let conn = Connection::open(&db_path)
        .with_context(|| format!("failed to open sqlite database at {db_path}"))?;
    let conn = Arc::new(Mutex::new(conn));

    let log = SyncLog::new(conn.clone());
    let store = Store::new(conn);
    store.ensure_schema().await.context("store schema")?;
    log.ensure_schema().await.context("sync log schema")?;
    info!(path = %db_path, "database ready");

    // --- identity tables -----------------------------------------------------
    let tables = match env_opt("IDENTITY_TABLES_FILE") {
        Some(path) => {
            let tables = IdentityTables::from_json_file(&path)
                .with_context(|| format!("loading identity tables from {path}"))?;
            info!(path = %path, "identity tables loaded from file");
            tables
        }
        None => IdentityTables::builtin(),
    };
    let resolver = IdentityResolver::new(tables);

    // --- browser + platforms -------------------------------------------------
    let engine: Arc<dyn BrowserEngine> =
        Arc::new(WebDriverEngine::from_env().context("webdriver engine")?);

    let mut platforms: Vec<Arc<dyn SyncPlatform>> = Vec::new();

    match HomefinitiConfig::from_env() {
        Ok(config) => {
            let platform = HomefinitiPlatform::new(config, engine.clone(), resolver.clone())?;
            platforms.push(Arc::new(platform));
            info!("homefiniti platform enabled");
        }
        Err(err) => warn!(error = %err, "homefiniti platform disabled"),
    }

    match AnewgoConfig::from_env() {
        Ok(config) => {
            let platform = AnewgoPlatform::new(config, engine.clone(), resolver.clone())?;
            platforms.push(Arc::new(platform));
            info!("anewgo platform enabled");
        }
        Err(err) => warn!(error = %err, "anewgo platform disabled"),
    }

    match NewHomeFeedConfig::from_env() {
        Ok(config) => {
            let platform = NewHomeFeedPlatform::new(config, engine.clone(), resolver.clone());
            platforms.push(Arc::new(platform));
            info!("newhomefeed platform enabled");
        }
        Err(err) => warn!(error = %err, "newhomefeed platform disabled"),
    }

    if platforms.is_empty() {
        warn!("no sync platforms configured; price edits will stay local only");
    }

    // --- API server ----------------------------------------------------------
    let orchestrator = SyncOrchestrator::new(platforms, log.clone(), store.clone());
    let state = AppState {
        orchestrator,
        log,
        store,
        started: Instant::now(),
    };

    ApiServer::from_env()?.run(state).await
}
