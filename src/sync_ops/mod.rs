//! Per-platform sync capability: identity resolution, session acquisition,
//! and read-modify-write price updates against each external system's
//! native protocol.
//!
//! The three platforms share one `SyncPlatform` interface so the
//! orchestrator is written once; the variants differ in how they
//! authenticate (cookie harvest, token capture, live page) and in their
//! update protocol (form resubmission, GraphQL mutation, scripted DOM edit).

pub mod anewgo;
pub mod homefiniti;
pub mod newhomefeed;

use crate::browser::{BrowserError, BrowserPage};
use crate::identity::ExternalId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The three external marketing platforms this console mirrors prices to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    /// Permit/dashboard CRM: cookie session + full-form resubmission.
    Homefiniti,
    /// Inventory-syndication GraphQL gateway: bearer token mutations.
    Anewgo,
    /// Listing-feed portal: scripted DOM form edit.
    NewHomeFeed,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 3] = [
        PlatformKind::Homefiniti,
        PlatformKind::Anewgo,
        PlatformKind::NewHomeFeed,
    ];

    /// URL-safe identifier used in routes and table names.
    pub fn slug(self) -> &'static str {
        match self {
            PlatformKind::Homefiniti => "homefiniti",
            PlatformKind::Anewgo => "anewgo",
            PlatformKind::NewHomeFeed => "newhomefeed",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "homefiniti" => Some(PlatformKind::Homefiniti),
            "anewgo" => Some(PlatformKind::Anewgo),
            // the listing feed predates the rename in a few saved dashboards
            "newhomefeed" | "zillow" => Some(PlatformKind::NewHomeFeed),
            _ => None,
        }
    }

    /// Human label used in log lines and messages.
    pub fn label(self) -> &'static str {
        match self {
            PlatformKind::Homefiniti => "Homefiniti",
            PlatformKind::Anewgo => "ANewGo",
            PlatformKind::NewHomeFeed => "NewHomeFeed",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Outcome of one price update against one platform. Update clients never
/// return `Err` across this boundary: every failure category collapses to
/// `success: false` with a message, so batches continue past individual
/// failures.
#[derive(Debug, Clone, Serialize)]
pub struct PriceUpdate {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<i64>,
    pub new_price: i64,
    pub message: String,
}

impl PriceUpdate {
    pub fn ok(old_price: Option<i64>, new_price: i64, message: impl Into<String>) -> Self {
        Self {
            success: true,
            old_price,
            new_price,
            message: message.into(),
        }
    }

    pub fn failed(new_price: i64, message: impl Into<String>) -> Self {
        Self {
            success: false,
            old_price: None,
            new_price,
            message: message.into(),
        }
    }
}

/// Session acquisition failures are fatal for the whole batch using the
/// session; the orchestrator reports them against every pending attempt.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("login rejected: still on the login page after submit")]
    LoginRejected,
    #[error("failed to capture auth token within {0:?}")]
    TokenCapture(Duration),
    #[error("browser: {0}")]
    Browser(#[from] BrowserError),
}

/// Opaque credential bundle for one platform. Owned exclusively by the
/// batch that acquired it; never shared across platforms. Lifetime is the
/// external platform's own session window, so it is never persisted.
pub enum PlatformSession {
    /// Harvested cookie jar, replayed as a `Cookie:` header.
    Cookies(String),
    /// Captured bearer token.
    Bearer(String),
    /// Live authenticated browser page (the listing portal has no
    /// cookie-replay path; its protocol is the page itself).
    Page(Box<dyn BrowserPage>),
}

impl fmt::Debug for PlatformSession {
    // Credentials never hit logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformSession::Cookies(_) => f.write_str("PlatformSession::Cookies(..)"),
            PlatformSession::Bearer(_) => f.write_str("PlatformSession::Bearer(..)"),
            PlatformSession::Page(_) => f.write_str("PlatformSession::Page(..)"),
        }
    }
}

/// Cap a response body quoted into an error message, cutting on a char
/// boundary.
pub(crate) fn truncate_for_log(body: &str) -> &str {
    match body.char_indices().nth(300) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// A plan already resolved into a platform's id space. The display name
/// rides along for log lines and for clients that cross-check the remote
/// entity's name before writing.
#[derive(Debug, Clone)]
pub struct PlanTarget {
    pub display_name: String,
    pub external_id: ExternalId,
}

/// One external platform's full sync capability.
#[async_trait]
pub trait SyncPlatform: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Map a plan display name into this platform's id space.
    /// `None` means "not mapped" — the platform is skipped, silently.
    fn resolve_plan(&self, display_name: &str) -> Option<ExternalId>;

    /// Map a (community, lot number) pair. Only the inventory-syndication
    /// platform carries lot identities.
    fn resolve_lot(&self, _community: &str, _lot_number: &str) -> Option<ExternalId> {
        None
    }

    async fn acquire_session(&self) -> Result<PlatformSession, SessionError>;

    /// Release a session at batch end. Pages are closed; cookie and token
    /// sessions simply expire server-side.
    async fn release_session(&self, session: PlatformSession) {
        if let PlatformSession::Page(page) = session {
            if let Err(e) = page.close().await {
                tracing::warn!(platform = %self.kind(), error = %e, "failed to close browser page");
            }
        }
    }

    /// Read-modify-write one plan price. Idempotent: re-running with the
    /// same target price is safe.
    async fn update_plan_price(
        &self,
        session: &mut PlatformSession,
        target: &PlanTarget,
        new_price: i64,
    ) -> PriceUpdate;

    async fn update_lot_premium(
        &self,
        _session: &mut PlatformSession,
        _lot_id: ExternalId,
        new_premium: i64,
    ) -> PriceUpdate {
        PriceUpdate::failed(
            new_premium,
            format!("{} does not carry lot premiums", self.kind().label()),
        )
    }

    async fn update_inventory_price(
        &self,
        _session: &mut PlatformSession,
        _community: &str,
        _lot_number: &str,
        new_price: i64,
    ) -> PriceUpdate {
        PriceUpdate::failed(
            new_price,
            format!("{} does not carry built inventory", self.kind().label()),
        )
    }
}
