//! Scripted form edits against the portal's plan pages.

use super::{session, NewHomeFeedConfig};
use crate::browser::{BrowserEngine, BrowserPage};
use crate::identity::{ExternalId, IdentityResolver};
use crate::sync_ops::{
    PlanTarget, PlatformKind, PlatformSession, PriceUpdate, SessionError, SyncPlatform,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const PRICE_SELECTOR: &str = "#base_price";
const ERROR_BANNERS: &str = ".alert-danger, .error, [class*=\"error\"]";

fn looks_like_error(banner: &str) -> bool {
    let lower = banner.to_lowercase();
    lower.contains("error") || lower.contains("fail")
}

pub struct NewHomeFeedPlatform {
    config: NewHomeFeedConfig,
    engine: Arc<dyn BrowserEngine>,
    resolver: IdentityResolver,
}

impl NewHomeFeedPlatform {
    pub fn new(
        config: NewHomeFeedConfig,
        engine: Arc<dyn BrowserEngine>,
        resolver: IdentityResolver,
    ) -> Self {
        Self {
            config,
            engine,
            resolver,
        }
    }

    async fn try_update(
        &self,
        page: &mut dyn BrowserPage,
        target: &PlanTarget,
        new_price: i64,
    ) -> Result<PriceUpdate> {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let url = self.config.plan_url(target.external_id);
        page.goto(&url, timeout).await?;
        if let Err(e) = page.wait_for_navigation(timeout).await {
            warn!(url = %url, error = %e, "plan page load did not settle");
        }

        let old_raw = page.field_value(PRICE_SELECTOR).await?.unwrap_or_default();
        let old_price = old_raw.trim().parse::<i64>().ok();

        let typed = new_price.to_string();
        page.clear_field(PRICE_SELECTOR).await?;
        page.click(PRICE_SELECTOR).await?;
        page.type_text(PRICE_SELECTOR, &typed).await?;

        // The portal rewrites the field on some plans (formatting, caps);
        // anything but a literal echo means the value did not take.
        let shown = page.field_value(PRICE_SELECTOR).await?.unwrap_or_default();
        if shown != typed {
            bail!("price verification failed: set {typed} but field shows {shown}");
        }

        if !page.click_by_text("button", "save changes").await? {
            bail!("save button not found on plan page");
        }
        // Saving may be an in-page update rather than a navigation.
        if let Err(e) = page.wait_for_navigation(timeout).await {
            warn!(url = %url, error = %e, "no navigation after save");
        }

        let banner = page.banner_text(ERROR_BANNERS).await?;
        if looks_like_error(&banner) {
            bail!("save rejected: {banner}");
        }

        info!(
            plan = %target.display_name,
            plan_id = target.external_id,
            old_price = ?old_price,
            new_price,
            "updated plan base price"
        );
        Ok(PriceUpdate::ok(
            old_price,
            new_price,
            format!("updated {} to {new_price}", target.display_name),
        ))
    }
}

#[async_trait]
impl SyncPlatform for NewHomeFeedPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::NewHomeFeed
    }

    fn resolve_plan(&self, display_name: &str) -> Option<ExternalId> {
        self.resolver
            .resolve_plan(PlatformKind::NewHomeFeed, display_name)
    }

    async fn acquire_session(&self) -> Result<PlatformSession, SessionError> {
        let mut page = self.engine.open().await?;
        if let Err(e) = session::login(page.as_mut(), &self.config).await {
            if let Err(close_err) = page.close().await {
                warn!(error = %close_err, "failed to close page after login failure");
            }
            return Err(e);
        }
        Ok(PlatformSession::Page(page))
    }

    async fn update_plan_price(
        &self,
        session: &mut PlatformSession,
        target: &PlanTarget,
        new_price: i64,
    ) -> PriceUpdate {
        let PlatformSession::Page(page) = session else {
            return PriceUpdate::failed(new_price, "session is not a browser page");
        };
        match self.try_update(page.as_mut(), target, new_price).await {
            Ok(update) => update,
            Err(e) => {
                warn!(plan = %target.display_name, error = %format!("{e:#}"), "plan price update failed");
                PriceUpdate::failed(new_price, format!("{e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{FakeEngine, PageState};
    use crate::identity::{IdentityResolver, IdentityTables};

    fn test_config() -> NewHomeFeedConfig {
        NewHomeFeedConfig {
            login_url: "https://newhomefeed.test/login".to_string(),
            base_url: "https://my.newhomefeed.test".to_string(),
            username: "ops@example.com".to_string(),
            password: "hunter2".to_string(),
            timeout_secs: 5,
        }
    }

    fn platform(engine: FakeEngine) -> NewHomeFeedPlatform {
        NewHomeFeedPlatform::new(
            test_config(),
            Arc::new(engine),
            IdentityResolver::new(IdentityTables::builtin()),
        )
    }

    fn target() -> PlanTarget {
        PlanTarget {
            display_name: "Balboa".to_string(),
            external_id: 5069443,
        }
    }

    #[tokio::test]
    async fn updates_price_and_reads_old_value() {
        let state = PageState::new();
        {
            let mut s = state.lock().unwrap();
            s.nav_queue
                .push_back("https://my.newhomefeed.test/dashboard".to_string());
            s.fields
                .insert(PRICE_SELECTOR.to_string(), "724000".to_string());
        }
        let platform = platform(FakeEngine::single(state.clone()));

        let mut session = platform.acquire_session().await.unwrap();
        let update = platform
            .update_plan_price(&mut session, &target(), 730000)
            .await;
        platform.release_session(session).await;

        assert!(update.success, "{}", update.message);
        assert_eq!(update.old_price, Some(724000));
        assert_eq!(update.new_price, 730000);

        let s = state.lock().unwrap();
        assert!(s.closed);
        assert!(s
            .current_url
            .contains("/plans/5069443/general"));
        assert!(s.clicked.contains(&"button:save changes".to_string()));
    }

    #[tokio::test]
    async fn repeating_an_update_is_idempotent() {
        let state = PageState::new();
        {
            let mut s = state.lock().unwrap();
            s.nav_queue
                .push_back("https://my.newhomefeed.test/dashboard".to_string());
            s.fields
                .insert(PRICE_SELECTOR.to_string(), "724000".to_string());
        }
        let platform = platform(FakeEngine::single(state.clone()));

        let mut session = platform.acquire_session().await.unwrap();
        let first = platform
            .update_plan_price(&mut session, &target(), 730000)
            .await;
        let second = platform
            .update_plan_price(&mut session, &target(), 730000)
            .await;
        platform.release_session(session).await;

        assert!(first.success, "{}", first.message);
        assert!(second.success, "{}", second.message);
        // the second pass reads back what the first one wrote
        assert_eq!(first.old_price, Some(724000));
        assert_eq!(second.old_price, Some(730000));
        assert_eq!(
            state
                .lock()
                .unwrap()
                .fields
                .get(PRICE_SELECTOR)
                .map(|s| s.as_str()),
            Some("730000")
        );
    }

    #[tokio::test]
    async fn rewritten_field_fails_verification() {
        let state = PageState::new();
        {
            let mut s = state.lock().unwrap();
            s.nav_queue
                .push_back("https://my.newhomefeed.test/dashboard".to_string());
            s.locked_fields
                .insert(PRICE_SELECTOR.to_string(), "724000".to_string());
        }
        let platform = platform(FakeEngine::single(state.clone()));

        let mut session = platform.acquire_session().await.unwrap();
        let update = platform
            .update_plan_price(&mut session, &target(), 730000)
            .await;
        platform.release_session(session).await;

        assert!(!update.success);
        assert!(update.message.contains("verification failed"));
        // the save button was never clicked
        assert!(!state
            .lock()
            .unwrap()
            .clicked
            .contains(&"button:save changes".to_string()));
    }

    #[tokio::test]
    async fn error_banner_fails_the_update() {
        let state = PageState::new();
        {
            let mut s = state.lock().unwrap();
            s.nav_queue
                .push_back("https://my.newhomefeed.test/dashboard".to_string());
            s.banners = "Error: price out of range".to_string();
        }
        let platform = platform(FakeEngine::single(state.clone()));

        let mut session = platform.acquire_session().await.unwrap();
        let update = platform
            .update_plan_price(&mut session, &target(), 730000)
            .await;
        platform.release_session(session).await;

        assert!(!update.success);
        assert!(update.message.contains("save rejected"));
    }

    #[tokio::test]
    async fn missing_save_button_fails_the_update() {
        let state = PageState::new();
        {
            let mut s = state.lock().unwrap();
            s.nav_queue
                .push_back("https://my.newhomefeed.test/dashboard".to_string());
            s.save_button_present = false;
        }
        let platform = platform(FakeEngine::single(state.clone()));

        let mut session = platform.acquire_session().await.unwrap();
        let update = platform
            .update_plan_price(&mut session, &target(), 730000)
            .await;
        platform.release_session(session).await;

        assert!(!update.success);
        assert!(update.message.contains("save button"));
    }

    #[tokio::test]
    async fn rejected_login_closes_the_page() {
        let state = PageState::new();
        // nav queue empty: page never leaves /login
        let platform = platform(FakeEngine::single(state.clone()));

        let err = platform.acquire_session().await.unwrap_err();
        assert!(matches!(err, SessionError::LoginRejected));
        assert!(state.lock().unwrap().closed);
    }

    #[test]
    fn banner_matching_is_case_insensitive() {
        assert!(looks_like_error("ERROR: bad"));
        assert!(looks_like_error("save Failed"));
        assert!(!looks_like_error(""));
        assert!(!looks_like_error("Saved successfully"));
    }
}
