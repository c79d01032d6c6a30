//! Portal login. The caller keeps the page; this only drives the form.

use super::NewHomeFeedConfig;
use crate::browser::BrowserPage;
use crate::sync_ops::SessionError;
use std::time::Duration;
use tracing::debug;

/// Log in on an already-open page. On success the page is sitting inside
/// the portal and becomes the session.
pub async fn login(
    page: &mut dyn BrowserPage,
    config: &NewHomeFeedConfig,
) -> Result<(), SessionError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    page.goto(&config.login_url, timeout).await?;
    page.type_text("#login-username", &config.username).await?;
    page.type_text("#login-password", &config.password).await?;
    page.click("#btn-login").await?;
    // The portal sometimes finishes login without a full navigation; the
    // URL check below is the real verdict.
    if let Err(e) = page.wait_for_navigation(timeout).await {
        debug!(error = %e, "no post-login navigation");
    }

    let url = page.current_url().await?;
    if url.contains("/login") {
        return Err(SessionError::LoginRejected);
    }
    Ok(())
}
