//! Token capture: log in through the dashboard SPA and lift the JWT from
//! the gateway's authenticate response.

use super::AnewgoConfig;
use crate::browser::{BrowserEngine, BrowserPage};
use crate::sync_ops::SessionError;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const CAPTURE_POLL: Duration = Duration::from_millis(500);

/// Extract the JWT from a gateway response body, if this is the
/// authenticate response.
pub(crate) fn token_from_body(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("data")?
        .get("authenticate")?
        .as_str()
        .map(|s| s.to_string())
}

pub async fn capture_auth_token(
    engine: &dyn BrowserEngine,
    config: &AnewgoConfig,
) -> Result<String, SessionError> {
    let mut page = engine.open().await?;

    let result = login_and_capture(page.as_mut(), config).await;

    if let Err(e) = page.close().await {
        warn!(error = %e, "failed to close login page");
    }
    result
}

async fn login_and_capture(
    page: &mut dyn BrowserPage,
    config: &AnewgoConfig,
) -> Result<String, SessionError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    page.goto(&config.login_url, timeout).await?;
    page.wait_for_navigation(timeout).await?;

    // Hook must be in place before the submit fires the auth call.
    page.install_response_capture("graphql_gateway").await?;

    page.type_text("#userEmail", &config.email).await?;
    page.type_text("#password", &config.password).await?;
    page.click("button[type=\"submit\"]").await?;
    // The SPA may or may not navigate after login; the token arrives over
    // the wire either way, so a failed wait is not a failed login.
    if let Err(e) = page.wait_for_navigation(timeout).await {
        debug!(error = %e, "no post-login navigation");
    }

    let window = Duration::from_secs(config.capture_window_secs);
    let deadline = Instant::now() + window;
    loop {
        for resp in page.captured_responses().await? {
            if let Some(token) = token_from_body(&resp.body) {
                debug!(url = %resp.url, "captured auth token");
                return Ok(token);
            }
        }
        if Instant::now() >= deadline {
            return Err(SessionError::TokenCapture(window));
        }
        tokio::time::sleep(CAPTURE_POLL).await;
    }
}
