//! Cookie harvest: scripted login whose only output is the cookie jar.

use super::HomefinitiConfig;
use crate::browser::{cookie_header, BrowserEngine, BrowserPage};
use crate::sync_ops::SessionError;
use std::time::Duration;
use tracing::{debug, warn};

/// Log in through a browser page and return the cookie jar as a `Cookie:`
/// header value. The page is closed on every exit path; the cookies are all
/// that survives.
pub async fn harvest_session_cookies(
    engine: &dyn BrowserEngine,
    config: &HomefinitiConfig,
) -> Result<String, SessionError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let mut page = engine.open().await?;

    let result = login(page.as_mut(), config, timeout).await;

    if let Err(e) = page.close().await {
        warn!(error = %e, "failed to close login page");
    }
    result
}

async fn login(
    page: &mut dyn BrowserPage,
    config: &HomefinitiConfig,
    timeout: Duration,
) -> Result<String, SessionError> {
    page.goto(&config.login_url(), timeout).await?;
    page.type_text("#email_id", &config.email).await?;
    page.type_text("#password_id", &config.password).await?;
    page.click("input[type=\"submit\"]").await?;
    page.wait_for_navigation(timeout).await?;

    // A rejected login redisplays the form instead of following ?next=.
    let url = page.current_url().await?;
    if url.contains("/login") {
        return Err(SessionError::LoginRejected);
    }

    let cookies = page.cookies().await?;
    debug!(count = cookies.len(), "harvested session cookies");
    Ok(cookie_header(&cookies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{FakeEngine, PageState};
    use crate::browser::Cookie;

    fn test_config() -> HomefinitiConfig {
        HomefinitiConfig {
            base_url: "https://app.homefiniti.test".to_string(),
            email: "ops@example.com".to_string(),
            password: "hunter2".to_string(),
            strict_verify: false,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn successful_login_yields_cookie_header() {
        let state = PageState::new();
        {
            let mut s = state.lock().unwrap();
            s.nav_queue
                .push_back("https://app.homefiniti.test/dashboard/".to_string());
            s.cookies = vec![
                Cookie {
                    name: "sessionid".into(),
                    value: "s1".into(),
                },
                Cookie {
                    name: "csrftoken".into(),
                    value: "c1".into(),
                },
            ];
        }
        let engine = FakeEngine::single(state.clone());

        let header = harvest_session_cookies(&engine, &test_config())
            .await
            .unwrap();
        assert_eq!(header, "sessionid=s1; csrftoken=c1");

        let s = state.lock().unwrap();
        assert!(s.closed);
        assert!(s.typed.iter().any(|(sel, _)| sel == "#email_id"));
        assert!(s.typed.iter().any(|(sel, _)| sel == "#password_id"));
    }

    #[tokio::test]
    async fn stuck_on_login_page_is_rejected_and_page_closed() {
        let state = PageState::new();
        // empty nav_queue: the wait leaves the page on the login url
        let engine = FakeEngine::single(state.clone());

        let err = harvest_session_cookies(&engine, &test_config())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::LoginRejected));
        assert!(state.lock().unwrap().closed);
    }
}
