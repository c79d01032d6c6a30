//! Browser-automation capability consumed by the session providers and the
//! scripted-DOM update client.
//!
//! The engine itself (driver + browser process) is an external collaborator;
//! this module only defines the contract the sync core needs plus a thin
//! WebDriver adapter. Every wait carries an explicit upper bound: the
//! decisive failure mode to avoid is a sync attempt that never resolves
//! because an external page never reaches the expected state.

pub mod webdriver;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("navigation did not settle within {timeout:?} (last url: {url})")]
    NavigationTimeout { url: String, timeout: Duration },
    #[error("element not found: {0}")]
    ElementNotFound(String),
    #[error("driver error: {0}")]
    Driver(String),
    #[error("driver transport: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A single cookie harvested from an authenticated page.
#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// Join cookies into a `Cookie:` header value for plain HTTP replay.
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A network response observed during a login flow.
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    pub url: String,
    pub body: String,
}

/// Launches one browser page per call. Implementations own the underlying
/// browser process lifecycle.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserPage>, BrowserError>;
}

/// One live page. All waits take explicit timeouts. Callers must invoke
/// `close` on every exit path; session providers structure their flows so
/// the page is closed whether login succeeds, fails, or times out.
#[async_trait]
pub trait BrowserPage: Send {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Type into the element matching a CSS selector (appends, like a user).
    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), BrowserError>;

    async fn clear_field(&mut self, selector: &str) -> Result<(), BrowserError>;

    /// Current value of an input element; `None` when the element is absent.
    async fn field_value(&mut self, selector: &str) -> Result<Option<String>, BrowserError>;

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError>;

    /// Click the first element of `tag` whose text matches the
    /// case-insensitive pattern; returns whether anything was clicked.
    async fn click_by_text(&mut self, tag: &str, pattern: &str) -> Result<bool, BrowserError>;

    async fn wait_for_navigation(&mut self, timeout: Duration) -> Result<(), BrowserError>;

    async fn cookies(&mut self) -> Result<Vec<Cookie>, BrowserError>;

    /// Start observing responses whose URL contains the given fragment.
    async fn install_response_capture(&mut self, url_fragment: &str)
        -> Result<(), BrowserError>;

    /// Drain responses observed since the last call.
    async fn captured_responses(&mut self) -> Result<Vec<CapturedResponse>, BrowserError>;

    /// Concatenated text of elements matching the (comma-separated) selector
    /// list; empty string when nothing matches.
    async fn banner_text(&mut self, selectors: &str) -> Result<String, BrowserError>;

    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}
