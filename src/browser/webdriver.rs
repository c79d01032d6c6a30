//! WebDriver adapter for the browser capability.
//!
//! Talks to an already-running WebDriver endpoint (chromedriver or
//! compatible) over its JSON wire protocol with `reqwest`. The driver and
//! the browser it manages are external processes; this adapter only opens
//! and drives sessions.
//!
//! Response capture is implemented by injecting a fetch/XHR hook at the
//! page and polling its buffer, since the plain WebDriver protocol cannot
//! observe network response bodies.

use super::{BrowserEngine, BrowserError, BrowserPage, CapturedResponse, Cookie};
use crate::util::env::{env_flag, env_opt};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Poll interval for navigation settles and capture drains.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct WebDriverEngine {
    http: Client,
    base_url: String,
    headless: bool,
}

impl WebDriverEngine {
    pub fn new(base_url: &str, headless: bool) -> Result<Self, BrowserError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            headless,
        })
    }

    /// Engine pointed at `WEBDRIVER_URL` (default chromedriver on 9515).
    pub fn from_env() -> Result<Self, BrowserError> {
        let base_url =
            env_opt("WEBDRIVER_URL").unwrap_or_else(|| "http://127.0.0.1:9515".to_string());
        Self::new(&base_url, env_flag("BROWSER_HEADLESS", true))
    }
}

#[async_trait]
impl BrowserEngine for WebDriverEngine {
    async fn open(&self) -> Result<Box<dyn BrowserPage>, BrowserError> {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--window-size=1400,900".to_string(),
            format!("--user-agent={}", USER_AGENT),
        ];
        if self.headless {
            args.push("--headless=new".to_string());
        }

        let caps = json!({
            "capabilities": {
                "alwaysMatch": {
                    "goog:chromeOptions": { "args": args }
                }
            }
        });

        let url = format!("{}/session", self.base_url);
        let resp: Value = self
            .http
            .post(&url)
            .json(&caps)
            .send()
            .await?
            .json()
            .await?;
        let session_id = resp
            .get("value")
            .and_then(|v| v.get("sessionId"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                BrowserError::Driver(format!("no sessionId in driver response: {resp}"))
            })?;

        Ok(Box::new(WebDriverPage {
            http: self.http.clone(),
            session_url: format!("{}/session/{}", self.base_url, session_id),
        }))
    }
}

struct WebDriverPage {
    http: Client,
    session_url: String,
}

impl WebDriverPage {
    async fn post(&self, path: &str, body: Value) -> Result<Value, BrowserError> {
        let url = format!("{}{}", self.session_url, path);
        let resp: Value = self.http.post(&url).json(&body).send().await?.json().await?;
        Self::unwrap_value(resp)
    }

    async fn get(&self, path: &str) -> Result<Value, BrowserError> {
        let url = format!("{}{}", self.session_url, path);
        let resp: Value = self.http.get(&url).send().await?.json().await?;
        Self::unwrap_value(resp)
    }

    fn unwrap_value(resp: Value) -> Result<Value, BrowserError> {
        let value = resp.get("value").cloned().unwrap_or(Value::Null);
        if let Some(err) = value.get("error").and_then(|e| e.as_str()) {
            let message = value
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("")
                .to_string();
            if err == "no such element" {
                return Err(BrowserError::ElementNotFound(message));
            }
            return Err(BrowserError::Driver(format!("{err}: {message}")));
        }
        Ok(value)
    }

    async fn find_element(&self, selector: &str) -> Result<String, BrowserError> {
        let value = self
            .post(
                "/element",
                json!({ "using": "css selector", "value": selector }),
            )
            .await
            .map_err(|e| match e {
                BrowserError::ElementNotFound(_) => {
                    BrowserError::ElementNotFound(selector.to_string())
                }
                other => other,
            })?;
        value
            .get(ELEMENT_KEY)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))
    }

    async fn execute(&self, script: &str, args: Value) -> Result<Value, BrowserError> {
        self.post("/execute/sync", json!({ "script": script, "args": args }))
            .await
    }
}

#[async_trait]
impl BrowserPage for WebDriverPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        // Honor the caller's bound through the driver's own page-load timeout.
        self.post(
            "/timeouts",
            json!({ "pageLoad": timeout.as_millis() as u64 }),
        )
        .await?;
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        let value = self.get("/url").await?;
        value
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| BrowserError::Driver("current url was not a string".to_string()))
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<(), BrowserError> {
        let el = self.find_element(selector).await?;
        self.post(&format!("/element/{el}/value"), json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn clear_field(&mut self, selector: &str) -> Result<(), BrowserError> {
        let el = self.find_element(selector).await?;
        self.post(&format!("/element/{el}/clear"), json!({})).await?;
        Ok(())
    }

    async fn field_value(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        let value = self
            .execute(
                "var el = document.querySelector(arguments[0]); \
                 return el ? String(el.value) : null;",
                json!([selector]),
            )
            .await?;
        Ok(value.as_str().map(|s| s.to_string()))
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        let el = self.find_element(selector).await?;
        self.post(&format!("/element/{el}/click"), json!({})).await?;
        Ok(())
    }

    async fn click_by_text(&mut self, tag: &str, pattern: &str) -> Result<bool, BrowserError> {
        let value = self
            .execute(
                "var re = new RegExp(arguments[1], 'i'); \
                 var els = Array.from(document.querySelectorAll(arguments[0])); \
                 var hit = els.find(function(e) { return re.test(e.textContent); }); \
                 if (hit) { hit.click(); return true; } return false;",
                json!([tag, pattern]),
            )
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn wait_for_navigation(&mut self, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            // Execute may fail transiently while the document is swapping.
            let ready = match self.execute("return document.readyState;", json!([])).await {
                Ok(v) => v.as_str() == Some("complete"),
                Err(BrowserError::Transport(e)) => return Err(BrowserError::Transport(e)),
                Err(_) => false,
            };
            if ready {
                // Settle delay for post-load scripts, mirroring networkidle-style waits.
                tokio::time::sleep(Duration::from_millis(500)).await;
                return Ok(());
            }
            if Instant::now() >= deadline {
                let url = self.current_url().await.unwrap_or_default();
                return Err(BrowserError::NavigationTimeout { url, timeout });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>, BrowserError> {
        let value = self.get("/cookie").await?;
        let mut out = Vec::new();
        if let Some(items) = value.as_array() {
            for item in items {
                if let (Some(name), Some(value)) = (
                    item.get("name").and_then(|v| v.as_str()),
                    item.get("value").and_then(|v| v.as_str()),
                ) {
                    out.push(Cookie {
                        name: name.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(out)
    }

    async fn install_response_capture(
        &mut self,
        url_fragment: &str,
    ) -> Result<(), BrowserError> {
        self.execute(
            "if (!window.__pricesync_hooked) { \
               window.__pricesync_hooked = true; \
               window.__pricesync_captured = []; \
               var frag = arguments[0]; \
               var push = function(url, body) { \
                 if (url && url.indexOf(frag) !== -1) { \
                   window.__pricesync_captured.push({ url: url, body: body }); \
                 } \
               }; \
               var origFetch = window.fetch; \
               window.fetch = function() { \
                 return origFetch.apply(this, arguments).then(function(resp) { \
                   try { resp.clone().text().then(function(t) { push(resp.url, t); }); } \
                   catch (e) {} \
                   return resp; \
                 }); \
               }; \
               var origSend = XMLHttpRequest.prototype.send; \
               XMLHttpRequest.prototype.send = function() { \
                 this.addEventListener('load', function() { \
                   try { push(this.responseURL, this.responseText); } catch (e) {} \
                 }); \
                 return origSend.apply(this, arguments); \
               }; \
             }",
            json!([url_fragment]),
        )
        .await?;
        Ok(())
    }

    async fn captured_responses(&mut self) -> Result<Vec<CapturedResponse>, BrowserError> {
        let value = self
            .execute(
                "var out = window.__pricesync_captured || []; \
                 window.__pricesync_captured = []; \
                 return out;",
                json!([]),
            )
            .await?;
        let mut out = Vec::new();
        if let Some(items) = value.as_array() {
            for item in items {
                if let (Some(url), Some(body)) = (
                    item.get("url").and_then(|v| v.as_str()),
                    item.get("body").and_then(|v| v.as_str()),
                ) {
                    out.push(CapturedResponse {
                        url: url.to_string(),
                        body: body.to_string(),
                    });
                }
            }
        }
        Ok(out)
    }

    async fn banner_text(&mut self, selectors: &str) -> Result<String, BrowserError> {
        let value = self
            .execute(
                "return Array.from(document.querySelectorAll(arguments[0])) \
                   .map(function(e) { return e.textContent.trim(); }) \
                   .filter(Boolean).join('; ');",
                json!([selectors]),
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        let url = self.session_url.clone();
        self.http.delete(&url).send().await?;
        Ok(())
    }
}
