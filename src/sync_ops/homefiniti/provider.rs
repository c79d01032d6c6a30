//! Plan price updates via full-form resubmission.
//!
//! The dashboard's edit endpoint is a classic server-rendered form: every
//! field omitted from a POST is cleared on the remote record. So an update
//! is scrape-the-whole-form, overwrite one price field, send everything
//! back. Field order is preserved on resubmission.

use super::{session, HomefinitiConfig};
use crate::browser::BrowserEngine;
use crate::identity::{ExternalId, IdentityResolver};
use crate::normalization::normalize_plan_name;
use crate::sync_ops::{
    truncate_for_log, PlanTarget, PlatformKind, PlatformSession, PriceUpdate, SessionError,
    SyncPlatform,
};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use reqwest::Client;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{info, warn};

// Django renders attribute order both ways depending on the widget.
static INPUT_NAME_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input[^>]*name="([^"]*)"[^>]*value="([^"]*)""#).unwrap()
});
static INPUT_VALUE_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input[^>]*value="([^"]*)"[^>]*name="([^"]*)""#).unwrap()
});
static TEXTAREA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<textarea[^>]*name="([^"]*)"[^>]*>(.*?)</textarea>"#).unwrap()
});
static SELECT_SELECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<select[^>]*name="([^"]*)"[^>]*>.*?<option[^>]*value="([^"]*)"[^>]*selected"#,
    )
    .unwrap()
});

const PRICE_FIELD: &str = "base_price";
const NAME_FIELD: &str = "name";

/// One scraped edit form: the CSRF token plus every field in document order.
#[derive(Debug, Clone)]
pub(crate) struct PlanForm {
    pub csrf_token: String,
    pub fields: IndexMap<String, String>,
}

impl PlanForm {
    pub fn price(&self) -> Option<i64> {
        self.fields.get(PRICE_FIELD)?.trim().parse().ok()
    }

    pub fn plan_name(&self) -> Option<&str> {
        self.fields.get(NAME_FIELD).map(|s| s.as_str())
    }
}

/// Parse a server-rendered plan edit page into its field set. Name-first
/// matches win over value-first so a field is never captured twice.
pub(crate) fn scrape_plan_form(html: &str) -> Result<PlanForm> {
    let mut fields: IndexMap<String, String> = IndexMap::new();

    for caps in INPUT_NAME_FIRST.captures_iter(html) {
        fields
            .entry(caps[1].to_string())
            .or_insert_with(|| caps[2].to_string());
    }
    for caps in INPUT_VALUE_FIRST.captures_iter(html) {
        fields
            .entry(caps[2].to_string())
            .or_insert_with(|| caps[1].to_string());
    }
    for caps in TEXTAREA.captures_iter(html) {
        fields
            .entry(caps[1].to_string())
            .or_insert_with(|| caps[2].trim().to_string());
    }
    for caps in SELECT_SELECTED.captures_iter(html) {
        fields
            .entry(caps[1].to_string())
            .or_insert_with(|| caps[2].to_string());
    }

    let csrf_token = fields
        .shift_remove("csrfmiddlewaretoken")
        .context("edit form had no csrfmiddlewaretoken; page is likely a login redirect")?;

    Ok(PlanForm { csrf_token, fields })
}

/// Request body for the resubmission: the CSRF token first, every scraped
/// field in order with the price overwritten, then the save action.
pub(crate) fn build_submit_body(
    form: &PlanForm,
    new_price: i64,
) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(form.fields.len() + 2);
    pairs.push(("csrfmiddlewaretoken".to_string(), form.csrf_token.clone()));
    for (name, value) in &form.fields {
        if name == PRICE_FIELD {
            pairs.push((name.clone(), new_price.to_string()));
        } else {
            pairs.push((name.clone(), value.clone()));
        }
    }
    pairs.push(("form_save".to_string(), "Save".to_string()));
    pairs
}

pub struct HomefinitiPlatform {
    config: HomefinitiConfig,
    engine: Arc<dyn BrowserEngine>,
    resolver: IdentityResolver,
    http: Client,
}

impl HomefinitiPlatform {
    pub fn new(
        config: HomefinitiConfig,
        engine: Arc<dyn BrowserEngine>,
        resolver: IdentityResolver,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self {
            config,
            engine,
            resolver,
            http,
        })
    }

    async fn fetch_form(&self, cookies: &str, plan_id: ExternalId) -> Result<PlanForm> {
        let url = self.config.plan_form_url(plan_id);
        let resp = self
            .http
            .get(&url)
            .header("Cookie", cookies)
            .send()
            .await
            .with_context(|| format!("fetching plan form {url}"))?;
        let status = resp.status();
        let body = resp.text().await.context("reading plan form body")?;
        if !status.is_success() {
            bail!(
                "plan form fetch returned {status}: {}",
                truncate_for_log(&body)
            );
        }
        scrape_plan_form(&body)
    }

    async fn try_update(
        &self,
        cookies: &str,
        target: &PlanTarget,
        new_price: i64,
    ) -> Result<PriceUpdate> {
        let form = self.fetch_form(cookies, target.external_id).await?;

        // Guard against a stale id mapping writing into the wrong plan.
        if let Some(remote_name) = form.plan_name() {
            if normalize_plan_name(remote_name) != normalize_plan_name(&target.display_name) {
                bail!(
                    "remote plan name {remote_name:?} does not match target {:?}; refusing to write",
                    target.display_name
                );
            }
        }

        let old_price = form.price();
        let form_url = self.config.plan_form_url(target.external_id);
        let body = build_submit_body(&form, new_price);

        let resp = self
            .http
            .post(&form_url)
            .header("Cookie", cookies)
            .header("Referer", &form_url)
            .form(&body)
            .send()
            .await
            .context("submitting plan form")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!(
                "plan form submit returned {status}: {}",
                truncate_for_log(&text)
            );
        }

        // Read back what the server actually stored.
        match self.fetch_form(cookies, target.external_id).await {
            Ok(after) => {
                let stored = after.price();
                if stored != Some(new_price) {
                    if self.config.strict_verify {
                        bail!(
                            "verification failed: submitted {new_price} but server shows {stored:?}"
                        );
                    }
                    warn!(
                        plan = %target.display_name,
                        submitted = new_price,
                        stored = ?stored,
                        "price read-back does not match submitted value"
                    );
                }
            }
            Err(e) => {
                if self.config.strict_verify {
                    return Err(e.context("verification re-fetch failed"));
                }
                warn!(plan = %target.display_name, error = %format!("{e:#}"), "verification re-fetch failed");
            }
        }

        info!(
            plan = %target.display_name,
            plan_id = target.external_id,
            old_price = ?old_price,
            new_price,
            "updated plan price"
        );
        Ok(PriceUpdate::ok(
            old_price,
            new_price,
            format!("updated {} to {new_price}", target.display_name),
        ))
    }
}

#[async_trait]
impl SyncPlatform for HomefinitiPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Homefiniti
    }

    fn resolve_plan(&self, display_name: &str) -> Option<ExternalId> {
        self.resolver.resolve_plan(PlatformKind::Homefiniti, display_name)
    }

    async fn acquire_session(&self) -> Result<PlatformSession, SessionError> {
        let cookies = session::harvest_session_cookies(self.engine.as_ref(), &self.config).await?;
        Ok(PlatformSession::Cookies(cookies))
    }

    async fn update_plan_price(
        &self,
        session: &mut PlatformSession,
        target: &PlanTarget,
        new_price: i64,
    ) -> PriceUpdate {
        let PlatformSession::Cookies(cookies) = session else {
            return PriceUpdate::failed(new_price, "session is not a cookie session");
        };
        let cookies = cookies.clone();
        match self.try_update(&cookies, target, new_price).await {
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

    const FORM_HTML: &str = r#"
        <form method="post" action=".">
            <input type="hidden" name="csrfmiddlewaretoken" value="tok123">
            <input type="text" name="name" value="The Balboa">
            <input value="724000" type="number" name="base_price">
            <input type="text" name="sqft" value="2450">
            <textarea name="description">
                Single story with optional loft.
            </textarea>
            <select name="status">
                <option value="draft">Draft</option>
                <option value="active" selected>Active</option>
            </select>
        </form>
    "#;

    #[test]
    fn scrapes_every_widget_kind() {
        let form = scrape_plan_form(FORM_HTML).unwrap();
        assert_eq!(form.csrf_token, "tok123");
        assert_eq!(form.fields.get("name").map(|s| s.as_str()), Some("The Balboa"));
        assert_eq!(form.price(), Some(724000));
        assert_eq!(form.fields.get("sqft").map(|s| s.as_str()), Some("2450"));
        assert_eq!(
            form.fields.get("description").map(|s| s.as_str()),
            Some("Single story with optional loft.")
        );
        assert_eq!(form.fields.get("status").map(|s| s.as_str()), Some("active"));
        assert!(!form.fields.contains_key("csrfmiddlewaretoken"));
    }

    #[test]
    fn missing_csrf_token_is_an_error() {
        let err = scrape_plan_form(r#"<input name="name" value="x">"#).unwrap_err();
        assert!(err.to_string().contains("csrfmiddlewaretoken"));
    }

    #[test]
    fn submit_body_overwrites_only_the_price() {
        let form = scrape_plan_form(FORM_HTML).unwrap();
        let body = build_submit_body(&form, 730000);

        assert_eq!(body[0], ("csrfmiddlewaretoken".into(), "tok123".into()));
        assert_eq!(
            body.last().cloned(),
            Some(("form_save".into(), "Save".into()))
        );
        let price = body.iter().find(|(k, _)| k == "base_price").unwrap();
        assert_eq!(price.1, "730000");
        let name = body.iter().find(|(k, _)| k == "name").unwrap();
        assert_eq!(name.1, "The Balboa");
        // token appears exactly once
        assert_eq!(
            body.iter().filter(|(k, _)| k == "csrfmiddlewaretoken").count(),
            1
        );
    }

    #[test]
    fn scrape_keeps_first_match_per_field() {
        // the value-first pattern would re-capture name-first inputs
        let html = r#"
            <input name="csrfmiddlewaretoken" value="t">
            <input name="base_price" value="100">
        "#;
        let form = scrape_plan_form(html).unwrap();
        assert_eq!(form.price(), Some(100));
        assert_eq!(form.fields.len(), 1);
    }
}
