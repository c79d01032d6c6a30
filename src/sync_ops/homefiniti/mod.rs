//! Homefiniti: the permit/dashboard CRM.
//!
//! Authentication is a scripted browser login whose cookie jar is harvested
//! for plain HTTP replay; updates are full-form resubmissions against the
//! plan edit page (the platform treats missing fields as "clear this
//! field", so every scraped field goes back verbatim).

pub mod provider;
pub mod session;

pub use provider::HomefinitiPlatform;

use crate::util::env::{env_flag, env_opt, env_parse, env_req};
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct HomefinitiConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    /// When set, a post-write read-back mismatch fails the attempt instead
    /// of logging a warning.
    pub strict_verify: bool,
    pub timeout_secs: u64,
}

impl HomefinitiConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: env_opt("HOMEFINITI_URL")
                .unwrap_or_else(|| "https://app.homefiniti.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            email: env_req("HOMEFINITI_EMAIL")?,
            password: env_req("HOMEFINITI_PASSWORD")?,
            strict_verify: env_flag("HOMEFINITI_STRICT_VERIFY", false),
            timeout_secs: env_parse("HOMEFINITI_TIMEOUT_SECS", 30),
        })
    }

    pub fn login_url(&self) -> String {
        format!("{}/accounts/login?next=/dashboard/", self.base_url)
    }

    pub fn plan_form_url(&self, plan_id: i64) -> String {
        format!("{}/core/dashboard/plan/form/?id={}", self.base_url, plan_id)
    }
}
