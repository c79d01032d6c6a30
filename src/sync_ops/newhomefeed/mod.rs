//! NewHomeFeed: the listing-feed portal (the Zillow feed).
//!
//! No replayable credential exists here: the portal only works as a logged-
//! in browser page, so the session *is* the page and every update is a
//! scripted form edit against `/plans/{id}/general`.

pub mod provider;
pub mod session;

pub use provider::NewHomeFeedPlatform;

use crate::util::env::{env_opt, env_parse, env_req};
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct NewHomeFeedConfig {
    pub login_url: String,
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl NewHomeFeedConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            login_url: env_opt("NHF_LOGIN_URL")
                .unwrap_or_else(|| "https://newhomefeed.com/login".to_string()),
            base_url: env_opt("NHF_BASE_URL")
                .unwrap_or_else(|| "https://my.newhomefeed.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            username: env_req("NHF_USERNAME")?,
            password: env_req("NHF_PASSWORD")?,
            timeout_secs: env_parse("NHF_TIMEOUT_SECS", 30),
        })
    }

    pub fn plan_url(&self, plan_id: i64) -> String {
        format!("{}/plans/{}/general", self.base_url, plan_id)
    }
}
