//! ANewGo: the inventory-syndication GraphQL gateway.
//!
//! The dashboard login is a single-page app; its own auth call returns the
//! JWT we need, so session acquisition is a scripted login that watches the
//! gateway traffic and lifts the token out of the authenticate response.
//! Everything after that is plain GraphQL over HTTP.

pub mod auth;
pub mod provider;

pub use provider::AnewgoPlatform;

use crate::util::env::{env_opt, env_parse, env_req};
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct AnewgoConfig {
    pub login_url: String,
    pub gql_url: String,
    /// Tenant discriminator sent with every gateway request.
    pub client_name: String,
    pub email: String,
    pub password: String,
    pub timeout_secs: u64,
    /// How long to watch gateway traffic for the authenticate response.
    pub capture_window_secs: u64,
}

impl AnewgoConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            login_url: env_opt("ANEWGO_LOGIN_URL")
                .unwrap_or_else(|| "https://dashboard.anewgo.com/login".to_string()),
            gql_url: env_opt("ANEWGO_GQL_URL")
                .unwrap_or_else(|| "https://nexus.anewgo.com/api/graphql_gateway".to_string()),
            client_name: env_opt("ANEWGO_CLIENT_NAME").unwrap_or_else(|| "regal".to_string()),
            email: env_req("ANEWGO_EMAIL")?,
            password: env_req("ANEWGO_PASSWORD")?,
            timeout_secs: env_parse("ANEWGO_TIMEOUT_SECS", 30),
            capture_window_secs: env_parse("ANEWGO_CAPTURE_WINDOW_SECS", 15),
        })
    }
}
