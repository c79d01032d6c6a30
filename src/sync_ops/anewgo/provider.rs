//! GraphQL client for plan costs, lot premiums, and built-inventory prices.

use super::{auth, AnewgoConfig};
use crate::browser::BrowserEngine;
use crate::identity::{ExternalId, IdentityResolver};
use crate::sync_ops::{
    truncate_for_log, PlanTarget, PlatformKind, PlatformSession, PriceUpdate, SessionError,
    SyncPlatform,
};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const PLAN_QUERY: &str = "query PLAN_QUERY($clientName: String!, $communityId: Int, $planId: Int!) {\n\
    plan(clientName: $clientName, communityId: $communityId, planId: $planId) {\n\
        id name displayName cost costMin costMax\n\
    }\n}";

const UPDATE_PLAN_MUTATION: &str = "mutation UPDATE_PLAN_MUTATION($clientName: String!, $communityId: Int, $planId: Int!, $plan: UpdatePlanInput!) {\n\
    updatePlan(clientName: $clientName, communityId: $communityId, planId: $planId, plan: $plan)\n}";

const UPDATE_LOT_MUTATION: &str = "mutation UPDATE_LOT($clientName: String!, $lot: UpdateLotInput!) {\n\
    updateLot(clientName: $clientName, lot: $lot) { id name premium }\n}";

const INVENTORY_QUERY: &str = "query INVENTORY_QUERY($clientName: String!, $communityId: Int!) {\n\
    inventory(clientName: $clientName, communityId: $communityId) { id lotId price }\n}";

const UPDATE_INVENTORY_MUTATION: &str = "mutation UPDATE_INVENTORY($clientName: String!, $inventory: UpdateInventoryInput!) {\n\
    updateInventory(clientName: $clientName, inventory: $inventory) { id price }\n}";

/// A gateway response with a non-empty `errors` array is a protocol
/// failure even under HTTP 200.
pub(crate) fn check_gql_errors(body: &Value) -> Result<()> {
    if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
        if !errors.is_empty() {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                bail!("graphql errors: {errors:?}");
            }
            bail!("graphql errors: {}", messages.join("; "));
        }
    }
    Ok(())
}

/// Pick the inventory record for a lot out of a community's inventory list.
/// Returns (inventory id, current price).
pub(crate) fn inventory_match(
    items: &[Value],
    lot_id: ExternalId,
) -> Option<(ExternalId, Option<i64>)> {
    let item = items
        .iter()
        .find(|i| i.get("lotId").and_then(|v| v.as_i64()) == Some(lot_id))?;
    let id = item.get("id").and_then(|v| v.as_i64())?;
    let price = item.get("price").and_then(|v| v.as_i64());
    Some((id, price))
}

fn bearer_of(session: &PlatformSession) -> Result<String> {
    match session {
        PlatformSession::Bearer(token) => Ok(token.clone()),
        _ => bail!("session is not a bearer token"),
    }
}

pub struct AnewgoPlatform {
    config: AnewgoConfig,
    engine: Arc<dyn BrowserEngine>,
    resolver: IdentityResolver,
    http: Client,
}

impl AnewgoPlatform {
    pub fn new(
        config: AnewgoConfig,
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

    async fn gql(
        &self,
        token: &str,
        operation_name: &str,
        query: &str,
        variables: Value,
    ) -> Result<Value> {
        let resp = self
            .http
            .post(&self.config.gql_url)
            .bearer_auth(token)
            .json(&json!({
                "operationName": operation_name,
                "variables": variables,
                "query": query,
            }))
            .send()
            .await
            .with_context(|| format!("sending {operation_name}"))?;
        let status = resp.status();
        let text = resp.text().await.context("reading gateway response")?;
        if !status.is_success() {
            bail!(
                "{operation_name} returned {status}: {}",
                truncate_for_log(&text)
            );
        }
        let body: Value = serde_json::from_str(&text).with_context(|| {
            format!(
                "{operation_name} returned non-JSON: {}",
                truncate_for_log(&text)
            )
        })?;
        check_gql_errors(&body)?;
        Ok(body)
    }

    async fn fetch_plan_cost(&self, token: &str, plan_id: ExternalId) -> Result<Option<i64>> {
        let body = self
            .gql(
                token,
                "PLAN_QUERY",
                PLAN_QUERY,
                json!({
                    "clientName": self.config.client_name,
                    "communityId": null,
                    "planId": plan_id,
                }),
            )
            .await?;
        Ok(body
            .pointer("/data/plan/cost")
            .and_then(|v| v.as_f64())
            .map(|c| c as i64))
    }

    async fn try_update_plan(
        &self,
        token: &str,
        target: &PlanTarget,
        new_price: i64,
    ) -> Result<PriceUpdate> {
        let old_price = self.fetch_plan_cost(token, target.external_id).await?;

        self.gql(
            token,
            "UPDATE_PLAN_MUTATION",
            UPDATE_PLAN_MUTATION,
            json!({
                "clientName": self.config.client_name,
                "communityId": null,
                "planId": target.external_id,
                "plan": { "cost": new_price, "costMin": new_price },
            }),
        )
        .await?;

        info!(
            plan = %target.display_name,
            plan_id = target.external_id,
            old_price = ?old_price,
            new_price,
            "updated plan cost"
        );
        Ok(PriceUpdate::ok(
            old_price,
            new_price,
            format!("updated {} to {new_price}", target.display_name),
        ))
    }

    async fn try_update_lot(
        &self,
        token: &str,
        lot_id: ExternalId,
        new_premium: i64,
    ) -> Result<PriceUpdate> {
        self.gql(
            token,
            "UPDATE_LOT",
            UPDATE_LOT_MUTATION,
            json!({
                "clientName": self.config.client_name,
                "lot": { "id": lot_id, "premium": new_premium },
            }),
        )
        .await?;
        info!(lot_id, new_premium, "updated lot premium");
        Ok(PriceUpdate::ok(
            None,
            new_premium,
            format!("updated lot {lot_id} premium to {new_premium}"),
        ))
    }

    async fn try_update_inventory(
        &self,
        token: &str,
        community: &str,
        lot_id: ExternalId,
        community_id: ExternalId,
        new_price: i64,
    ) -> Result<PriceUpdate> {
        let body = self
            .gql(
                token,
                "INVENTORY_QUERY",
                INVENTORY_QUERY,
                json!({
                    "clientName": self.config.client_name,
                    "communityId": community_id,
                }),
            )
            .await?;
        let items = body
            .pointer("/data/inventory")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let Some((inventory_id, old_price)) = inventory_match(&items, lot_id) else {
            bail!("no inventory record in {community} for lot id {lot_id}");
        };

        self.gql(
            token,
            "UPDATE_INVENTORY",
            UPDATE_INVENTORY_MUTATION,
            json!({
                "clientName": self.config.client_name,
                "inventory": { "id": inventory_id, "price": new_price },
            }),
        )
        .await?;

        info!(
            community,
            lot_id,
            inventory_id,
            old_price = ?old_price,
            new_price,
            "updated inventory price"
        );
        Ok(PriceUpdate::ok(
            old_price,
            new_price,
            format!("updated inventory {inventory_id} to {new_price}"),
        ))
    }
}

#[async_trait]
impl SyncPlatform for AnewgoPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Anewgo
    }

    fn resolve_plan(&self, display_name: &str) -> Option<ExternalId> {
        self.resolver.resolve_plan(PlatformKind::Anewgo, display_name)
    }

    fn resolve_lot(&self, community: &str, lot_number: &str) -> Option<ExternalId> {
        self.resolver
            .resolve_lot(PlatformKind::Anewgo, community, lot_number)
    }

    async fn acquire_session(&self) -> Result<PlatformSession, SessionError> {
        let token = auth::capture_auth_token(self.engine.as_ref(), &self.config).await?;
        Ok(PlatformSession::Bearer(token))
    }

    async fn update_plan_price(
        &self,
        session: &mut PlatformSession,
        target: &PlanTarget,
        new_price: i64,
    ) -> PriceUpdate {
        let token = match bearer_of(session) {
            Ok(t) => t,
            Err(e) => return PriceUpdate::failed(new_price, format!("{e:#}")),
        };
        match self.try_update_plan(&token, target, new_price).await {
            Ok(update) => update,
            Err(e) => {
                warn!(plan = %target.display_name, error = %format!("{e:#}"), "plan cost update failed");
                PriceUpdate::failed(new_price, format!("{e:#}"))
            }
        }
    }

    async fn update_lot_premium(
        &self,
        session: &mut PlatformSession,
        lot_id: ExternalId,
        new_premium: i64,
    ) -> PriceUpdate {
        let token = match bearer_of(session) {
            Ok(t) => t,
            Err(e) => return PriceUpdate::failed(new_premium, format!("{e:#}")),
        };
        match self.try_update_lot(&token, lot_id, new_premium).await {
            Ok(update) => update,
            Err(e) => {
                warn!(lot_id, error = %format!("{e:#}"), "lot premium update failed");
                PriceUpdate::failed(new_premium, format!("{e:#}"))
            }
        }
    }

    async fn update_inventory_price(
        &self,
        session: &mut PlatformSession,
        community: &str,
        lot_number: &str,
        new_price: i64,
    ) -> PriceUpdate {
        // Both mappings are checked before any network traffic.
        let Some(lot_id) = self.resolve_lot(community, lot_number) else {
            return PriceUpdate::failed(
                new_price,
                format!("no lot mapping for {community:?} lot {lot_number}"),
            );
        };
        let Some(community_id) = self
            .resolver
            .resolve_community(PlatformKind::Anewgo, community)
        else {
            return PriceUpdate::failed(
                new_price,
                format!("no community mapping for {community:?}"),
            );
        };
        let token = match bearer_of(session) {
            Ok(t) => t,
            Err(e) => return PriceUpdate::failed(new_price, format!("{e:#}")),
        };
        match self
            .try_update_inventory(&token, community, lot_id, community_id, new_price)
            .await
        {
            Ok(update) => update,
            Err(e) => {
                warn!(community, lot_number, error = %format!("{e:#}"), "inventory price update failed");
                PriceUpdate::failed(new_price, format!("{e:#}"))
            }
        }
    }
}
