// HTTP request handlers for API endpoints

use crate::api::models::*;
use crate::orchestrator::SyncOrchestrator;
use crate::store::Store;
use crate::sync_log::SyncLog;
use crate::sync_ops::PlatformKind;
use actix_web::{web, HttpResponse, Result};
use serde_json::{json, Value};
use std::time::Instant;

/// Shared handles injected into every handler.
pub struct AppState {
    pub orchestrator: SyncOrchestrator,
    pub log: SyncLog,
    pub store: Store,
    pub started: Instant,
}

fn internal_error(e: anyhow::Error) -> HttpResponse {
    tracing::error!(error = %format!("{e:#}"), "request failed");
    HttpResponse::InternalServerError()
        .json(ApiResponse::<Value>::error("internal error"))
}

fn not_found(what: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<Value>::error(format!("{what} not found")))
}

fn parse_platform(slug: &str) -> Result<PlatformKind, HttpResponse> {
    PlatformKind::from_slug(slug).ok_or_else(|| {
        HttpResponse::NotFound()
            .json(ApiResponse::<Value>::error(format!("unknown platform {slug:?}")))
    })
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let db_status = if state.store.ping().await {
        "connected"
    } else {
        "disconnected"
    };

    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: db_status.to_string(),
        uptime_seconds: state.started.elapsed().as_secs(),
    });

    Ok(HttpResponse::Ok().json(response))
}

/// List every plan with its community
pub async fn list_plans(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.store.all_plans().await {
        Ok(plans) => Ok(HttpResponse::Ok().json(ApiResponse::success(plans))),
        Err(e) => Ok(internal_error(e)),
    }
}

/// List the plans of one community
pub async fn list_community_plans(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let community_id = path.into_inner();
    match state.store.plans_for_community(community_id).await {
        Ok(plans) => Ok(HttpResponse::Ok().json(ApiResponse::success(plans))),
        Err(e) => Ok(internal_error(e)),
    }
}

/// Commit a plan base price locally and fan the change out to every mapped
/// platform. The local change is never blocked or rolled back by sync.
pub async fn update_plan_price(
    path: web::Path<i64>,
    payload: web::Json<PriceUpdateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let plan_id = path.into_inner();
    let change = match state.store.set_plan_price(plan_id, payload.price).await {
        Ok(Some(change)) => change,
        Ok(None) => return Ok(not_found("plan")),
        Err(e) => return Ok(internal_error(e)),
    };
    let plan = match state.store.get_plan(plan_id).await {
        Ok(Some(plan)) => plan,
        Ok(None) => return Ok(not_found("plan")),
        Err(e) => return Ok(internal_error(e)),
    };

    // the log's dispatch-time old price is the pre-change value; the
    // re-read plan already carries the new one
    let receipt = match state
        .orchestrator
        .sync_plan(&plan, change.old, payload.price)
        .await
    {
        Ok(receipt) => receipt,
        Err(e) => return Ok(internal_error(e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "old": change.old,
        "new": change.new,
        "sync": receipt,
    }))))
}

/// Commit a homesite premium and propagate it to the inventory platform.
pub async fn update_homesite_price(
    path: web::Path<i64>,
    payload: web::Json<PriceUpdateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let homesite_id = path.into_inner();
    let change = match state
        .store
        .set_homesite_premium(homesite_id, payload.price)
        .await
    {
        Ok(Some(change)) => change,
        Ok(None) => return Ok(not_found("homesite")),
        Err(e) => return Ok(internal_error(e)),
    };
    let homesite = match state.store.get_homesite(homesite_id).await {
        Ok(Some(homesite)) => homesite,
        Ok(None) => return Ok(not_found("homesite")),
        Err(e) => return Ok(internal_error(e)),
    };

    let dispatch = match state
        .orchestrator
        .sync_homesite_premium(&homesite, change.old, payload.price)
        .await
    {
        Ok(dispatch) => dispatch,
        Err(e) => return Ok(internal_error(e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "old": change.old,
        "new": change.new,
        "sync": dispatch,
    }))))
}

/// Commit an available-home price and propagate it to the inventory platform.
pub async fn update_available_home_price(
    path: web::Path<i64>,
    payload: web::Json<PriceUpdateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let home_id = path.into_inner();
    let change = match state.store.set_home_price(home_id, payload.price).await {
        Ok(Some(change)) => change,
        Ok(None) => return Ok(not_found("available home")),
        Err(e) => return Ok(internal_error(e)),
    };
    let home = match state.store.get_available_home(home_id).await {
        Ok(Some(home)) => home,
        Ok(None) => return Ok(not_found("available home")),
        Err(e) => return Ok(internal_error(e)),
    };

    let dispatch = match state
        .orchestrator
        .sync_available_home_price(&home, change.old, payload.price)
        .await
    {
        Ok(dispatch) => dispatch,
        Err(e) => return Ok(internal_error(e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
        "old": change.old,
        "new": change.new,
        "sync": dispatch,
    }))))
}

/// Manual single-plan re-trigger against one platform. Pushes the plan's
/// current stored price.
pub async fn trigger_platform_sync(
    path: web::Path<(String, i64)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let (slug, plan_id) = path.into_inner();
    let kind = match parse_platform(&slug) {
        Ok(kind) => kind,
        Err(resp) => return Ok(resp),
    };
    let plan = match state.store.get_plan(plan_id).await {
        Ok(Some(plan)) => plan,
        Ok(None) => return Ok(not_found("plan")),
        Err(e) => return Ok(internal_error(e)),
    };
    let Some(price) = plan.base_price else {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<Value>::error(format!(
            "plan {:?} has no base price",
            plan.name
        ))));
    };

    match state.orchestrator.sync_plan_on(kind, &plan, price).await {
        Ok(Some(log_id)) => Ok(HttpResponse::Accepted().json(ApiResponse::success(json!({
            "message": format!("Sync started for {}", plan.name),
            "sync_log_id": log_id,
        })))),
        Ok(None) => Ok(HttpResponse::BadRequest().json(ApiResponse::<Value>::error(format!(
            "plan {:?} is not mapped to {}",
            plan.name,
            kind.label()
        )))),
        Err(e) => Ok(internal_error(e)),
    }
}

/// Awaited single-platform batch; one result per input item, in order.
pub async fn sync_batch(
    path: web::Path<String>,
    payload: web::Json<BatchSyncRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let kind = match parse_platform(&path.into_inner()) {
        Ok(kind) => kind,
        Err(resp) => return Ok(resp),
    };

    let mut items = Vec::with_capacity(payload.items.len());
    for item in &payload.items {
        let plan = match state.store.get_plan(item.plan_id).await {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::<Value>::error(
                    format!("plan {} not found", item.plan_id),
                )))
            }
            Err(e) => return Ok(internal_error(e)),
        };
        items.push((plan, item.price));
    }

    match state.orchestrator.sync_batch(kind, items).await {
        Ok(results) => Ok(HttpResponse::Ok().json(ApiResponse::success(results))),
        Err(e) => Ok(internal_error(e)),
    }
}

/// Latest attempt per target on one platform
pub async fn plan_status(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let kind = match parse_platform(&path.into_inner()) {
        Ok(kind) => kind,
        Err(resp) => return Ok(resp),
    };
    match state.log.latest_per_target(kind).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(ApiResponse::success(entries))),
        Err(e) => Ok(internal_error(e)),
    }
}

/// Recent attempts on one platform
pub async fn sync_log(
    path: web::Path<String>,
    query: web::Query<SyncLogQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let kind = match parse_platform(&path.into_inner()) {
        Ok(kind) => kind,
        Err(resp) => return Ok(resp),
    };
    match state.log.recent(kind, query.limit).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(ApiResponse::success(entries))),
        Err(e) => Ok(internal_error(e)),
    }
}

/// Push every stored plan price to every mapped platform
pub async fn master_sync(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.orchestrator.master_sync().await {
        Ok(receipt) => Ok(HttpResponse::Accepted().json(ApiResponse::success(receipt))),
        Err(e) => Ok(internal_error(e)),
    }
}

/// Cross-platform latest-status matrix
pub async fn master_sync_status(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.orchestrator.master_status().await {
        Ok(matrix) => Ok(HttpResponse::Ok().json(ApiResponse::success(matrix))),
        Err(e) => Ok(internal_error(e)),
    }
}

/// Local price-change audit trail
pub async fn audit_log(
    query: web::Query<SyncLogQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    match state.store.recent_price_changes(query.limit).await {
        Ok(entries) => Ok(HttpResponse::Ok().json(ApiResponse::success(entries))),
        Err(e) => Ok(internal_error(e)),
    }
}
