// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check (no auth required)
        .route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::health_check))
        // API v1 routes (all require authentication)
        .service(
            web::scope("/api/v1")
                // Local entities and price edits
                .route("/plans", web::get().to(handlers::list_plans))
                .route(
                    "/communities/{id}/plans",
                    web::get().to(handlers::list_community_plans),
                )
                .route(
                    "/plans/{id}/price",
                    web::put().to(handlers::update_plan_price),
                )
                .route(
                    "/homesites/{id}/price",
                    web::put().to(handlers::update_homesite_price),
                )
                .route(
                    "/available-homes/{id}/price",
                    web::put().to(handlers::update_available_home_price),
                )
                // Per-platform sync control and status
                .route(
                    "/platforms/{slug}/sync/{plan_id}",
                    web::post().to(handlers::trigger_platform_sync),
                )
                .route(
                    "/platforms/{slug}/sync-batch",
                    web::post().to(handlers::sync_batch),
                )
                .route(
                    "/platforms/{slug}/plan-status",
                    web::get().to(handlers::plan_status),
                )
                .route(
                    "/platforms/{slug}/sync-log",
                    web::get().to(handlers::sync_log),
                )
                // Fleet-wide sweep
                .route("/master-sync", web::post().to(handlers::master_sync))
                .route(
                    "/master-sync/status",
                    web::get().to(handlers::master_sync_status),
                )
                // Local audit trail
                .route("/audit-log", web::get().to(handlers::audit_log)),
        );
}
