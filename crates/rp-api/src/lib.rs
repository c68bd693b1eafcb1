//! # rp-api
//!
//! The JSON HTTP surface for repute.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;

use actix_web::web;

/// Mounts every repute route. Scoped so the binary decides where `/api` lives.
/// `/mentions/stats` is registered ahead of `/mentions/{id}` so the literal segment wins.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/responses/generate", web::post().to(handlers::generate_response))
            .route("/sentiment", web::post().to(handlers::classify_sentiment))
            .route("/dashboard", web::get().to(handlers::dashboard))
            .route("/dashboard/insights", web::post().to(handlers::regenerate_insights))
            .route("/dashboard/insights/{key}", web::delete().to(handlers::clear_insights))
            .route("/analytics", web::get().to(handlers::analytics))
            .route("/mentions", web::get().to(handlers::list_mentions))
            .route("/mentions/stats", web::post().to(handlers::mention_stats))
            .route("/mentions/{id}", web::get().to(handlers::get_mention))
            .route("/mentions/{id}/mark", web::patch().to(handlers::mark_mention))
            .route("/alerts", web::get().to(handlers::list_alerts))
            .route("/alerts/stats", web::get().to(handlers::alert_stats))
            .route("/alerts/{id}/mark", web::post().to(handlers::mark_alert))
            .route("/alerts/{id}/acknowledge", web::post().to(handlers::acknowledge_alert))
            .route("/alerts/{id}/resolve", web::post().to(handlers::resolve_alert)),
    )
    .route("/metrics", web::get().to(handlers::metrics));
}
