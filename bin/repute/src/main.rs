//! # repute Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use rp_api::handlers::AppState;
use rp_api::metrics::Metrics;
use rp_api::middleware::{cors_policy, standard_middleware};
use rp_configs::Settings;
use rp_core::{DashboardQuery, SystemClock};
use rp_services::{
    AlertService, DashboardService, InsightCache, InsightOptions, InsightService, MentionService,
    ResponseOptions, ResponseService,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Feature-gated imports
#[cfg(feature = "llm-openai")]
use rp_llm_openai::OpenAiProvider;

#[cfg(feature = "store-local")]
use rp_store_local::FileStore;

#[cfg(feature = "backend-http")]
use rp_backend_http::HttpBackend;

/// `REPUTE_LOG_FORMAT=json` switches to one JSON object per line.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("REPUTE_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let settings = Settings::load().context("loading settings")?;

    // 1. LLM provider
    let api_key = settings.llm.api_key.clone().unwrap_or_else(|| {
        warn!("no LLM API key configured; generation requests will fail");
        SecretString::from("")
    });
    #[cfg(feature = "llm-openai")]
    let llm = Arc::new(OpenAiProvider::new(
        &settings.llm.base_url,
        &settings.llm.model,
        api_key,
        settings.llm.timeout(),
    )?);

    // 2. Insight cache storage
    #[cfg(feature = "store-local")]
    let store = Arc::new(FileStore::new(settings.cache.dir.clone()));

    // 3. Analytics backend
    #[cfg(feature = "backend-http")]
    let backend = Arc::new(HttpBackend::new(&settings.backend.base_url, settings.backend.timeout())?);

    let ttl = chrono::Duration::from_std(settings.cache.ttl()).context("cache.ttl_hours out of range")?;
    let dashboard = DashboardService::new(
        backend.clone(),
        InsightService::with_options(
            llm.clone(),
            InsightOptions {
                timeout: settings.llm.timeout(),
                ..InsightOptions::default()
            },
        ),
        InsightCache::with_clock(store, Arc::new(SystemClock), ttl),
    );

    match dashboard.purge_expired().await {
        Ok(removed) => info!(removed, "expired insights purged"),
        Err(err) => warn!(error = %err, "purging expired insights failed"),
    }

    // 4. Wrap in AppState (Using dynamic dispatch for maximum flexibility)
    let state = web::Data::new(AppState {
        responses: ResponseService::with_options(
            llm,
            ResponseOptions {
                timeout: settings.llm.timeout(),
                allow_empty_completion: settings.responses.allow_empty_completion,
                ..ResponseOptions::default()
            },
        ),
        dashboard,
        mentions: MentionService::new(backend.clone()),
        alerts: AlertService::new(backend),
        metrics: Metrics::new(),
        default_query: DashboardQuery {
            product_id: settings.backend.product_id,
            days_back: settings.backend.days_back,
        },
    });

    let bind = (settings.server.host.clone(), settings.server.port);
    info!(host = %bind.0, port = bind.1, model = %settings.llm.model, "repute starting");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors_policy())
            .wrap(standard_middleware())
            .configure(rp_api::configure_routes)
    })
    .bind(bind)?
    .run()
    .await?;
    Ok(())
}
