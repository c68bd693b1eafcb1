//! # Dashboard Orchestrator
//!
//! One call per dashboard view: fetch the snapshot and alert summary, then serve
//! insights from the cache or generate them.

use rp_core::{
    AnalyticsReport, AppError, BackendApi, DashboardInsight, DashboardQuery, DashboardSnapshot,
    DashboardView, Result,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::alerts::fetch_alert_stats;
use crate::cache::{compute_key, InsightCache};
use crate::inflight::InFlight;
use crate::insights::InsightService;

pub struct DashboardService {
    backend: Arc<dyn BackendApi>,
    insights: InsightService,
    cache: InsightCache,
    in_flight: InFlight,
}

impl DashboardService {
    pub fn new(backend: Arc<dyn BackendApi>, insights: InsightService, cache: InsightCache) -> Self {
        Self {
            backend,
            insights,
            cache,
            in_flight: InFlight::new(),
        }
    }

    async fn fetch_snapshot(&self, query: &DashboardQuery) -> Option<DashboardSnapshot> {
        match self.backend.dashboard(query).await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(product_id = query.product_id, days_back = query.days_back, error = %err, "fetching dashboard failed");
                None
            }
        }
    }

    /// Generates under the per-key guard and stores the result on success.
    async fn generate_and_store(&self, key: &str, snapshot: &DashboardSnapshot) -> Result<DashboardInsight> {
        let _guard = self.in_flight.try_begin(key).ok_or_else(|| {
            AppError::Conflict(format!("insights for {key} are already being generated"))
        })?;

        let insight = self.insights.generate(snapshot).await?;
        if let Err(err) = self.cache.put(key, &insight).await {
            warn!(key, error = %err, "insights generated but not cached");
        }
        Ok(insight)
    }

    async fn build_view(&self, query: &DashboardQuery, force: bool) -> DashboardView {
        let (snapshot, alert_stats) = tokio::join!(
            self.fetch_snapshot(query),
            fetch_alert_stats(self.backend.as_ref())
        );

        let mut view = DashboardView {
            alert_stats,
            ..DashboardView::default()
        };
        let Some(snapshot) = snapshot else {
            return view;
        };

        let key = compute_key(&snapshot);
        if !force {
            if let Some(cached) = self.cache.get(&key).await {
                debug!(key, "serving cached insights");
                view.insights = Some(cached);
                view.insights_cached = true;
            }
        }

        if view.insights.is_none() {
            match self.generate_and_store(&key, &snapshot).await {
                Ok(insight) => view.insights = Some(insight),
                Err(err) => {
                    warn!(key, error = %err, "dashboard insights unavailable");
                    view.insights_retryable = err.is_retryable();
                    view.insights_error = Some(err.to_string());
                }
            }
        }

        view.insight_key = Some(key);
        view.snapshot = Some(snapshot);
        view
    }

    /// Builds the dashboard view, reusing cached insights when the data is unchanged.
    pub async fn activate(&self, query: &DashboardQuery) -> DashboardView {
        self.build_view(query, false).await
    }

    /// Like [`activate`](Self::activate), but always asks the LLM and overwrites the cache.
    pub async fn regenerate(&self, query: &DashboardQuery) -> DashboardView {
        info!(product_id = query.product_id, "regenerating dashboard insights");
        self.build_view(query, true).await
    }

    /// Period analytics for the charts page. Unlike the dashboard view this fails loudly.
    pub async fn analytics(&self, query: &DashboardQuery) -> Result<AnalyticsReport> {
        self.backend.analytics(query).await.map_err(|err| {
            warn!(product_id = query.product_id, days_back = query.days_back, error = %err, "fetching analytics failed");
            AppError::Upstream(format!("analytics unavailable: {err}"))
        })
    }

    pub async fn clear_insights(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await
    }

    pub async fn purge_expired(&self) -> Result<usize> {
        self.cache.purge_expired().await
    }
}
