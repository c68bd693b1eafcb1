//! Alert feed, alert marking and the dashboard alert summary.
//!
//! Reads degrade to empty data like the mention feed. Marking is a write the
//! user asked for, so its failure is reported.

use rp_core::{Alert, AlertPage, AlertStats, AlertType, AppError, BackendApi, PageRequest, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// How many alerts the summary is computed over.
pub const ALERT_SAMPLE_SIZE: u32 = 100;

pub struct AlertService {
    backend: Arc<dyn BackendApi>,
}

impl AlertService {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, page: PageRequest, alert_type: Option<AlertType>) -> AlertPage {
        match self.backend.alerts(page, alert_type).await {
            Ok(result) => result,
            Err(err) => {
                warn!(page = page.page, alert_type = ?alert_type, error = %err, "fetching alerts failed, showing none");
                AlertPage::default()
            }
        }
    }

    pub async fn mark(&self, id: i64, is_marked: bool) -> Result<Alert> {
        match self.backend.mark_alert(id, is_marked).await {
            Ok(alert) => {
                info!(alert_id = id, is_marked, "alert mark updated");
                Ok(alert)
            }
            Err(err) => {
                warn!(alert_id = id, is_marked, error = %err, "marking alert failed");
                Err(AppError::Upstream(format!("marking alert {id} failed: {err}")))
            }
        }
    }

    /// The backend has no separate acknowledged state; acknowledging marks the alert.
    pub async fn acknowledge(&self, id: i64) -> Result<Alert> {
        self.mark(id, true).await
    }

    /// Resolving also marks the alert.
    pub async fn resolve(&self, id: i64) -> Result<Alert> {
        self.mark(id, true).await
    }

    pub async fn stats(&self) -> AlertStats {
        fetch_alert_stats(self.backend.as_ref()).await
    }
}

/// Summarises the first page of alerts; zeroed when the backend is unreachable.
pub async fn fetch_alert_stats(backend: &dyn BackendApi) -> AlertStats {
    match backend.alerts(PageRequest::new(1, ALERT_SAMPLE_SIZE), None).await {
        Ok(page) => AlertStats::from_alerts(&page.alerts),
        Err(err) => {
            warn!(error = %err, "fetching alerts failed, stats zeroed");
            AlertStats::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::MockBackendApi;

    fn alert(id: i64, is_marked: bool) -> Alert {
        serde_json::from_value(serde_json::json!({ "id": id, "content": "outage", "is_marked": is_marked })).unwrap()
    }

    #[tokio::test]
    async fn list_forwards_type_filter() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_alerts()
            .withf(|page, kind| page.page == 3 && *kind == Some(AlertType::Critical))
            .returning(|_, _| Ok(AlertPage { alerts: vec![alert(1, false)], total: 21 }));
        let service = AlertService::new(Arc::new(backend));

        let page = service.list(PageRequest::new(3, 20), Some(AlertType::Critical)).await;
        assert_eq!(page.total, 21);
        assert_eq!(page.alerts[0].id, 1);
    }

    #[tokio::test]
    async fn acknowledge_and_resolve_mark_the_alert() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_mark_alert()
            .withf(|id, is_marked| *id == 8 && *is_marked)
            .times(2)
            .returning(|id, is_marked| Ok(alert(id, is_marked)));
        let service = AlertService::new(Arc::new(backend));

        assert!(service.acknowledge(8).await.unwrap().is_marked);
        assert!(service.resolve(8).await.unwrap().is_marked);
    }

    #[tokio::test]
    async fn failed_mark_is_a_retryable_upstream_error() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_mark_alert()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));
        let service = AlertService::new(Arc::new(backend));

        let err = service.mark(8, false).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn read_failures_degrade_to_empty_values() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_alerts()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));
        let service = AlertService::new(Arc::new(backend));

        assert_eq!(service.list(PageRequest::default(), None).await, AlertPage::default());
        assert_eq!(service.stats().await, AlertStats::default());
    }

    #[tokio::test]
    async fn stats_use_first_hundred() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_alerts()
            .withf(|page, kind| page.page == 1 && page.page_size == ALERT_SAMPLE_SIZE && kind.is_none())
            .times(1)
            .returning(|_, _| Ok(AlertPage::default()));
        let service = AlertService::new(Arc::new(backend));

        assert_eq!(service.stats().await.total_active, 0);
    }
}
