//! Mention feed. Backend failures never propagate out of here:
//! the dashboard keeps rendering with empty data.

use rp_core::{BackendApi, Mention, MentionFilter, MentionPage, MentionStats, PageRequest};
use std::sync::Arc;
use tracing::{info, warn};

pub struct MentionService {
    backend: Arc<dyn BackendApi>,
}

impl MentionService {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self { backend }
    }

    pub async fn list(&self, filter: &MentionFilter, page: PageRequest) -> MentionPage {
        match self.backend.mentions(filter, page).await {
            Ok(result) => result,
            Err(err) => {
                warn!(page = page.page, error = %err, "fetching mentions failed, showing none");
                MentionPage::default()
            }
        }
    }

    pub async fn get(&self, id: &str) -> Option<Mention> {
        self.backend.mention(id).await.unwrap_or_else(|err| {
            warn!(mention_id = id, error = %err, "fetching mention failed");
            None
        })
    }

    /// Flags or unflags a mention. Returns whether the backend accepted the change.
    pub async fn mark(&self, id: &str, is_marked: bool) -> bool {
        match self.backend.mark_mention(id, is_marked).await {
            Ok(()) => {
                info!(mention_id = id, is_marked, "mention mark updated");
                true
            }
            Err(err) => {
                warn!(mention_id = id, is_marked, error = %err, "marking mention failed");
                false
            }
        }
    }

    /// Backend-side counters for the filtered set; `None` when unavailable.
    pub async fn stats(&self, filter: &MentionFilter) -> Option<MentionStats> {
        self.backend
            .mention_stats(filter)
            .await
            .map_err(|err| warn!(error = %err, "fetching mention stats failed"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rp_core::{MentionId, MockBackendApi};

    fn mention(id: i64) -> Mention {
        serde_json::from_value(serde_json::json!({ "id": id, "content": "hello" })).unwrap()
    }

    #[tokio::test]
    async fn list_passes_through_backend_page() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_mentions()
            .withf(|filter, page| filter.platforms == ["reddit"] && page.page == 2)
            .returning(|_, _| Ok(MentionPage { mentions: vec![mention(7)], total: 31 }));
        let service = MentionService::new(Arc::new(backend));

        let filter = MentionFilter {
            platforms: vec!["reddit".into()],
            ..MentionFilter::default()
        };
        let page = service.list(&filter, PageRequest::new(2, 10)).await;
        assert_eq!(page.total, 31);
        assert_eq!(page.mentions[0].id, MentionId::Number(7));
    }

    #[tokio::test]
    async fn failures_degrade_to_empty_values() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_mentions()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));
        backend
            .expect_mention()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        backend
            .expect_mark_mention()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));
        backend
            .expect_mention_stats()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        let service = MentionService::new(Arc::new(backend));

        assert_eq!(service.list(&MentionFilter::default(), PageRequest::default()).await, MentionPage::default());
        assert!(service.get("7").await.is_none());
        assert!(!service.mark("7", true).await);
        assert!(service.stats(&MentionFilter::default()).await.is_none());
    }

    #[tokio::test]
    async fn stats_forward_the_filter() {
        let mut backend = MockBackendApi::new();
        backend
            .expect_mention_stats()
            .withf(|filter| filter.product_id == Some(2))
            .returning(|_| Ok(MentionStats { total_active: 4, ..MentionStats::default() }));
        let service = MentionService::new(Arc::new(backend));

        let filter = MentionFilter { product_id: Some(2), ..MentionFilter::default() };
        assert_eq!(service.stats(&filter).await.unwrap().total_active, 4);
    }
}
