//! # Insight Cache
//!
//! Content-hash-keyed, time-expiring store of dashboard insights. The cache is
//! advisory: a read failure is a miss, and losing an entry only costs one LLM call.

use chrono::Duration;
use rp_core::{
    AppError, Clock, DashboardInsight, DashboardSnapshot, InsightCacheEntry, KvStore, Record,
    Result, SentimentCounts, SystemClock,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prefix of every persisted insight entry.
pub const CACHE_KEY_PREFIX: &str = "dashboard_insights_";

/// Hex characters kept from the digest.
const KEY_LEN: usize = 16;

pub fn default_ttl() -> Duration {
    Duration::hours(24)
}

/// The slice of a snapshot that identifies "the same data".
#[derive(Serialize)]
struct KeyProjection<'a> {
    current_score: Option<f64>,
    sentiment_counts: Option<&'a SentimentCounts>,
    top_issues_count: Option<usize>,
    platform_count: Option<usize>,
    total_mentions: Option<u64>,
    generated_at: Option<&'a str>,
}

/// Derives the cache key of `snapshot`.
///
/// `generated_at` is part of the projection, so an otherwise identical snapshot
/// produced at a different moment gets a different key.
pub fn compute_key(snapshot: &DashboardSnapshot) -> String {
    let meta = snapshot.dashboard_data.as_ref();
    let projection = KeyProjection {
        current_score: snapshot.reputation_score.as_ref().and_then(|s| s.current_score),
        sentiment_counts: snapshot
            .sentiment_distribution
            .as_ref()
            .and_then(|d| d.counts.as_ref()),
        top_issues_count: snapshot.top_issues_requiring_attention.as_ref().map(Vec::len),
        platform_count: snapshot
            .platform_distribution
            .as_ref()
            .and_then(|d| d.platforms.as_ref())
            .map(Vec::len),
        total_mentions: meta.and_then(|m| m.total_mentions),
        generated_at: meta.and_then(|m| m.generated_at.as_deref()),
    };

    let canonical = serde_json::to_vec(&projection).unwrap_or_default();
    let mut digest = hex::encode(Sha256::digest(&canonical));
    digest.truncate(KEY_LEN);
    digest
}

pub struct InsightCache {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl InsightCache {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), default_ttl())
    }

    pub fn with_clock(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    fn storage_key(key: &str) -> String {
        format!("{CACHE_KEY_PREFIX}{key}")
    }

    /// Returns the insight stored under `key` if it is younger than the TTL.
    /// A stale entry is deleted on the way out.
    pub async fn get(&self, key: &str) -> Option<DashboardInsight> {
        let storage_key = Self::storage_key(key);
        let record = match self.store.get(&storage_key).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "reading cached insights failed");
                return None;
            }
        };

        let entry: InsightCacheEntry = match serde_json::from_str(&record.value) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(key, error = %err, "cached insights are unreadable, removing");
                self.discard(key, &storage_key).await;
                return None;
            }
        };

        if self.clock.now() - entry.timestamp < self.ttl {
            debug!(key, "using cached insights");
            return Some(entry.insights);
        }

        info!(key, "cached insights expired, removing");
        self.discard(key, &storage_key).await;
        None
    }

    async fn discard(&self, key: &str, storage_key: &str) {
        if let Err(err) = self.store.delete(storage_key).await {
            warn!(key, error = %err, "removing cached insights failed");
        }
    }

    /// Overwrites whatever is stored under `key` with a freshly stamped entry.
    pub async fn put(&self, key: &str, insight: &DashboardInsight) -> Result<()> {
        let now = self.clock.now();
        let entry = InsightCacheEntry {
            insights: insight.clone(),
            timestamp: now,
        };
        let value = serde_json::to_string(&entry)
            .map_err(|e| AppError::Internal(format!("encoding cache entry: {e}")))?;

        self.store
            .put(&Self::storage_key(key), Record { value, stored_at: now })
            .await
            .map_err(|e| AppError::Internal(format!("saving insights to cache: {e}")))?;
        debug!(key, "insights saved to cache");
        Ok(())
    }

    pub async fn invalidate(&self, key: &str) -> Result<()> {
        self.store
            .delete(&Self::storage_key(key))
            .await
            .map_err(|e| AppError::Internal(format!("clearing cached insights: {e}")))?;
        info!(key, "insight cache cleared");
        Ok(())
    }

    /// Deletes every expired entry; returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        let cutoff = self.clock.now() - self.ttl;
        let expired = self
            .store
            .list_expired(CACHE_KEY_PREFIX, cutoff)
            .await
            .map_err(|e| AppError::Internal(format!("listing expired insights: {e}")))?;

        let mut removed = 0;
        for storage_key in &expired {
            match self.store.delete(storage_key).await {
                Ok(()) => removed += 1,
                Err(err) => warn!(key = %storage_key, error = %err, "removing expired insights failed"),
            }
        }
        if removed > 0 {
            info!(removed, "purged expired insights");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rp_core::{DashboardMeta, MockKvStore, ReputationScore, SentimentDistribution};
    use rp_store_local::MemoryStore;
    use std::sync::Mutex;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        fn at(t: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(t)))
        }

        fn set(&self, t: DateTime<Utc>) {
            *self.0.lock().unwrap() = t;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn insight() -> DashboardInsight {
        DashboardInsight {
            summary: "Reputation is recovering".into(),
            key_findings: vec!["Negative share fell".into()],
            recommendations: vec!["Answer App Store reviews".into()],
            urgent_actions: vec!["Fix iOS crash".into()],
        }
    }

    fn snapshot(generated_at: &str) -> DashboardSnapshot {
        DashboardSnapshot {
            dashboard_data: Some(DashboardMeta {
                generated_at: Some(generated_at.into()),
                total_mentions: Some(120),
                ..DashboardMeta::default()
            }),
            reputation_score: Some(ReputationScore {
                current_score: Some(73.0),
                ..ReputationScore::default()
            }),
            sentiment_distribution: Some(SentimentDistribution {
                counts: Some(SentimentCounts {
                    positive: Some(70),
                    negative: Some(30),
                    neutral: Some(20),
                }),
                ..SentimentDistribution::default()
            }),
            ..DashboardSnapshot::default()
        }
    }

    fn cache_at(clock: Arc<FixedClock>) -> (InsightCache, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let cache = InsightCache::with_clock(store.clone(), clock, default_ttl());
        (cache, store)
    }

    #[test]
    fn key_is_short_and_stable() {
        let a = compute_key(&snapshot("2024-05-01T10:00:00Z"));
        let b = compute_key(&snapshot("2024-05-01T10:00:00Z"));
        assert_eq!(a.len(), KEY_LEN);
        assert_eq!(a, b);
    }

    #[test]
    fn generated_at_changes_the_key() {
        let a = compute_key(&snapshot("2024-05-01T10:00:00Z"));
        let b = compute_key(&snapshot("2024-05-01T10:05:00Z"));
        assert_ne!(a, b);
    }

    #[test]
    fn fields_outside_the_projection_do_not_change_the_key() {
        let plain = snapshot("2024-05-01T10:00:00Z");
        let mut decorated = plain.clone();
        decorated.reputation_score.as_mut().unwrap().change_description = Some("Up 5%".into());
        assert_eq!(compute_key(&plain), compute_key(&decorated));
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (cache, store) = cache_at(FixedClock::at(t0()));
        cache.put("abc", &insight()).await.unwrap();

        assert_eq!(cache.get("abc").await, Some(insight()));
        let record = store.get("dashboard_insights_abc").await.unwrap().unwrap();
        assert_eq!(record.stored_at, t0());
        assert!(record.value.contains("\"timestamp\""));
        assert!(record.value.contains("\"insights\""));
    }

    #[tokio::test]
    async fn entry_just_under_ttl_is_served() {
        let clock = FixedClock::at(t0());
        let (cache, _) = cache_at(clock.clone());
        cache.put("abc", &insight()).await.unwrap();

        clock.set(t0() + Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59));
        assert!(cache.get("abc").await.is_some());
    }

    #[tokio::test]
    async fn entry_past_ttl_is_absent_and_deleted() {
        let clock = FixedClock::at(t0());
        let (cache, store) = cache_at(clock.clone());
        cache.put("abc", &insight()).await.unwrap();

        clock.set(t0() + Duration::hours(24) + Duration::milliseconds(1));
        assert!(cache.get("abc").await.is_none());
        assert!(store.get("dashboard_insights_abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites_with_fresh_timestamp() {
        let clock = FixedClock::at(t0());
        let (cache, _) = cache_at(clock.clone());
        cache.put("abc", &insight()).await.unwrap();

        clock.set(t0() + Duration::hours(20));
        let mut newer = insight();
        newer.summary = "Updated".into();
        cache.put("abc", &newer).await.unwrap();

        clock.set(t0() + Duration::hours(30));
        assert_eq!(cache.get("abc").await.unwrap().summary, "Updated");
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let (cache, _) = cache_at(FixedClock::at(t0()));
        cache.put("abc", &insight()).await.unwrap();
        cache.invalidate("abc").await.unwrap();
        assert!(cache.get("abc").await.is_none());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_entries() {
        let clock = FixedClock::at(t0());
        let (cache, _) = cache_at(clock.clone());
        cache.put("old", &insight()).await.unwrap();
        clock.set(t0() + Duration::hours(12));
        cache.put("young", &insight()).await.unwrap();

        clock.set(t0() + Duration::hours(25));
        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert!(cache.get("young").await.is_some());
    }

    #[tokio::test]
    async fn store_failure_reads_as_miss() {
        let mut store = MockKvStore::new();
        store
            .expect_get()
            .returning(|_| Err(anyhow::anyhow!("disk unplugged")));
        let cache = InsightCache::new(Arc::new(store));
        assert!(cache.get("abc").await.is_none());
    }

    #[tokio::test]
    async fn corrupt_entry_reads_as_miss_and_is_removed() {
        let (cache, store) = cache_at(FixedClock::at(t0()));
        store
            .put("dashboard_insights_abc", Record { value: "{oops".into(), stored_at: t0() })
            .await
            .unwrap();
        assert!(cache.get("abc").await.is_none());
        assert!(store.get("dashboard_insights_abc").await.unwrap().is_none());
    }
}
