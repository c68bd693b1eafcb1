//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be wired into the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Alert, AlertPage, AlertType, AnalyticsReport, DashboardQuery, DashboardSnapshot, Mention,
    MentionFilter, MentionPage, MentionStats, PageRequest,
};

/// One chat-completion call: a system instruction plus a single user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the provider to emit a single JSON object.
    pub json_mode: bool,
}

/// Text-generation contract for the LLM provider.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the first completion's text, `None` when the provider returned no choice.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Option<String>>;
}

/// A stored value together with the moment it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub value: String,
    pub stored_at: DateTime<Utc>,
}

/// Durable key-value contract backing the insight cache.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Record>>;
    /// Overwrites any existing record under `key`.
    async fn put(&self, key: &str, record: Record) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
    /// Keys starting with `prefix` whose record was stored at or before `cutoff`.
    async fn list_expired(&self, prefix: &str, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<String>>;
}

/// Read contract for the analytics REST backend.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn dashboard(&self, query: &DashboardQuery) -> anyhow::Result<DashboardSnapshot>;
    async fn mentions(&self, filter: &MentionFilter, page: PageRequest) -> anyhow::Result<MentionPage>;
    /// `None` when the backend does not know the id.
    async fn mention(&self, id: &str) -> anyhow::Result<Option<Mention>>;
    async fn mark_mention(&self, id: &str, is_marked: bool) -> anyhow::Result<()>;
    async fn alerts(&self, page: PageRequest, alert_type: Option<AlertType>) -> anyhow::Result<AlertPage>;
    /// Returns the alert as the backend stored it.
    async fn mark_alert(&self, id: i64, is_marked: bool) -> anyhow::Result<Alert>;
    async fn mention_stats(&self, filter: &MentionFilter) -> anyhow::Result<MentionStats>;
    async fn analytics(&self, query: &DashboardQuery) -> anyhow::Result<AnalyticsReport>;
}

/// Source of "now", injectable so expiry can be tested at exact boundaries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
