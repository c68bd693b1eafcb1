//! Shared fixtures for the end-to-end tests.

use async_trait::async_trait;
use rp_core::{
    Alert, AlertPage, AlertType, AnalyticsReport, BackendApi, CompletionRequest, DashboardMeta,
    DashboardQuery, DashboardSnapshot, LlmProvider, Mention, MentionFilter, MentionPage,
    MentionStats, PageRequest, ReputationScore, SentimentCounts, SentimentDistribution, TopIssue,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Answers every call with a fixed text and remembers what it was asked.
pub struct ScriptedLlm {
    answer: Option<String>,
    calls: AtomicUsize,
    last: Mutex<Option<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last.lock() {
            *last = Some(request.clone());
        }
        Ok(self.answer.clone())
    }
}

/// Serves one snapshot and no mentions or alerts.
pub struct StaticBackend {
    pub snapshot: DashboardSnapshot,
}

#[async_trait]
impl BackendApi for StaticBackend {
    async fn dashboard(&self, _query: &DashboardQuery) -> anyhow::Result<DashboardSnapshot> {
        Ok(self.snapshot.clone())
    }

    async fn mentions(&self, _filter: &MentionFilter, _page: PageRequest) -> anyhow::Result<MentionPage> {
        Ok(MentionPage::default())
    }

    async fn mention(&self, _id: &str) -> anyhow::Result<Option<Mention>> {
        Ok(None)
    }

    async fn mark_mention(&self, _id: &str, _is_marked: bool) -> anyhow::Result<()> {
        Ok(())
    }

    async fn alerts(&self, _page: PageRequest, _alert_type: Option<AlertType>) -> anyhow::Result<AlertPage> {
        Ok(AlertPage::default())
    }

    async fn mark_alert(&self, id: i64, _is_marked: bool) -> anyhow::Result<Alert> {
        anyhow::bail!("alert {id} not found")
    }

    async fn mention_stats(&self, _filter: &MentionFilter) -> anyhow::Result<MentionStats> {
        Ok(MentionStats::default())
    }

    async fn analytics(&self, _query: &DashboardQuery) -> anyhow::Result<AnalyticsReport> {
        Ok(AnalyticsReport::default())
    }
}

pub const INSIGHT_JSON: &str = r#"{
  "summary": "Sentiment is mostly positive but app stability complaints are rising.",
  "keyFindings": ["58% positive", "Crashes dominate negative mentions"],
  "recommendations": ["Ship the crash fix", "Reply to App Store reviews"],
  "urgentActions": ["Acknowledge the outage publicly"]
}"#;

pub fn sample_snapshot(generated_at: &str) -> DashboardSnapshot {
    DashboardSnapshot {
        dashboard_data: Some(DashboardMeta {
            generated_at: Some(generated_at.into()),
            time_period_days: Some(30),
            total_mentions: Some(240),
            ..DashboardMeta::default()
        }),
        reputation_score: Some(ReputationScore {
            current_score: Some(68.2),
            previous_score: Some(71.0),
            percentage_change: Some(-3.9),
            ..ReputationScore::default()
        }),
        sentiment_distribution: Some(SentimentDistribution {
            counts: Some(SentimentCounts {
                positive: Some(140),
                negative: Some(60),
                neutral: Some(40),
            }),
            total_mentions: Some(240),
            ..SentimentDistribution::default()
        }),
        top_issues_requiring_attention: Some(vec![TopIssue {
            title: Some("App crashes on launch".into()),
            priority: Some("high".into()),
            total_mentions: Some(31),
            ..TopIssue::default()
        }]),
        ..DashboardSnapshot::default()
    }
}
