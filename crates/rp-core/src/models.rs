//! # Domain Models
//!
//! These structs represent the entities exchanged between the reputation backend,
//! the LLM provider and callers of the services. Shapes received from the analytics
//! API may omit any field, so every such field is an `Option` and the consumers apply
//! explicit defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Polarity of a piece of customer content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tone of a drafted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    Official,
    Friendly,
    Technical,
}

impl ResponseStyle {
    pub const ALL: [ResponseStyle; 3] = [
        ResponseStyle::Official,
        ResponseStyle::Friendly,
        ResponseStyle::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStyle::Official => "official",
            ResponseStyle::Friendly => "friendly",
            ResponseStyle::Technical => "technical",
        }
    }
}

impl fmt::Display for ResponseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output language of a drafted response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLanguage {
    En,
    Uk,
}

impl ResponseLanguage {
    pub const ALL: [ResponseLanguage; 2] = [ResponseLanguage::En, ResponseLanguage::Uk];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseLanguage::En => "en",
            ResponseLanguage::Uk => "uk",
        }
    }
}

impl fmt::Display for ResponseLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to draft a reply to one mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRequest {
    pub mention_id: String,
    pub mention_content: String,
    pub style: ResponseStyle,
    pub language: ResponseLanguage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

/// A support resource attached to a drafted response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqLink {
    pub title: String,
    pub url: String,
    pub relevance_score: f32,
}

/// A drafted reply. Never deduplicated: every generation yields a new `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedResponse {
    pub id: String,
    pub mention_id: String,
    pub style: ResponseStyle,
    pub language: ResponseLanguage,
    pub content: String,
    pub action_checklist: Vec<String>,
    pub faq_links: Vec<FaqLink>,
    pub created_at: DateTime<Utc>,
}

// ── Dashboard snapshot ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardMeta {
    pub generated_at: Option<String>,
    pub product_id: Option<i64>,
    pub time_period_days: Option<u32>,
    pub total_mentions: Option<u64>,
    pub recent_mentions: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreInterpretation {
    pub status: Option<String>,
    pub description: Option<String>,
    pub action: Option<String>,
}

/// Scalar 0–100 reputation health computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationScore {
    pub current_score: Option<f64>,
    pub previous_score: Option<f64>,
    pub percentage_change: Option<f64>,
    pub change_direction: Option<String>,
    pub change_description: Option<String>,
    pub score_interpretation: Option<ScoreInterpretation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentCounts {
    pub positive: Option<u64>,
    pub negative: Option<u64>,
    pub neutral: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentPercentages {
    pub positive: Option<f64>,
    pub negative: Option<f64>,
    pub neutral: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentDistribution {
    pub counts: Option<SentimentCounts>,
    pub percentages: Option<SentimentPercentages>,
    pub total_mentions: Option<u64>,
    pub dominant_sentiment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopIssue {
    pub issue_category: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub total_mentions: Option<u64>,
    pub representative_platforms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformStats {
    pub platform: Option<String>,
    pub count: Option<u64>,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformDistribution {
    pub platforms: Option<Vec<PlatformStats>>,
    pub total_platforms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityShare {
    pub priority: Option<String>,
    pub count: Option<u64>,
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityBreakdown {
    pub priorities: Option<Vec<PriorityShare>>,
    pub total_mentions: Option<u64>,
    pub high_priority_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentActivity {
    pub total_recent_mentions: Option<u64>,
    pub avg_daily_mentions: Option<f64>,
    pub most_active_platform: Option<String>,
    pub most_common_intent: Option<String>,
    pub critical_issues_count: Option<u64>,
}

/// Aggregate analytics for one product over a period. Owned by the backend;
/// read-only here and used only as input to insight generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSnapshot {
    pub dashboard_data: Option<DashboardMeta>,
    pub top_issues_requiring_attention: Option<Vec<TopIssue>>,
    pub sentiment_distribution: Option<SentimentDistribution>,
    pub reputation_score: Option<ReputationScore>,
    pub platform_distribution: Option<PlatformDistribution>,
    pub priority_breakdown: Option<PriorityBreakdown>,
    pub recent_activity: Option<RecentActivity>,
}

/// Selects which product and period a dashboard covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub product_id: i64,
    pub days_back: u32,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self { product_id: 1, days_back: 30 }
    }
}

// ── Insights ────────────────────────────────────────────────────────────────

/// LLM-produced summary and recommendations over a [`DashboardSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInsight {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub urgent_actions: Vec<String>,
}

/// Persisted cache value: `{insights, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightCacheEntry {
    pub insights: DashboardInsight,
    pub timestamp: DateTime<Utc>,
}

/// Everything a dashboard needs after one activation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub snapshot: Option<DashboardSnapshot>,
    pub insight_key: Option<String>,
    pub insights: Option<DashboardInsight>,
    pub insights_cached: bool,
    pub insights_error: Option<String>,
    /// Whether asking again may succeed (timeout, generation already running, bad model output).
    pub insights_retryable: bool,
    pub alert_stats: AlertStats,
}

// ── Mentions ────────────────────────────────────────────────────────────────

/// The backend uses numeric ids, older payloads carry strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MentionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MentionId::Number(n) => write!(f, "{n}"),
            MentionId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
}

/// A unit of user-generated content about the monitored brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub id: MentionId,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords_matched: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub is_marked: Option<bool>,
}

/// Server-side filters for the mention feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionFilter {
    pub product_id: Option<i64>,
    pub platforms: Vec<String>,
    pub sentiment: Option<Sentiment>,
    pub intent: Option<String>,
    pub priority: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// 1-indexed pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MentionPage {
    pub mentions: Vec<Mention>,
    pub total: u64,
}

// ── Alerts ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Critical,
    HighPriority,
    Active,
    Resolved,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Critical => "critical",
            AlertType::HighPriority => "high_priority",
            AlertType::Active => "active",
            AlertType::Resolved => "resolved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default)]
    pub full_content: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub priority: Option<AlertSeverity>,
    #[serde(default)]
    pub original_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_marked: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub alert_type: Option<AlertType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertPage {
    pub alerts: Vec<Alert>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityCounts {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertTypeCounts {
    pub critical: u64,
    pub high_priority: u64,
    pub active: u64,
    pub resolved: u64,
}

/// Counters the backend computes over a filtered mention set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionStats {
    pub total_active: u64,
    pub by_severity: SeverityCounts,
    pub by_type: AlertTypeCounts,
    pub resolved_today: u64,
}

/// Headline alert counters shown next to the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    /// Alerts nobody has marked yet.
    pub total_active: u64,
    pub by_severity: SeverityCounts,
    pub by_type: AlertTypeCounts,
    pub resolved: u64,
}

impl AlertStats {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let mut stats = AlertStats::default();
        for alert in alerts {
            if alert.is_marked {
                stats.resolved += 1;
            } else {
                stats.total_active += 1;
            }
            match alert.priority {
                Some(AlertSeverity::Critical) => stats.by_severity.critical += 1,
                Some(AlertSeverity::High) => stats.by_severity.high += 1,
                Some(AlertSeverity::Medium) => stats.by_severity.medium += 1,
                Some(AlertSeverity::Low) => stats.by_severity.low += 1,
                None => {}
            }
            match alert.alert_type {
                Some(AlertType::Critical) => stats.by_type.critical += 1,
                Some(AlertType::HighPriority) => stats.by_type.high_priority += 1,
                Some(AlertType::Active) => stats.by_type.active += 1,
                Some(AlertType::Resolved) => stats.by_type.resolved += 1,
                None => {}
            }
        }
        stats
    }
}

// ── Analytics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsMeta {
    pub generated_at: Option<String>,
    pub product_id: Option<i64>,
    pub time_period_days: Option<u32>,
    pub total_mentions: Option<u64>,
    pub recent_mentions: Option<u64>,
    pub previous_period_mentions: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicTrend {
    pub topic: Option<String>,
    pub mentions: Option<u64>,
    pub sentiment: Option<String>,
    pub sentiment_raw: Option<f64>,
    pub trend: Option<String>,
    pub trend_raw: Option<f64>,
    pub priority: Option<f64>,
}

/// Period analytics. The platform and radar sections are chart payloads and are
/// passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsReport {
    pub analytics_data: Option<AnalyticsMeta>,
    pub sentiment_by_platform: Option<serde_json::Value>,
    pub topic_analysis: Option<serde_json::Value>,
    pub detailed_topic_analysis: Option<Vec<TopicTrend>>,
}
