//! # Dashboard Insight Service
//!
//! Renders aggregate analytics into one analyst prompt and parses the JSON answer.
//! Prompt building never fails: absent numbers print as `0`/`0.0`, absent text as
//! `Unknown` or a "No ... available" line.

use rp_core::{AppError, CompletionRequest, DashboardInsight, DashboardSnapshot, LlmProvider, Result};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::llm::{complete_within, CallFailure, DEFAULT_LLM_TIMEOUT};

pub const INSIGHT_SYSTEM_PROMPT: &str = "You are a brand reputation analyst AI that provides clear, actionable insights based on data. Always respond with valid JSON.";

/// User-facing message for any failed insight generation.
pub const INSIGHT_FAILED: &str = "Failed to generate insights. Please try again.";

/// How many issues and platforms make it into the prompt.
const TOP_N: usize = 5;
const DEFAULT_PERIOD_DAYS: u32 = 30;

fn one_decimal(value: Option<f64>) -> String {
    format!("{:.1}", value.unwrap_or(0.0))
}

fn text_or<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|s| !s.is_empty()).unwrap_or(fallback)
}

fn signed_change(value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format!("+{v:.1}"),
        Some(v) if v < 0.0 => format!("{v:.1}"),
        _ => "0.0".to_string(),
    }
}

fn top_issues_section(snapshot: &DashboardSnapshot) -> String {
    let lines: Vec<String> = snapshot
        .top_issues_requiring_attention
        .iter()
        .flatten()
        .take(TOP_N)
        .enumerate()
        .map(|(i, issue)| {
            format!(
                "{}. {} ({} priority, {} mentions)",
                i + 1,
                text_or(issue.title.as_deref(), "Unknown"),
                text_or(issue.priority.as_deref(), "Unknown"),
                issue.total_mentions.unwrap_or(0)
            )
        })
        .collect();

    if lines.is_empty() {
        "No issues data available".to_string()
    } else {
        lines.join("\n")
    }
}

fn platforms_section(snapshot: &DashboardSnapshot) -> String {
    let lines: Vec<String> = snapshot
        .platform_distribution
        .as_ref()
        .and_then(|d| d.platforms.as_ref())
        .into_iter()
        .flatten()
        .take(TOP_N)
        .map(|p| {
            format!(
                "- {}: {} mentions ({}%)",
                text_or(p.platform.as_deref(), "Unknown"),
                p.count.unwrap_or(0),
                one_decimal(p.percentage)
            )
        })
        .collect();

    if lines.is_empty() {
        "No platform data available".to_string()
    } else {
        lines.join("\n")
    }
}

/// Renders the analyst prompt for `snapshot`.
pub fn build_dashboard_prompt(snapshot: &DashboardSnapshot) -> String {
    let score = snapshot.reputation_score.clone().unwrap_or_default();
    let interpretation = score.score_interpretation.clone().unwrap_or_default();
    let distribution = snapshot.sentiment_distribution.clone().unwrap_or_default();
    let counts = distribution.counts.clone().unwrap_or_default();
    let percentages = distribution.percentages.clone().unwrap_or_default();
    let meta = snapshot.dashboard_data.clone().unwrap_or_default();
    let activity = snapshot.recent_activity.clone().unwrap_or_default();

    let mut prompt = String::from(
        "You are a brand reputation analyst AI. Analyze the following brand reputation data and provide actionable insights.\n\n",
    );

    // Writing into a String cannot fail.
    let _ = write!(
        prompt,
        "REPUTATION SCORE:\n\
         - Current Score: {current}/100\n\
         - Previous Score: {previous}/100\n\
         - Change: {change}%\n\
         - Status: {status}\n\
         - Interpretation: {description}\n\n",
        current = one_decimal(score.current_score),
        previous = one_decimal(score.previous_score),
        change = signed_change(score.percentage_change),
        status = text_or(interpretation.status.as_deref(), "Unknown"),
        description = text_or(interpretation.description.as_deref(), "No interpretation available"),
    );

    let _ = write!(
        prompt,
        "SENTIMENT DISTRIBUTION (Total: {total} mentions):\n\
         - Positive: {pos} ({pos_pct}%)\n\
         - Negative: {neg} ({neg_pct}%)\n\
         - Neutral: {neu} ({neu_pct}%)\n\
         - Dominant Sentiment: {dominant}\n\n",
        total = distribution.total_mentions.unwrap_or(0),
        pos = counts.positive.unwrap_or(0),
        pos_pct = one_decimal(percentages.positive),
        neg = counts.negative.unwrap_or(0),
        neg_pct = one_decimal(percentages.negative),
        neu = counts.neutral.unwrap_or(0),
        neu_pct = one_decimal(percentages.neutral),
        dominant = text_or(distribution.dominant_sentiment.as_deref(), "Unknown"),
    );

    let _ = write!(
        prompt,
        "TOP ISSUES REQUIRING ATTENTION:\n{}\n\nPLATFORM DISTRIBUTION:\n{}\n\n",
        top_issues_section(snapshot),
        platforms_section(snapshot)
    );

    let _ = write!(
        prompt,
        "RECENT ACTIVITY (Last {days} days):\n\
         - Total Mentions: {total}\n\
         - Recent Mentions: {recent}\n\
         - Most Active Platform: {platform}\n\
         - Critical Issues: {critical}\n\n",
        days = meta.time_period_days.filter(|d| *d > 0).unwrap_or(DEFAULT_PERIOD_DAYS),
        total = meta.total_mentions.unwrap_or(0),
        recent = activity.total_recent_mentions.unwrap_or(0),
        platform = text_or(activity.most_active_platform.as_deref(), "Unknown"),
        critical = activity.critical_issues_count.unwrap_or(0),
    );

    prompt.push_str(
        "TASK:\n\
         Based on this data, provide:\n\n\
         1. **Executive Summary** (2-3 sentences): A brief overview of the brand's current reputation health.\n\n\
         2. **Key Findings** (3-5 bullet points): The most important insights from the data.\n\n\
         3. **Strategic Recommendations** (4-6 actionable items): Specific actions the brand should take to improve reputation, prioritized by impact.\n\n\
         4. **Urgent Actions** (2-3 items): Critical issues that need immediate attention.\n\n\
         Format your response as a JSON object with the following structure:\n\
         {\n  \"summary\": \"executive summary text\",\n  \"keyFindings\": [\"finding 1\", \"finding 2\", \"finding 3\"],\n  \"recommendations\": [\"recommendation 1\", \"recommendation 2\", \"recommendation 3\"],\n  \"urgentActions\": [\"action 1\", \"action 2\"]\n}\n\n\
         Be specific, actionable, and data-driven. Focus on what the brand should DO, not just what the data shows.",
    );

    prompt
}

/// Strict parse of the model's JSON answer. All four keys are required.
pub fn parse_insight(text: &str) -> Result<DashboardInsight> {
    serde_json::from_str(text.trim()).map_err(|err| {
        warn!(error = %err, "insight payload is not the expected JSON object");
        AppError::InsightGeneration(INSIGHT_FAILED.to_string())
    })
}

#[derive(Debug, Clone)]
pub struct InsightOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1500,
            timeout: DEFAULT_LLM_TIMEOUT,
        }
    }
}

pub struct InsightService {
    llm: Arc<dyn LlmProvider>,
    options: InsightOptions,
}

impl InsightService {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self::with_options(llm, InsightOptions::default())
    }

    pub fn with_options(llm: Arc<dyn LlmProvider>, options: InsightOptions) -> Self {
        Self { llm, options }
    }

    pub async fn generate(&self, snapshot: &DashboardSnapshot) -> Result<DashboardInsight> {
        let completion = CompletionRequest {
            system: INSIGHT_SYSTEM_PROMPT.to_string(),
            user: build_dashboard_prompt(snapshot),
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
            json_mode: true,
        };
        debug!(prompt_len = completion.user.len(), "generating dashboard insights");

        let text = match complete_within(
            self.llm.as_ref(),
            &completion,
            self.options.timeout,
            "insight generation",
        )
        .await
        {
            Ok(text) => text.unwrap_or_default(),
            Err(CallFailure::TimedOut(err)) => {
                warn!("insight generation timed out");
                return Err(err);
            }
            Err(CallFailure::Provider(err)) => {
                error!(error = %err, "insight generation failed");
                return Err(AppError::InsightGeneration(INSIGHT_FAILED.to_string()));
            }
        };

        let insight = parse_insight(&text)?;
        info!(findings = insight.key_findings.len(), urgent = insight.urgent_actions.len(), "dashboard insights generated");
        Ok(insight)
    }
}
