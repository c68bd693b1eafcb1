//! # rp-backend-http
//! repute/crates/rp-plugins/rp-backend-http/src/lib.rs
//! `BackendApi` over the analytics REST service.
//! Features: typed DTOs for dashboard, mention, alert and analytics payloads; 1-indexed paging.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use rp_core::models::{
    Alert, AlertPage, AlertType, AnalyticsReport, DashboardQuery, DashboardSnapshot, Mention,
    MentionFilter, MentionPage, MentionStats, PageRequest,
};
use rp_core::traits::BackendApi;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// The backend sits behind an ngrok tunnel; without this header it serves an HTML interstitial.
const NGROK_SKIP_HEADER: &str = "ngrok-skip-browser-warning";

#[derive(Deserialize)]
struct Pagination {
    #[serde(default)]
    total_items: u64,
}

#[derive(Deserialize)]
struct MentionsResponse {
    #[serde(default)]
    mentions: Vec<Mention>,
    pagination: Option<Pagination>,
}

#[derive(Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    alerts: Vec<Alert>,
    pagination: Option<Pagination>,
}

#[derive(Serialize)]
struct MarkBody {
    is_marked: bool,
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(NGROK_SKIP_HEADER, HeaderValue::from_static("true"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("building backend HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends `req` and decodes a JSON body; `None` on 404.
    async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> anyhow::Result<Option<T>> {
        let res = req.send().await.with_context(|| format!("requesting {what}"))?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let res = res
            .error_for_status()
            .with_context(|| format!("backend rejected {what}"))?;
        let body = res.json().await.with_context(|| format!("decoding {what}"))?;
        Ok(Some(body))
    }

    async fn fetch_required<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> anyhow::Result<T> {
        self.fetch(req, what)
            .await?
            .with_context(|| format!("{what} not found"))
    }
}

fn period_params(query: &DashboardQuery) -> [(&'static str, String); 2] {
    [
        ("product_id", query.product_id.to_string()),
        ("days_back", query.days_back.to_string()),
    ]
}

fn mention_params(filter: &MentionFilter, page: PageRequest) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(id) = filter.product_id {
        params.push(("product_id", id.to_string()));
    }
    for platform in &filter.platforms {
        params.push(("platform", platform.clone()));
    }
    if let Some(sentiment) = filter.sentiment {
        params.push(("sentiment", sentiment.as_str().to_string()));
    }
    let optional = [
        ("intent", &filter.intent),
        ("priority", &filter.priority),
        ("from_date", &filter.from_date),
        ("to_date", &filter.to_date),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            params.push((name, value.clone()));
        }
    }
    params.push(("page", page.page.to_string()));
    params.push(("page_size", page.page_size.to_string()));
    params
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn dashboard(&self, query: &DashboardQuery) -> anyhow::Result<DashboardSnapshot> {
        debug!(product_id = query.product_id, days_back = query.days_back, "fetching dashboard");
        let req = self.client.get(self.url("/dashboard")).query(&period_params(query));
        self.fetch_required(req, "dashboard").await
    }

    async fn mentions(&self, filter: &MentionFilter, page: PageRequest) -> anyhow::Result<MentionPage> {
        let req = self
            .client
            .get(self.url("/mentions"))
            .query(&mention_params(filter, page));
        let body: MentionsResponse = self.fetch_required(req, "mentions").await?;
        let total = body
            .pagination
            .map_or(body.mentions.len() as u64, |p| p.total_items);
        Ok(MentionPage { mentions: body.mentions, total })
    }

    async fn mention(&self, id: &str) -> anyhow::Result<Option<Mention>> {
        let req = self.client.get(self.url(&format!("/mentions/{id}")));
        self.fetch(req, "mention").await
    }

    async fn mark_mention(&self, id: &str, is_marked: bool) -> anyhow::Result<()> {
        self.client
            .patch(self.url(&format!("/mentions/{id}/mark")))
            .query(&[("is_marked", is_marked)])
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("requesting mention mark")?
            .error_for_status()
            .context("backend rejected mention mark")?;
        Ok(())
    }

    async fn alerts(&self, page: PageRequest, alert_type: Option<AlertType>) -> anyhow::Result<AlertPage> {
        let mut params = vec![
            ("page", page.page.to_string()),
            ("page_size", page.page_size.to_string()),
        ];
        if let Some(kind) = alert_type {
            params.push(("alert_type", kind.as_str().to_string()));
        }
        let req = self.client.get(self.url("/alerts")).query(&params);
        let body: AlertsResponse = self.fetch_required(req, "alerts").await?;
        let total = body
            .pagination
            .map_or(body.alerts.len() as u64, |p| p.total_items);
        Ok(AlertPage { alerts: body.alerts, total })
    }

    async fn mark_alert(&self, id: i64, is_marked: bool) -> anyhow::Result<Alert> {
        let req = self
            .client
            .post(self.url(&format!("/alerts/{id}/mark")))
            .json(&MarkBody { is_marked });
        self.fetch_required(req, "alert mark").await
    }

    async fn mention_stats(&self, filter: &MentionFilter) -> anyhow::Result<MentionStats> {
        let req = self.client.post(self.url("/mentions/stats")).json(filter);
        self.fetch_required(req, "mention stats").await
    }

    async fn analytics(&self, query: &DashboardQuery) -> anyhow::Result<AnalyticsReport> {
        debug!(product_id = query.product_id, days_back = query.days_back, "fetching analytics");
        let req = self.client.get(self.url("/analytics")).query(&period_params(query));
        self.fetch_required(req, "analytics").await
    }
}
