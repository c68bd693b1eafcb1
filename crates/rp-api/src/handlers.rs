//! # rp-api Handlers
//!
//! Each handler validates the request, calls one service and records the outcome.

use actix_web::{web, HttpResponse};
use rp_core::{
    AlertType, AppError, DashboardQuery, MentionFilter, PageRequest, ResponseRequest, Sentiment,
};
use rp_services::{classify, AlertService, DashboardService, MentionService, ResponseService};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ApiError;
use crate::metrics::Metrics;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub responses: ResponseService,
    pub dashboard: DashboardService,
    pub mentions: MentionService,
    pub alerts: AlertService,
    pub metrics: Metrics,
    /// Product and period used when a dashboard request leaves them out.
    pub default_query: DashboardQuery,
}

type ApiResult = Result<HttpResponse, ApiError>;

fn tracked(data: &AppState, route: &str, result: ApiResult) -> ApiResult {
    data.metrics.record_request(route, result.is_ok());
    result
}

async fn draft_response(data: &AppState, request: &ResponseRequest) -> ApiResult {
    if request.mention_id.trim().is_empty() {
        return Err(AppError::ValidationError("mention_id must not be empty".into()).into());
    }
    let response = data.responses.generate(request).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn generate_response(data: web::Data<AppState>, body: web::Json<ResponseRequest>) -> ApiResult {
    let result = draft_response(&data, &body).await;
    tracked(&data, "responses.generate", result)
}

#[derive(Deserialize)]
pub struct SentimentBody {
    pub text: String,
}

#[derive(Serialize)]
struct SentimentReply {
    sentiment: Sentiment,
}

pub async fn classify_sentiment(data: web::Data<AppState>, body: web::Json<SentimentBody>) -> ApiResult {
    let sentiment = classify(&body.text);
    tracked(&data, "sentiment", Ok(HttpResponse::Ok().json(SentimentReply { sentiment })))
}

#[derive(Deserialize)]
pub struct DashboardParams {
    pub product_id: Option<i64>,
    pub days_back: Option<u32>,
}

impl DashboardParams {
    fn resolve(&self, defaults: DashboardQuery) -> DashboardQuery {
        DashboardQuery {
            product_id: self.product_id.unwrap_or(defaults.product_id),
            days_back: self.days_back.unwrap_or(defaults.days_back),
        }
    }
}

pub async fn dashboard(data: web::Data<AppState>, params: web::Query<DashboardParams>) -> ApiResult {
    let query = params.resolve(data.default_query);
    let view = data.dashboard.activate(&query).await;
    if view.insight_key.is_some() {
        data.metrics.record_cache_lookup(view.insights_cached);
    }
    tracked(&data, "dashboard", Ok(HttpResponse::Ok().json(view)))
}

pub async fn regenerate_insights(data: web::Data<AppState>, params: web::Query<DashboardParams>) -> ApiResult {
    let query = params.resolve(data.default_query);
    let view = data.dashboard.regenerate(&query).await;
    tracked(&data, "dashboard.regenerate", Ok(HttpResponse::Ok().json(view)))
}

pub async fn analytics(data: web::Data<AppState>, params: web::Query<DashboardParams>) -> ApiResult {
    let query = params.resolve(data.default_query);
    let result = data
        .dashboard
        .analytics(&query)
        .await
        .map(|report| HttpResponse::Ok().json(report))
        .map_err(ApiError::from);
    tracked(&data, "analytics", result)
}

pub async fn clear_insights(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let key = path.into_inner();
    let result = data
        .dashboard
        .clear_insights(&key)
        .await
        .map(|()| HttpResponse::NoContent().finish())
        .map_err(ApiError::from);
    tracked(&data, "dashboard.clear", result)
}

/// `platforms` is comma-separated.
#[derive(Deserialize)]
pub struct MentionParams {
    pub product_id: Option<i64>,
    pub platforms: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub intent: Option<String>,
    pub priority: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl MentionParams {
    fn filter(&self) -> MentionFilter {
        MentionFilter {
            product_id: self.product_id,
            platforms: self
                .platforms
                .as_deref()
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            sentiment: self.sentiment,
            intent: self.intent.clone(),
            priority: self.priority.clone(),
            from_date: self.from_date.clone(),
            to_date: self.to_date.clone(),
        }
    }

    fn page(&self) -> PageRequest {
        page_or_default(self.page, self.page_size)
    }
}

fn page_or_default(page: Option<u32>, page_size: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest::new(page.unwrap_or(defaults.page), page_size.unwrap_or(defaults.page_size))
}

pub async fn list_mentions(data: web::Data<AppState>, params: web::Query<MentionParams>) -> ApiResult {
    let page = data.mentions.list(&params.filter(), params.page()).await;
    tracked(&data, "mentions.list", Ok(HttpResponse::Ok().json(page)))
}

pub async fn get_mention(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let id = path.into_inner();
    let result = match data.mentions.get(&id).await {
        Some(mention) => Ok(HttpResponse::Ok().json(mention)),
        None => Err(AppError::NotFound("Mention".into(), id).into()),
    };
    tracked(&data, "mentions.get", result)
}

pub async fn mention_stats(data: web::Data<AppState>, body: web::Json<MentionFilter>) -> ApiResult {
    let result = match data.mentions.stats(&body).await {
        Some(stats) => Ok(HttpResponse::Ok().json(stats)),
        None => Err(AppError::Upstream("mention stats unavailable".into()).into()),
    };
    tracked(&data, "mentions.stats", result)
}

#[derive(Deserialize)]
pub struct MarkParams {
    pub is_marked: bool,
}

#[derive(Serialize)]
struct MarkReply {
    id: String,
    is_marked: bool,
    updated: bool,
}

pub async fn mark_mention(
    data: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<MarkParams>,
) -> ApiResult {
    let id = path.into_inner();
    let updated = data.mentions.mark(&id, params.is_marked).await;
    let reply = MarkReply { id, is_marked: params.is_marked, updated };
    tracked(&data, "mentions.mark", Ok(HttpResponse::Ok().json(reply)))
}

#[derive(Deserialize)]
pub struct AlertParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub alert_type: Option<AlertType>,
}

/// Alerts page through in twenties.
const ALERT_PAGE_SIZE: u32 = 20;

pub async fn list_alerts(data: web::Data<AppState>, params: web::Query<AlertParams>) -> ApiResult {
    let page = page_or_default(params.page, Some(params.page_size.unwrap_or(ALERT_PAGE_SIZE)));
    let alerts = data.alerts.list(page, params.alert_type).await;
    tracked(&data, "alerts.list", Ok(HttpResponse::Ok().json(alerts)))
}

pub async fn mark_alert(data: web::Data<AppState>, path: web::Path<i64>, body: web::Json<MarkParams>) -> ApiResult {
    let result = data
        .alerts
        .mark(path.into_inner(), body.is_marked)
        .await
        .map(|alert| HttpResponse::Ok().json(alert))
        .map_err(ApiError::from);
    tracked(&data, "alerts.mark", result)
}

pub async fn acknowledge_alert(data: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    let result = data
        .alerts
        .acknowledge(path.into_inner())
        .await
        .map(|alert| HttpResponse::Ok().json(alert))
        .map_err(ApiError::from);
    tracked(&data, "alerts.acknowledge", result)
}

pub async fn resolve_alert(data: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    let result = data
        .alerts
        .resolve(path.into_inner())
        .await
        .map(|alert| HttpResponse::Ok().json(alert))
        .map_err(ApiError::from);
    tracked(&data, "alerts.resolve", result)
}

pub async fn alert_stats(data: web::Data<AppState>) -> ApiResult {
    let stats = data.alerts.stats().await;
    tracked(&data, "alerts.stats", Ok(HttpResponse::Ok().json(stats)))
}

pub async fn metrics(data: web::Data<AppState>) -> HttpResponse {
    match data.metrics.render() {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/openmetrics-text; version=1.0.0; charset=utf-8")
            .body(body),
        Err(err) => {
            error!(error = %err, "encoding metrics failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}
