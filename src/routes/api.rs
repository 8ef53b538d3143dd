// Handlers for backend API endpoints

use std::collections::HashMap;

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect},
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    compare::{compare_vehicles, SlotQuery},
    error::{AppError, AppResult},
    models::{FilterCriteria, NewsItem},
    news::NewsFeed,
    search_url::SearchUrlBuilder,
    validation::{selectable_year_range, validate_filters, YearRange},
    AppState,
};

// --- Response Wrappers ---

#[derive(Serialize)]
struct SearchUrlResponse {
    success: bool,
    url: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct NewsCard {
    #[serde(flatten)]
    item: NewsItem,
    summary: String,
}

#[derive(Serialize)]
struct NewsResponse {
    items: Vec<NewsCard>,
    error: Option<String>,
}

impl From<NewsFeed> for NewsResponse {
    fn from(feed: NewsFeed) -> Self {
        let items = feed
            .items
            .into_iter()
            .map(|item| NewsCard { summary: item.summary(), item })
            .collect();
        Self { items, error: feed.error }
    }
}

// --- Request Structs ---

#[derive(Deserialize)]
pub struct NewsQuery {
    q: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CompareQuery {
    brand_a: String,
    model_a: String,
    year_a: String,
    brand_b: String,
    model_b: String,
    year_b: String,
}

impl CompareQuery {
    fn slots(self) -> (SlotQuery, SlotQuery) {
        (
            SlotQuery { brand: self.brand_a, model: self.model_a, year: self.year_a },
            SlotQuery { brand: self.brand_b, model: self.model_b, year: self.year_b },
        )
    }
}

// --- Lookup proxies ---

pub async fn get_brands(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    tracing::info!("[HANDLER] /api/brands - Request received.");
    let brands = app_state.lookup.brands().await?;
    tracing::info!("[HANDLER] /api/brands - Returning {} brands.", brands.len());
    Ok(Json(brands))
}

pub async fn get_models(
    State(app_state): State<AppState>,
    Path(brand): Path<String>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("[HANDLER] /api/models/:brand - Request received for brand: {}", brand);
    let models = app_state.lookup.models(&brand).await?;
    tracing::info!("[HANDLER] /api/models/:brand - Returning {} models for brand {}.", models.len(), brand);
    Ok(Json(models))
}

pub async fn get_years(
    State(app_state): State<AppState>,
    Path((brand, model)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("[HANDLER] /api/years - Request received for {}/{}", brand, model);
    let years = app_state.lookup.years(&brand, &model).await?;
    Ok(Json(years))
}

pub async fn get_details(
    State(app_state): State<AppState>,
    Path((brand, model, year)): Path<(String, String, String)>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("[HANDLER] /api/details - Request received for {}/{}/{}", brand, model, year);
    let details = app_state.lookup.details(&brand, &model, &year).await?;
    if !details.has_specs() {
        tracing::debug!("[HANDLER] /api/details - No extra specs for {}/{}/{}", brand, model, year);
    }
    Ok(Json(details))
}

// --- Marketplace URL ---

/// Validates a filter object and answers with the marketplace URL for it.
/// Input that is not a JSON object yields the plain listing URL.
pub async fn search_url(
    State(app_state): State<AppState>,
    JsonExtract(body): JsonExtract<Value>,
) -> impl IntoResponse {
    tracing::info!("[HANDLER] /api/search-url - Request received.");
    let builder = SearchUrlBuilder::new(&app_state.settings.marketplace_host);

    let Some(criteria) = FilterCriteria::from_value(&body) else {
        tracing::debug!("[HANDLER] /api/search-url - Body is not an object, returning plain listing.");
        return (
            StatusCode::OK,
            Json(SearchUrlResponse { success: true, url: Some(builder.build(None)), error: None }),
        );
    };

    let range = year_range_for(&app_state, codes_from_value(&body)).await;
    match validate_filters(&criteria, &range) {
        Ok(()) => {
            let url = builder.build(Some(&criteria));
            tracing::info!("[HANDLER] /api/search-url - Built {}", url);
            (StatusCode::OK, Json(SearchUrlResponse { success: true, url: Some(url), error: None }))
        }
        Err(e) => {
            tracing::info!("[HANDLER] /api/search-url - Rejected filters: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(SearchUrlResponse { success: false, url: None, error: Some(e.to_string()) }),
            )
        }
    }
}

/// Same as `search_url` but for plain links: query string in, 303 out.
pub async fn go_to_marketplace(
    State(app_state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Redirect> {
    tracing::info!("[HANDLER] /go - Request received with {} parameters.", params.len());
    let body = Value::Object(
        params
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    );
    let criteria = FilterCriteria::from_value(&body)
        .ok_or_else(|| AppError::BadRequest("Filtros inválidos.".to_string()))?;

    let range = year_range_for(&app_state, codes_from_value(&body)).await;
    validate_filters(&criteria, &range)?;

    let url = SearchUrlBuilder::new(&app_state.settings.marketplace_host).build(Some(&criteria));
    tracing::info!("[HANDLER] /go - Redirecting to {}", url);
    Ok(Redirect::to(&url))
}

// Brand and model codes travel next to the filters; with both present the
// year bounds come from the loaded year options.
fn codes_from_value(value: &Value) -> Option<(String, String)> {
    let code = |key: &str| match value.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    Some((code("brandCode")?, code("modelCode")?))
}

async fn year_range_for(app_state: &AppState, codes: Option<(String, String)>) -> YearRange {
    let current_year = chrono::Local::now().year();
    let years = match codes {
        Some((brand, model)) => match app_state.lookup.years(&brand, &model).await {
            Ok(years) => years,
            Err(e) => {
                tracing::warn!("Could not load years for {}/{}: {}", brand, model, e);
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    selectable_year_range(&years, current_year)
}

// --- News ---

pub async fn get_news(
    State(app_state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> impl IntoResponse {
    let q = query
        .q
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| app_state.settings.news_query.clone());
    tracing::info!("[HANDLER] /api/news - Request received, query: {}", q);
    let feed = app_state.news.fetch_feed(&q).await;
    Json(NewsResponse::from(feed))
}

// --- Comparison ---

pub async fn compare(
    State(app_state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> impl IntoResponse {
    tracing::info!("[HANDLER] /api/compare - Request received: {:?}", query);
    let (a, b) = query.slots();
    let comparison = compare_vehicles(app_state.lookup.clone(), &a, &b).await;
    Json(comparison)
}
