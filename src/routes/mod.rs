// Route definitions

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

mod api;

pub fn create_router(app_state: AppState) -> Router {
    // Lookup proxies, URL building, news and comparison
    let api_router = Router::new()
        .route("/brands", get(api::get_brands))
        .route("/models/:brand", get(api::get_models))
        .route("/years/:brand/:model", get(api::get_years))
        .route("/details/:brand/:model/:year", get(api::get_details))
        .route("/search-url", post(api::search_url))
        .route("/news", get(api::get_news))
        .route("/compare", get(api::compare))
        .with_state(app_state.clone());

    Router::new()
        .route("/go", get(api::go_to_marketplace))
        .nest("/api", api_router)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
