// Crate root: modules shared by the server binary and the integration tests

use std::sync::Arc;

use axum::extract::FromRef;

pub mod compare;
pub mod config;
pub mod error;
pub mod fipe_api;
pub mod labels;
pub mod models;
pub mod news;
pub mod resolver;
pub mod routes;
pub mod search_url;
pub mod validation;

use crate::config::Settings;
use crate::fipe_api::VehicleLookup;
use crate::news::NewsClient;

// Define the application state struct
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub lookup: Arc<dyn VehicleLookup>,
    pub news: Arc<NewsClient>,
}

impl AppState {
    /// Wires the real backends from settings over one shared HTTP client.
    pub fn from_settings(settings: Settings, client: reqwest::Client) -> Self {
        let lookup = fipe_api::FipeClient::new(client.clone(), &settings.api_base_url);
        let news = NewsClient::new(client, &settings.news_origin());
        Self {
            settings: Arc::new(settings),
            lookup: Arc::new(lookup),
            news: Arc::new(news),
        }
    }
}
