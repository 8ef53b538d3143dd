// Application settings, layered with the 'config' crate and 'dotenv'

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "https://tudocarro-backend.onrender.com/api/cars";
pub const DEFAULT_MARKETPLACE_HOST: &str = "https://www.webmotors.com.br";
pub const DEFAULT_NEWS_QUERY: &str = "carros leilão indústria";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Base URL of the vehicle pricing backend (brands/models/years/details)
    pub api_base_url: String,
    // Overrides the origin derived from api_base_url for the news endpoints
    pub news_origin: Option<String>,
    pub news_query: String,
    pub marketplace_host: String,
    pub server_address: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            news_origin: None,
            news_query: DEFAULT_NEWS_QUERY.to_string(),
            marketplace_host: DEFAULT_MARKETPLACE_HOST.to_string(),
            server_address: "127.0.0.1:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let defaults = Settings::default();
        let builder = Config::builder()
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("news_query", defaults.news_query)?
            .set_default("marketplace_host", defaults.marketplace_host)?
            .set_default("server_address", defaults.server_address)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP_API_BASE_URL)
            .add_source(Environment::with_prefix("APP").try_parsing(true));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Origin serving `/api/news/*`.
    pub fn news_origin(&self) -> String {
        match self.news_origin.as_deref().map(str::trim) {
            Some(origin) if !origin.is_empty() => origin.trim_end_matches('/').to_string(),
            _ => backend_origin(&self.api_base_url),
        }
    }
}

/// Strips everything from the first `/api/` on, or just the trailing slash
/// when the URL has no API path.
pub fn backend_origin(api_base_url: &str) -> String {
    match api_base_url.split_once("/api/") {
        Some((origin, _)) => origin.to_string(),
        None => api_base_url.trim_end_matches('/').to_string(),
    }
}
