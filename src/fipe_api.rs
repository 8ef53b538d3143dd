// Functions to interact with the FIPE pricing backend (brands, models,
// years, details)

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::LookupError;
use crate::models::{Brand, Model, ModelsEnvelope, VehicleDetails, YearOption};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Read-only lookup service behind the Brand → Model → Year → Details chain.
#[async_trait]
pub trait VehicleLookup: Send + Sync {
    async fn brands(&self) -> Result<Vec<Brand>, LookupError>;

    async fn models(&self, brand: &str) -> Result<Vec<Model>, LookupError>;

    async fn years(&self, brand: &str, model: &str) -> Result<Vec<YearOption>, LookupError>;

    async fn details(
        &self,
        brand: &str,
        model: &str,
        year: &str,
    ) -> Result<VehicleDetails, LookupError>;
}

// Shared client builder; the server creates one at startup and passes it around
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build reqwest client")
}

#[derive(Debug, Clone)]
pub struct FipeClient {
    client: Client,
    base_url: String,
}

impl FipeClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LookupError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(url = %url, "Fetching from pricing backend");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| LookupError::Http { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Pricing backend returned an error status");
            return Err(LookupError::Status { url, status: status.as_u16() });
        }

        let body = response
            .text()
            .await
            .map_err(|source| LookupError::Http { url: url.clone(), source })?;

        serde_json::from_str(&body).map_err(|source| LookupError::Decode { url, source })
    }
}

#[async_trait]
impl VehicleLookup for FipeClient {
    async fn brands(&self) -> Result<Vec<Brand>, LookupError> {
        let brands: Vec<Brand> = self.get_json("brands").await?;
        if brands.is_empty() {
            tracing::warn!("Pricing backend returned no brands");
        }
        Ok(brands)
    }

    async fn models(&self, brand: &str) -> Result<Vec<Model>, LookupError> {
        let envelope: ModelsEnvelope = self.get_json(&format!("models/{brand}")).await?;
        Ok(envelope.modelos)
    }

    async fn years(&self, brand: &str, model: &str) -> Result<Vec<YearOption>, LookupError> {
        self.get_json(&format!("years/{brand}/{model}")).await
    }

    async fn details(
        &self,
        brand: &str,
        model: &str,
        year: &str,
    ) -> Result<VehicleDetails, LookupError> {
        self.get_json(&format!("details/{brand}/{model}/{year}")).await
    }
}
