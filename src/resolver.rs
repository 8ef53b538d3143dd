//! Cascading Brand → Model → Year → Details selection.
//!
//! [`SelectionResolver`] is a plain state machine: operations that need data
//! hand back a [`FetchRequest`] instead of doing I/O, and the caller feeds the
//! matching [`FetchOutcome`] back through [`SelectionResolver::apply`]. Every
//! request carries the selection key that issued it and a sequence number;
//! only the outcome of the latest request per level is accepted, so results
//! arriving after the user has moved on (even back to the same choice) are
//! recognised as stale and dropped.
//!
//! [`LookupSession`] pairs a resolver with a [`VehicleLookup`] for callers
//! that just want to issue a selection and await its data. Independent slots
//! (e.g. the two sides of a comparison) each get their own session.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::LookupError;
use crate::fipe_api::VehicleLookup;
use crate::models::{Brand, Model, VehicleDetails, YearOption};

// Ordered from the top of the chain down
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Brands,
    Models,
    Years,
    Details,
}

impl Level {
    pub fn error_message(&self) -> &'static str {
        match self {
            Level::Brands => "Erro ao carregar marcas",
            Level::Models => "Erro ao carregar modelos",
            Level::Years => "Erro ao carregar anos",
            Level::Details => "Erro ao carregar detalhes do veículo",
        }
    }
}

/// Progress through the chain, derived from which codes are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Brand,
    Model,
    Year,
    Details,
}

/// What to fetch, keyed by the codes selected when it was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchKey {
    Brands,
    Models { brand: String },
    Years { brand: String, model: String },
    Details { brand: String, model: String, year: String },
}

impl FetchKey {
    pub fn level(&self) -> Level {
        match self {
            FetchKey::Brands => Level::Brands,
            FetchKey::Models { .. } => Level::Models,
            FetchKey::Years { .. } => Level::Years,
            FetchKey::Details { .. } => Level::Details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub key: FetchKey,
    pub seq: u64,
}

impl FetchRequest {
    pub fn level(&self) -> Level {
        self.key.level()
    }

    /// Pairs a result with this request.
    pub fn answer(&self, result: FetchResult) -> FetchOutcome {
        FetchOutcome { seq: self.seq, result }
    }
}

#[derive(Debug)]
pub enum FetchResult {
    Brands(Result<Vec<Brand>, LookupError>),
    Models {
        brand: String,
        result: Result<Vec<Model>, LookupError>,
    },
    Years {
        brand: String,
        model: String,
        result: Result<Vec<YearOption>, LookupError>,
    },
    Details {
        brand: String,
        model: String,
        year: String,
        result: Result<VehicleDetails, LookupError>,
    },
}

impl FetchResult {
    pub fn level(&self) -> Level {
        match self {
            FetchResult::Brands(_) => Level::Brands,
            FetchResult::Models { .. } => Level::Models,
            FetchResult::Years { .. } => Level::Years,
            FetchResult::Details { .. } => Level::Details,
        }
    }
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub seq: u64,
    pub result: FetchResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    Stale,
}

/// Runs one request against the lookup collaborator.
pub async fn execute<L>(lookup: &L, request: FetchRequest) -> FetchOutcome
where
    L: VehicleLookup + ?Sized,
{
    let FetchRequest { key, seq } = request;
    let result = match key {
        FetchKey::Brands => FetchResult::Brands(lookup.brands().await),
        FetchKey::Models { brand } => {
            let result = lookup.models(&brand).await;
            FetchResult::Models { brand, result }
        }
        FetchKey::Years { brand, model } => {
            let result = lookup.years(&brand, &model).await;
            FetchResult::Years { brand, model, result }
        }
        FetchKey::Details { brand, model, year } => {
            let result = lookup.details(&brand, &model, &year).await;
            FetchResult::Details { brand, model, year, result }
        }
    };
    FetchOutcome { seq, result }
}

#[derive(Debug, Default)]
pub struct SelectionResolver {
    brand_query: String,
    model_query: String,
    brand_code: Option<String>,
    model_code: Option<String>,
    year_code: Option<String>,
    brands: Vec<Brand>,
    models: Vec<Model>,
    years: Vec<YearOption>,
    details: Option<VehicleDetails>,
    // Latest request issued per level that has not been answered yet
    pending: HashMap<Level, u64>,
    last_seq: u64,
    errors: HashMap<Level, String>,
}

impl SelectionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_brands(&mut self) -> FetchRequest {
        self.issue(FetchKey::Brands)
    }

    pub fn set_brand_query(&mut self, text: &str) -> Option<FetchRequest> {
        self.brand_query = text.to_string();
        if text.is_empty() {
            return self.change_brand(None);
        }

        match find_by_name(&self.brands, text, |b| &b.name) {
            Some(brand) if self.brand_code.as_deref() == Some(brand.code.as_str()) => None,
            Some(brand) => {
                let code = brand.code.clone();
                self.change_brand(Some(code))
            }
            None => self.change_brand(None),
        }
    }

    pub fn set_model_query(&mut self, text: &str) -> Option<FetchRequest> {
        self.model_query = text.to_string();
        if self.brand_code.is_none() {
            tracing::debug!("Model query ignored until a brand is resolved");
            return None;
        }
        if text.is_empty() {
            return self.change_model(None);
        }

        match find_by_name(&self.models, text, |m| &m.name) {
            Some(model) if self.model_code.as_deref() == Some(model.code.as_str()) => None,
            Some(model) => {
                let code = model.code.clone();
                self.change_model(Some(code))
            }
            None => self.change_model(None),
        }
    }

    pub fn set_year_code(&mut self, code: &str) -> Option<FetchRequest> {
        let (Some(brand), Some(model)) = (self.brand_code.clone(), self.model_code.clone()) else {
            tracing::debug!(code, "Year selection ignored until brand and model are resolved");
            return None;
        };

        let code = if code.is_empty() {
            None
        } else if self.years.iter().any(|y| y.code == code) {
            Some(code.to_string())
        } else {
            tracing::warn!(code, "Year code is not among the loaded options");
            None
        };

        // Same triple: the fetch already issued for it stands
        if code == self.year_code {
            return None;
        }

        self.year_code = code;
        self.clear_from(Level::Details);

        let year = self.year_code.clone()?;
        Some(self.issue(FetchKey::Details { brand, model, year }))
    }

    /// Feeds back the result of a request. Outcomes that don't answer the
    /// latest request of their level, or whose key no longer matches the
    /// current selection, are dropped.
    pub fn apply(&mut self, outcome: FetchOutcome) -> Applied {
        let FetchOutcome { seq, result } = outcome;
        let level = result.level();
        if self.pending.get(&level) != Some(&seq) || !self.key_matches(&result) {
            return self.stale(level, seq);
        }
        self.pending.remove(&level);

        match result {
            FetchResult::Brands(result) => match result {
                Ok(brands) => {
                    tracing::debug!(count = brands.len(), "Brands loaded");
                    self.brands = brands;
                    self.errors.remove(&level);
                }
                Err(e) => self.fail(level, &e),
            },
            FetchResult::Models { brand, result } => match result {
                Ok(models) => {
                    tracing::debug!(brand = %brand, count = models.len(), "Models loaded");
                    self.models = models;
                    self.errors.remove(&level);
                }
                Err(e) => self.fail(level, &e),
            },
            FetchResult::Years { brand, model, result } => match result {
                Ok(years) => {
                    tracing::debug!(brand = %brand, model = %model, count = years.len(), "Years loaded");
                    self.years = years;
                    self.errors.remove(&level);
                }
                Err(e) => self.fail(level, &e),
            },
            FetchResult::Details { result, .. } => match result {
                Ok(details) => {
                    self.details = Some(details);
                    self.errors.remove(&level);
                }
                Err(e) => self.fail(level, &e),
            },
        }
        Applied::Accepted
    }

    pub fn step(&self) -> Step {
        match (&self.brand_code, &self.model_code, &self.year_code) {
            (None, _, _) => Step::Brand,
            (Some(_), None, _) => Step::Model,
            (Some(_), Some(_), None) => Step::Year,
            (Some(_), Some(_), Some(_)) => Step::Details,
        }
    }

    pub fn brand_query(&self) -> &str {
        &self.brand_query
    }

    pub fn model_query(&self) -> &str {
        &self.model_query
    }

    pub fn brand_code(&self) -> Option<&str> {
        self.brand_code.as_deref()
    }

    pub fn model_code(&self) -> Option<&str> {
        self.model_code.as_deref()
    }

    pub fn year_code(&self) -> Option<&str> {
        self.year_code.as_deref()
    }

    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn years(&self) -> &[YearOption] {
        &self.years
    }

    pub fn details(&self) -> Option<&VehicleDetails> {
        self.details.as_ref()
    }

    pub fn selected_brand(&self) -> Option<&Brand> {
        let code = self.brand_code.as_deref()?;
        self.brands.iter().find(|b| b.code == code)
    }

    pub fn selected_model(&self) -> Option<&Model> {
        let code = self.model_code.as_deref()?;
        self.models.iter().find(|m| m.code == code)
    }

    pub fn is_loading(&self, level: Level) -> bool {
        self.pending.contains_key(&level)
    }

    pub fn error(&self, level: Level) -> Option<&str> {
        self.errors.get(&level).map(String::as_str)
    }

    /// Error of the highest level that has one.
    pub fn first_error(&self) -> Option<&str> {
        [Level::Brands, Level::Models, Level::Years, Level::Details]
            .into_iter()
            .find_map(|level| self.error(level))
    }

    fn issue(&mut self, key: FetchKey) -> FetchRequest {
        self.last_seq += 1;
        self.pending.insert(key.level(), self.last_seq);
        FetchRequest { key, seq: self.last_seq }
    }

    fn change_brand(&mut self, code: Option<String>) -> Option<FetchRequest> {
        tracing::debug!(from = ?self.brand_code, to = ?code, "Brand selection changed");
        self.brand_code = code;
        self.model_query.clear();
        self.clear_from(Level::Models);

        let brand = self.brand_code.clone()?;
        Some(self.issue(FetchKey::Models { brand }))
    }

    fn change_model(&mut self, code: Option<String>) -> Option<FetchRequest> {
        tracing::debug!(from = ?self.model_code, to = ?code, "Model selection changed");
        self.model_code = code;
        self.clear_from(Level::Years);

        let brand = self.brand_code.clone()?;
        let model = self.model_code.clone()?;
        Some(self.issue(FetchKey::Years { brand, model }))
    }

    // Drops everything at `level` and below it in the chain
    fn clear_from(&mut self, level: Level) {
        if level <= Level::Models {
            self.models.clear();
            self.model_code = None;
        }
        if level <= Level::Years {
            self.years.clear();
            self.year_code = None;
        }
        self.details = None;

        for dependent in [Level::Models, Level::Years, Level::Details] {
            if dependent >= level {
                self.pending.remove(&dependent);
                self.errors.remove(&dependent);
            }
        }
    }

    fn key_matches(&self, result: &FetchResult) -> bool {
        let current = |code: &Option<String>, key: &str| code.as_deref() == Some(key);
        match result {
            FetchResult::Brands(_) => true,
            FetchResult::Models { brand, .. } => current(&self.brand_code, brand),
            FetchResult::Years { brand, model, .. } => {
                current(&self.brand_code, brand) && current(&self.model_code, model)
            }
            FetchResult::Details { brand, model, year, .. } => {
                current(&self.brand_code, brand)
                    && current(&self.model_code, model)
                    && current(&self.year_code, year)
            }
        }
    }

    fn fail(&mut self, level: Level, error: &LookupError) {
        tracing::warn!(level = ?level, error = %error, "Lookup failed");
        self.errors.insert(level, level.error_message().to_string());
    }

    fn stale(&self, level: Level, seq: u64) -> Applied {
        tracing::debug!(level = ?level, seq, "Discarding stale lookup result");
        Applied::Stale
    }
}

// Case-insensitive exact match on the display name
fn find_by_name<'a, T>(items: &'a [T], text: &str, name: impl Fn(&T) -> &String) -> Option<&'a T> {
    let needle = text.to_lowercase();
    items.iter().find(|item| name(item).to_lowercase() == needle)
}

/// A resolver bound to its lookup collaborator.
pub struct LookupSession<L: VehicleLookup + ?Sized> {
    lookup: Arc<L>,
    resolver: SelectionResolver,
}

impl<L: VehicleLookup + ?Sized> LookupSession<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self {
            lookup,
            resolver: SelectionResolver::new(),
        }
    }

    /// Starts from an already loaded brand list, shared between slots.
    pub fn with_brands(lookup: Arc<L>, brands: Vec<Brand>) -> Self {
        let mut session = Self::new(lookup);
        let request = session.resolver.load_brands();
        session.resolver.apply(request.answer(FetchResult::Brands(Ok(brands))));
        session
    }

    pub fn resolver(&self) -> &SelectionResolver {
        &self.resolver
    }

    pub fn into_resolver(self) -> SelectionResolver {
        self.resolver
    }

    pub async fn load_brands(&mut self) {
        let request = self.resolver.load_brands();
        self.run(request).await;
    }

    pub async fn select_brand(&mut self, text: &str) {
        if let Some(request) = self.resolver.set_brand_query(text) {
            self.run(request).await;
        }
    }

    pub async fn select_model(&mut self, text: &str) {
        if let Some(request) = self.resolver.set_model_query(text) {
            self.run(request).await;
        }
    }

    pub async fn select_year(&mut self, code: &str) {
        if let Some(request) = self.resolver.set_year_code(code) {
            self.run(request).await;
        }
    }

    async fn run(&mut self, request: FetchRequest) {
        let outcome = execute(self.lookup.as_ref(), request).await;
        self.resolver.apply(outcome);
    }
}
