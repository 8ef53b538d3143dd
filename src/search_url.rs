//! Webmotors search deep-links.
//!
//! Only the public listing URL is produced; nothing here talks to the
//! marketplace. Known parameters (they follow the site, and may change with
//! it): `tipoveiculo`, `marca1`, `modelo1`, `anode`, `anoate`, `precode`,
//! `precoate`, `estado1`, `cidade1`, `page`.

use chrono::Datelike;
use unicode_normalization::UnicodeNormalization;
use url::form_urlencoded;

use crate::config::DEFAULT_MARKETPLACE_HOST;
use crate::models::{FilterCriteria, VehicleCondition};

/// Lower year bound used in the path when only a maximum is given.
pub const DEFAULT_YEAR_FLOOR: i32 = 1990;

#[derive(Debug, Clone)]
pub struct SearchUrlBuilder {
    host: String,
    current_year: i32,
}

impl Default for SearchUrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MARKETPLACE_HOST)
    }
}

impl SearchUrlBuilder {
    pub fn new(host: &str) -> Self {
        Self::with_year(host, chrono::Local::now().year())
    }

    pub fn with_year(host: &str, current_year: i32) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            current_year,
        }
    }

    /// Builds the listing URL. `None` stands for input that was not a filter
    /// object at all and yields the plain listing.
    pub fn build(&self, criteria: Option<&FilterCriteria>) -> String {
        let mut query = QueryParams::default();

        let Some(criteria) = criteria else {
            query.set("tipoveiculo", VehicleCondition::All.as_path_segment());
            query.set("page", "1");
            return format!("{}/carros/estoque?{}", self.host, query.encode());
        };

        let condition = criteria.condition.as_path_segment();
        query.set("tipoveiculo", condition);
        query.set("page", "1");

        let state = present(&criteria.state).map(state_code);
        let city = present(&criteria.city);
        let city_part = city.map(city_slug).filter(|s| !s.is_empty());

        let location = match (&state, &city_part) {
            (Some(uf), Some(city)) => format!("{}-{}", uf.to_lowercase(), city),
            (Some(uf), None) => uf.to_lowercase(),
            (None, _) => "estoque".to_string(),
        };
        let mut path = format!("{}/{}/{}", self.host, condition, location);

        let brand = present(&criteria.brand).map(brand_slug).filter(|s| !s.is_empty());
        let model = present(&criteria.model).map(model_slug).filter(|s| !s.is_empty());
        if let Some(brand) = &brand {
            path.push('/');
            path.push_str(brand);
            query.set("marca1", brand);
            if let Some(model) = &model {
                path.push('/');
                path.push_str(model);
                query.set("modelo1", model);
            }
        }

        if criteria.year_min.is_some() || criteria.year_max.is_some() {
            let from = criteria.year_min.unwrap_or(DEFAULT_YEAR_FLOOR);
            let to = criteria.year_max.unwrap_or(self.current_year + 1);
            path.push_str(&format!("/de.{from}/ate.{to}"));
            if let Some(year) = criteria.year_min {
                query.set("anode", &year.to_string());
            }
            if let Some(year) = criteria.year_max {
                query.set("anoate", &year.to_string());
            }
        }

        if let Some(price) = price_bound(criteria.price_min) {
            query.set("precode", &price);
        }
        if let Some(price) = price_bound(criteria.price_max) {
            query.set("precoate", &price);
        }

        if let Some(uf) = &state {
            query.set("estado1", uf);
        }
        if let Some(city) = city {
            query.set("cidade1", city);
        }

        format!("{}?{}", path, query.encode())
    }
}

/// Listing URL on the default host for the current calendar year.
pub fn build_search_url(criteria: &FilterCriteria) -> String {
    SearchUrlBuilder::default().build(Some(criteria))
}

// Insertion-ordered parameters; setting an existing key replaces it in place
#[derive(Debug, Default)]
struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    fn set(&mut self, key: &'static str, value: &str) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.0.push((key, value.to_string())),
        }
    }

    fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter().map(|(k, v)| (*k, v.as_str())))
            .finish()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn price_bound(value: Option<f64>) -> Option<String> {
    let price = value.filter(|p| p.is_finite() && *p >= 0.0)?;
    Some(format!("{:.0}", price.round()))
}

fn hyphenate_and_strip(lowered: &str) -> String {
    lowered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Brand name as a path segment: "Mercedes Benz" → "mercedes-benz".
pub fn brand_slug(name: &str) -> String {
    hyphenate_and_strip(&name.trim().to_lowercase())
}

/// Model name as a path segment.
///
/// Only the first word is kept ("GOL 1.0" → "gol"), except that a short
/// letter-only prefix split from its number is joined back ("C 200" →
/// "c200", "A 5" → "a5").
pub fn model_slug(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let Some(&first) = tokens.first() else {
        return String::new();
    };

    let joined;
    let base = match tokens.get(1) {
        Some(second)
            if first.chars().count() <= 2
                && !first.chars().any(|c| c.is_ascii_digit())
                && second.chars().any(|c| c.is_ascii_digit()) =>
        {
            joined = format!("{first}{second}");
            joined.as_str()
        }
        _ => first,
    };

    base.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// City name as a path segment: "São Paulo" → "sao-paulo".
pub fn city_slug(name: &str) -> String {
    let unaccented: String = name
        .trim()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();
    hyphenate_and_strip(&unaccented.to_lowercase())
}

/// Two-letter state code, uppercased.
pub fn state_code(state: &str) -> String {
    state.trim().to_uppercase().chars().take(2).collect()
}
