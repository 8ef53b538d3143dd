// Checks run on search filters before a marketplace URL is built

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{FilterCriteria, YearOption};

/// First year offered when no year options are loaded.
pub const FALLBACK_FIRST_YEAR: i32 = 2000;

static LEADING_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})").expect("leading year pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Ano mínimo não pode ser maior que o ano máximo.")]
    YearOrder { min: i32, max: i32 },
    #[error("Preço mínimo não pode ser maior que o preço máximo.")]
    PriceOrder { min: f64, max: f64 },
    #[error("Ano mínimo deve estar entre {} e {}.", .range.min, .range.max)]
    YearMinOutOfRange { year: i32, range: YearRange },
    #[error("Ano máximo deve estar entre {} e {}.", .range.min, .range.max)]
    YearMaxOutOfRange { year: i32, range: YearRange },
    #[error("Preço mínimo não pode ser negativo.")]
    NegativePriceMin(f64),
    #[error("Preço máximo não pode ser negativo.")]
    NegativePriceMax(f64),
}

/// Years a user may pick for the loaded (brand, model) pair.
///
/// Each option contributes the 4-digit year its label starts with (the code
/// is used when the label is empty); options without one are skipped. With
/// nothing loaded the range is `2000..=current_year`; with options loaded
/// but none carrying a year it widens to `1990..=current_year + 1`.
pub fn selectable_year_range(years: &[YearOption], current_year: i32) -> YearRange {
    if years.is_empty() {
        return YearRange { min: FALLBACK_FIRST_YEAR, max: current_year };
    }

    let parsed: Vec<i32> = years
        .iter()
        .filter_map(|option| {
            let text = if option.label.is_empty() { &option.code } else { &option.label };
            LEADING_YEAR
                .captures(text)
                .and_then(|caps| caps[1].parse().ok())
        })
        .collect();

    match (parsed.iter().min(), parsed.iter().max()) {
        (Some(&min), Some(&max)) => YearRange { min, max },
        _ => {
            tracing::debug!(options = years.len(), "No year options carry a leading year");
            YearRange { min: crate::search_url::DEFAULT_YEAR_FLOOR, max: current_year + 1 }
        }
    }
}

/// Rejects the first inconsistent combination found.
pub fn validate_filters(criteria: &FilterCriteria, range: &YearRange) -> Result<(), ValidationError> {
    if let (Some(min), Some(max)) = (criteria.year_min, criteria.year_max) {
        if min > max {
            return Err(ValidationError::YearOrder { min, max });
        }
    }
    if let (Some(min), Some(max)) = (criteria.price_min, criteria.price_max) {
        if min > max {
            return Err(ValidationError::PriceOrder { min, max });
        }
    }
    if let Some(year) = criteria.year_min.filter(|y| !range.contains(*y)) {
        return Err(ValidationError::YearMinOutOfRange { year, range: *range });
    }
    if let Some(year) = criteria.year_max.filter(|y| !range.contains(*y)) {
        return Err(ValidationError::YearMaxOutOfRange { year, range: *range });
    }
    if let Some(price) = criteria.price_min.filter(|p| *p < 0.0) {
        return Err(ValidationError::NegativePriceMin(price));
    }
    if let Some(price) = criteria.price_max.filter(|p| *p < 0.0) {
        return Err(ValidationError::NegativePriceMax(price));
    }
    Ok(())
}
