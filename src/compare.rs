// Side-by-side comparison of two vehicles, each resolved through its own
// selection chain

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::fipe_api::VehicleLookup;
use crate::labels::{drive_label, fuel_label, transmission_label, vehicle_type_label};
use crate::models::{SpecsRecord, VehicleDetails};
use crate::resolver::{Level, LookupSession, SelectionResolver, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonSlot {
    A,
    B,
}

impl ComparisonSlot {
    pub fn as_tag(&self) -> &'static str {
        match self {
            ComparisonSlot::A => "A",
            ComparisonSlot::B => "B",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ComparisonSlot::A => "Carro A",
            ComparisonSlot::B => "Carro B",
        }
    }
}

/// What the user typed for one side: brand and model names, year code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotQuery {
    pub brand: String,
    pub model: String,
    pub year: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub title: String,
    pub subtitle: String,
    pub price: String,
    pub reference_month: String,
    pub fipe_code: String,
    pub vehicle_type: String,
    pub fuel: String,
    pub engine: String,
    pub transmission: String,
    pub drive: String,
    pub displacement: Option<String>,
    pub city_mpg: Option<String>,
    pub highway_mpg: Option<String>,
}

impl VehicleSummary {
    pub fn from_details(details: &VehicleDetails) -> Self {
        let fipe = &details.fipe;
        let specs = details.specs.clone().unwrap_or_default();
        let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

        let title = [fipe.brand.as_deref(), fipe.model.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let subtitle = [fipe.model_year.as_deref(), fipe.fuel.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" • ");

        Self {
            title,
            subtitle,
            price: or_dash(&fipe.price),
            reference_month: or_dash(&fipe.reference_month),
            fipe_code: or_dash(&fipe.fipe_code),
            vehicle_type: vehicle_type_label(fipe.vehicle_type),
            fuel: fuel_label(specs.fuel_type.as_deref().or(fipe.fuel.as_deref())),
            engine: or_dash(&specs.engine),
            transmission: transmission_label(specs.transmission.as_deref()),
            drive: drive_label(specs.drive.as_deref()),
            displacement: specs.displacement.as_ref().map(|d| format!("{d} L")),
            city_mpg: SpecsRecord::mpg_figure(specs.city_mpg.as_deref()).map(|m| format!("{m} mpg")),
            highway_mpg: SpecsRecord::mpg_figure(specs.highway_mpg.as_deref())
                .map(|m| format!("{m} mpg")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub slot: ComparisonSlot,
    pub label: &'static str,
    pub step: Step,
    pub brand_query: String,
    pub model_query: String,
    pub year_code: Option<String>,
    pub details: Option<VehicleDetails>,
    pub summary: Option<VehicleSummary>,
    pub error: Option<String>,
}

impl SlotView {
    pub fn from_resolver(slot: ComparisonSlot, resolver: &SelectionResolver) -> Self {
        let details = resolver.details().cloned();
        Self {
            slot,
            label: slot.display_name(),
            step: resolver.step(),
            brand_query: resolver.brand_query().to_string(),
            model_query: resolver.model_query().to_string(),
            year_code: resolver.year_code().map(str::to_string),
            summary: details.as_ref().map(VehicleSummary::from_details),
            details,
            error: resolver.first_error().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub a: SlotView,
    pub b: SlotView,
    pub can_compare: bool,
    pub error: Option<String>,
}

/// Resolves both slots concurrently. The brand list is loaded once and
/// handed to each slot; after that the two chains share nothing.
pub async fn compare_vehicles<L>(lookup: Arc<L>, a: &SlotQuery, b: &SlotQuery) -> Comparison
where
    L: VehicleLookup + ?Sized,
{
    let mut loader = LookupSession::new(Arc::clone(&lookup));
    loader.load_brands().await;
    let brands_loaded = loader.into_resolver();
    let error = brands_loaded.error(Level::Brands).map(str::to_string);
    let brands = brands_loaded.brands().to_vec();

    let session_a = LookupSession::with_brands(Arc::clone(&lookup), brands.clone());
    let session_b = LookupSession::with_brands(lookup, brands);

    let (a, b) = futures::join!(
        resolve_slot(ComparisonSlot::A, session_a, a),
        resolve_slot(ComparisonSlot::B, session_b, b),
    );

    let can_compare = a.details.is_some() && b.details.is_some();
    tracing::info!(
        step_a = ?a.step,
        step_b = ?b.step,
        can_compare,
        "Comparison resolved"
    );

    Comparison { a, b, can_compare, error }
}

async fn resolve_slot<L>(
    slot: ComparisonSlot,
    mut session: LookupSession<L>,
    query: &SlotQuery,
) -> SlotView
where
    L: VehicleLookup + ?Sized,
{
    tracing::debug!(slot = slot.as_tag(), brand = %query.brand, model = %query.model, year = %query.year, "Resolving comparison slot");
    session.select_brand(query.brand.trim()).await;
    session.select_model(query.model.trim()).await;
    session.select_year(query.year.trim()).await;
    SlotView::from_resolver(slot, session.resolver())
}
