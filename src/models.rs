// Data structures exchanged with the pricing and news backends, plus the
// filter criteria consumed by the marketplace URL builder

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Vehicle brand as listed by the pricing backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "codigo", deserialize_with = "code_string")]
    pub code: String,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Model of a single brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "codigo", deserialize_with = "code_string")]
    pub code: String,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Year/fuel variant of a (brand, model) pair, e.g. "2020 Gasolina".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearOption {
    #[serde(rename = "codigo", deserialize_with = "code_string")]
    pub code: String,
    #[serde(rename = "nome", default)]
    pub label: String,
}

// The models endpoint wraps its list
#[derive(Debug, Deserialize)]
pub(crate) struct ModelsEnvelope {
    #[serde(default)]
    pub modelos: Vec<Model>,
}

// Pricing record as returned by the FIPE table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FipeRecord {
    #[serde(rename = "Valor", default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(rename = "MesReferencia", default, deserialize_with = "lenient_string")]
    pub reference_month: Option<String>,
    #[serde(rename = "Modelo", default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    #[serde(rename = "Marca", default, deserialize_with = "lenient_string")]
    pub brand: Option<String>,
    #[serde(rename = "AnoModelo", default, deserialize_with = "lenient_string")]
    pub model_year: Option<String>,
    #[serde(rename = "Combustivel", default, deserialize_with = "lenient_string")]
    pub fuel: Option<String>,
    #[serde(rename = "CodigoFipe", default, deserialize_with = "lenient_string")]
    pub fipe_code: Option<String>,
    #[serde(rename = "TipoVeiculo", default, deserialize_with = "lenient_i64")]
    pub vehicle_type: Option<i64>,
}

// Free-form technical attributes; any of them may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecsRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub engine: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub displacement: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cylinders: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transmission: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub drive: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub body_style: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city_mpg: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub highway_mpg: Option<String>,
}

impl SpecsRecord {
    /// Mileage figure worth showing; the backend sometimes puts fuel-grade
    /// notes ("premium ...") in the mpg fields.
    pub fn mpg_figure(value: Option<&str>) -> Option<&str> {
        value.filter(|v| !v.to_lowercase().contains("premium"))
    }
}

pub const MISSING_SPECS_MESSAGE: &str = "Nenhuma especificação extra encontrada para este modelo. Você ainda pode usar as informações da FIPE acima.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetails {
    pub fipe: FipeRecord,
    #[serde(default)]
    pub specs: Option<SpecsRecord>,
    #[serde(default)]
    pub has_extra_specs: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

impl VehicleDetails {
    pub fn has_specs(&self) -> bool {
        self.has_extra_specs.unwrap_or(self.specs.is_some())
    }

    pub fn specs_message(&self) -> &str {
        self.message.as_deref().unwrap_or(MISSING_SPECS_MESSAGE)
    }
}

/// Listing type on the marketplace; doubles as the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VehicleCondition {
    #[default]
    All,
    Used,
    New,
}

impl VehicleCondition {
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            VehicleCondition::All => "carros",
            VehicleCondition::Used => "carros-usados",
            VehicleCondition::New => "carros-novos",
        }
    }

    /// Unrecognized values fall back to `All`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "carros-usados" | "used" => VehicleCondition::Used,
            "carros-novos" | "new" => VehicleCondition::New,
            _ => VehicleCondition::All,
        }
    }
}

// Marketplace search filters, keyed like the original search form. Built
// only through `from_value`, which reads untyped input leniently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub condition: VehicleCondition,
}

impl FilterCriteria {
    /// Lenient reading of untyped input. Anything that is not a JSON object
    /// yields `None`; inside an object, blank strings, nulls and values of
    /// the wrong type are treated as absent, and numeric strings count as
    /// numbers.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |keys: &[&str]| keys.iter().find_map(|k| object.get(*k));

        Some(Self {
            brand: field(&["marca", "brand"]).and_then(text_value),
            model: field(&["modelo", "model"]).and_then(text_value),
            year_min: field(&["anoMin", "yearMin"]).and_then(year_value),
            year_max: field(&["anoMax", "yearMax"]).and_then(year_value),
            price_min: field(&["precoMin", "priceMin"]).and_then(number_value),
            price_max: field(&["precoMax", "priceMax"]).and_then(number_value),
            state: field(&["uf", "state"]).and_then(text_value),
            city: field(&["cidade", "city"]).and_then(text_value),
            condition: field(&["tipo", "vehicleCondition"])
                .and_then(Value::as_str)
                .map(VehicleCondition::parse)
                .unwrap_or_default(),
        })
    }
}

fn text_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn number_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

// Years must be whole numbers; 2019.5 is not a model year
fn year_value(value: &Value) -> Option<i32> {
    let number = number_value(value)?;
    if number.fract() != 0.0 || number < i32::MIN as f64 || number > i32::MAX as f64 {
        return None;
    }
    Some(number as i32)
}

/// One entry of the news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "source_name")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewsEnvelope {
    #[serde(default)]
    pub data: Vec<NewsItem>,
}

// Codes arrive as numbers from some FIPE mirrors and as strings from others
fn code_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number code, got {other}"
        ))),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

// GNews reports the source as `{ "name": ..., "url": ... }`
fn source_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    })
}
