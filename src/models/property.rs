use serde::de;
use serde::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_this_or_that::as_f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Casa,
    Departamento,
    Oficina,
    Terreno,
    Lote,
    Comercial,
    Estacionamiento,
}

impl PropertyType {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::Casa => "Casa",
            PropertyType::Departamento => "Departamento",
            PropertyType::Oficina => "Oficina",
            PropertyType::Terreno => "Terreno",
            PropertyType::Lote => "Lote",
            PropertyType::Comercial => "Comercial",
            PropertyType::Estacionamiento => "Estacionamiento",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Venta,
    Alquiler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Money {
    #[serde(rename = "$")]
    Dollar,
    Bs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Nuevo,
    Usado,
    #[serde(rename = "En construcción")]
    EnConstruccion,
}

/*
   Position stored as a nested object. Values are numeric but older
   exports carry them as strings, hence the lenient decode.
*/
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(deserialize_with = "as_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "as_f64")]
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub transaction: TransactionType,
    pub address: String,
    pub money: Money,
    pub price: f64,
    pub square_meters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_square_meters: Option<f64>,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_spaces: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<Coordinate>,
    #[serde(
        default,
        deserialize_with = "lat_lng_compat",
        skip_serializing_if = "Option::is_none"
    )]
    pub lat: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lat_lng_compat",
        skip_serializing_if = "Option::is_none"
    )]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_room: Option<bool>,
}

// Custom deserialization for the root-level lat/lng fields as they predate
// the nested coordinate object and can be a number or a String. Unparsable
// values read as absent so one bad row cannot reject the whole collection.
fn lat_lng_compat<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s.trim().parse().ok(),
        Some(Value::Number(num)) => num.as_f64(),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(de::Error::custom(format!(
                "expected number or string for lat/lng, got {}",
                other
            )))
        }
    })
}

impl Property {
    /// Canonical position regardless of which historical shape the record
    /// was stored in. The nested coordinate wins when both are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        if let Some(coordinate) = &self.coordinate {
            return Some((coordinate.lat, coordinate.lng));
        }
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// One marker on the map view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapPoint {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
}

/// Derives the set of plottable points, dropping every property whose
/// position does not resolve to finite numbers.
pub fn map_points(properties: &[Property]) -> Vec<MapPoint> {
    properties
        .iter()
        .filter_map(|property| {
            let (lat, lng) = property.position()?;
            if lat.is_finite() && lng.is_finite() {
                Some(MapPoint {
                    id: property.id.clone(),
                    lat,
                    lng,
                })
            } else {
                None
            }
        })
        .collect()
}
