//! Routing service response DTOs.
//!
//! These mirror the GraphHopper `/route` JSON for the `pt` profile. Legs
//! come in two shapes told apart by their `type` field, so they are kept as
//! raw JSON on the path and decoded in a second step by [`Leg::from_value`].

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::Coordinates;

use super::error::DecodeError;

/// Top-level `/route` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteResponse {
    pub paths: Vec<PathDto>,
}

/// One candidate itinerary.
#[derive(Debug, Clone, Deserialize)]
pub struct PathDto {
    /// Total duration in milliseconds.
    #[serde(default)]
    pub time: u64,

    /// Full geometry of the path, when returned unencoded.
    #[serde(default)]
    pub points: Option<Geometry>,

    #[serde(default)]
    pub instructions: Vec<InstructionDto>,

    /// Legs, decoded lazily by [`Leg::from_value`].
    pub legs: Vec<Value>,
}

/// A line of `[lat, lon]` pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub coordinates: Vec<Vec<f64>>,
}

impl Geometry {
    pub fn to_coordinates(&self) -> Result<Vec<Coordinates>, DecodeError> {
        self.coordinates.iter().map(|pair| pair_to_coordinates(pair)).collect()
    }
}

/// A single `[lat, lon]` pair.
#[derive(Debug, Clone, Deserialize)]
pub struct PointGeometry {
    pub coordinates: Vec<f64>,
}

impl PointGeometry {
    pub fn to_coordinates(&self) -> Result<Coordinates, DecodeError> {
        pair_to_coordinates(&self.coordinates)
    }
}

fn pair_to_coordinates(pair: &[f64]) -> Result<Coordinates, DecodeError> {
    match pair {
        [latitude, longitude, ..] => Ok(Coordinates::new(*latitude, *longitude)),
        _ => Err(DecodeError::Coordinate(pair.len())),
    }
}

/// A turn-by-turn instruction.
#[derive(Debug, Clone, Deserialize)]
pub struct InstructionDto {
    #[serde(default)]
    pub text: String,

    /// Duration in milliseconds.
    #[serde(default)]
    pub time: u64,

    #[serde(default)]
    pub street_name: String,

    /// GraphHopper maneuver code.
    pub sign: i32,
}

/// A walking leg.
#[derive(Debug, Clone, Deserialize)]
pub struct WalkLeg {
    /// ISO-8601 timestamp, e.g. `2024-11-27T23:40:30.000+00:00`.
    pub departure_time: String,
    pub arrival_time: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub instructions: Vec<InstructionDto>,
}

/// A public-transit leg.
#[derive(Debug, Clone, Deserialize)]
pub struct PtLeg {
    pub departure_time: String,
    pub arrival_time: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub stops: Vec<PtStop>,
    pub trip_id: String,
    pub route_id: String,
    #[serde(default)]
    pub trip_headsign: String,
}

/// A stop visited by a transit leg.
#[derive(Debug, Clone, Deserialize)]
pub struct PtStop {
    pub stop_id: String,
    pub stop_name: String,
    pub geometry: PointGeometry,
}

/// A decoded leg.
#[derive(Debug, Clone)]
pub enum Leg {
    Walk(WalkLeg),
    Pt(PtLeg),
}

impl Leg {
    /// Decode a leg by its `type` discriminator.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let kind = match value.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(other) => return Err(DecodeError::UnknownLegType(other.to_string())),
            None => return Err(DecodeError::MissingLegType),
        };

        match kind.as_str() {
            "walk" => decode(value).map(Leg::Walk),
            "pt" => decode(value).map(Leg::Pt),
            _ => Err(DecodeError::UnknownLegType(kind)),
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|e| DecodeError::Json {
        message: e.to_string(),
        body: None,
    })
}
