//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{
    BestRoute, ClockTime, Coordinates, Station, StationDetails, Step, TransitRoute,
    WalkInstruction,
};

/// Query for stations near a point.
#[derive(Debug, Deserialize)]
pub struct NearbyRequest {
    pub lat: f64,
    pub lon: f64,
    /// Search radius in kilometres (defaults to 1.0)
    pub radius_km: Option<f64>,
}

/// Query for the station at a point.
#[derive(Debug, Deserialize)]
pub struct DetailsRequest {
    pub lat: f64,
    pub lon: f64,
}

/// Query for routes between two points.
#[derive(Debug, Deserialize)]
pub struct RoutesRequest {
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
    /// Time in HH:MM format (defaults to now)
    pub time: Option<String>,
}

/// A station from the station table.
#[derive(Debug, Serialize, PartialEq)]
pub struct StationResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub borough: String,
    pub accessibility: String,
    /// Free-text note, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_note: Option<String>,
}

/// Response for nearby stations.
#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub stations: Vec<StationResult>,
}

/// A transit route (line).
#[derive(Debug, Serialize, PartialEq)]
pub struct RouteResult {
    pub id: String,
    pub short_name: String,
    pub long_name: String,
    pub color: String,
}

/// GTFS details for a station.
#[derive(Debug, Serialize)]
pub struct StationDetailsResult {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accessibility: String,
    pub routes: Vec<RouteResult>,
    pub parent_id: Option<String>,
    pub child_ids: Vec<String>,
}

/// A stop on a transit step.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A walking instruction.
#[derive(Debug, Serialize)]
pub struct InstructionResult {
    pub text: String,
    pub street_name: String,
    pub sign: i32,
}

/// One step of a route.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepResult {
    Walk {
        departure: String,
        arrival: String,
        instructions: Vec<InstructionResult>,
        geometry: Vec<[f64; 2]>,
    },
    Transit {
        departure: String,
        arrival: String,
        route: RouteResult,
        trip_id: String,
        headsign: String,
        stops: Vec<StopResult>,
        geometry: Vec<[f64; 2]>,
    },
}

/// A complete route.
#[derive(Debug, Serialize)]
pub struct BestRouteResult {
    pub departure: String,
    pub arrival: String,
    pub duration_mins: i64,
    pub transit_legs: usize,
    pub steps: Vec<StepResult>,
}

/// Response for routes.
#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub routes: Vec<BestRouteResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StationResult {
    pub fn from_station(station: &Station) -> Self {
        Self {
            name: station.name.clone(),
            latitude: station.coordinates.latitude(),
            longitude: station.coordinates.longitude(),
            borough: station.borough.name().to_string(),
            accessibility: station.accessibility.label().to_string(),
            accessibility_note: Some(station.accessibility_note.clone()).filter(|n| !n.is_empty()),
        }
    }
}

impl RouteResult {
    pub fn from_route(route: &TransitRoute) -> Self {
        Self {
            id: route.id.clone(),
            short_name: route.short_name.clone(),
            long_name: route.long_name.clone(),
            color: route.color.clone(),
        }
    }
}

impl StationDetailsResult {
    pub fn from_details(details: &StationDetails) -> Self {
        Self {
            id: details.id.clone(),
            name: details.name.clone(),
            latitude: details.coordinates.latitude(),
            longitude: details.coordinates.longitude(),
            accessibility: details.accessibility.label().to_string(),
            routes: details.routes.iter().map(|r| RouteResult::from_route(r)).collect(),
            parent_id: details.parent_id.clone(),
            child_ids: details.child_ids.clone(),
        }
    }
}

impl BestRouteResult {
    pub fn from_route(route: &BestRoute) -> Self {
        Self {
            departure: format_time(route.departure()),
            arrival: format_time(route.arrival()),
            duration_mins: route.duration_minutes(),
            transit_legs: route.transit_legs(),
            steps: route.steps().iter().map(StepResult::from_step).collect(),
        }
    }
}

impl StepResult {
    pub fn from_step(step: &Step) -> Self {
        match step {
            Step::Walk(walk) => StepResult::Walk {
                departure: format_time(walk.departure),
                arrival: format_time(walk.arrival),
                instructions: walk
                    .instructions
                    .iter()
                    .map(InstructionResult::from_instruction)
                    .collect(),
                geometry: to_pairs(&walk.geometry),
            },
            Step::Transit(transit) => StepResult::Transit {
                departure: format_time(transit.departure),
                arrival: format_time(transit.arrival),
                route: RouteResult::from_route(&transit.route),
                trip_id: transit.trip.id.clone(),
                headsign: transit.trip.headsign.clone(),
                stops: transit
                    .stops
                    .iter()
                    .map(|s| StopResult {
                        id: s.id.clone(),
                        name: s.name.clone(),
                        latitude: s.coordinates.latitude(),
                        longitude: s.coordinates.longitude(),
                    })
                    .collect(),
                geometry: to_pairs(&transit.geometry),
            },
        }
    }
}

impl InstructionResult {
    pub fn from_instruction(instruction: &WalkInstruction) -> Self {
        Self {
            text: instruction.text.clone(),
            street_name: instruction.street_name.clone(),
            sign: instruction.sign.code(),
        }
    }
}

fn format_time(time: ClockTime) -> String {
    time.to_military()
}

fn to_pairs(points: &[Coordinates]) -> Vec<[f64; 2]> {
    points.iter().map(|c| [c.latitude(), c.longitude()]).collect()
}
