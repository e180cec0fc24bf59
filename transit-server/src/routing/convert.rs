//! Conversion from routing DTOs to domain routes.
//!
//! Transit legs name GTFS routes, trips and stops by id. Ids missing from
//! the reference data are not errors: a placeholder is built from what the
//! leg itself says, so the itinerary can still be shown.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    Accessibility, BestRoute, ClockTime, InstructionSign, StationDetails, Step, TransitRoute,
    TransitStep, TransitTrip, WalkInstruction, WalkStep,
};
use crate::gtfs::ReferenceData;

use super::error::DecodeError;
use super::types::{InstructionDto, Leg, PathDto, PtLeg, PtStop, RouteResponse, WalkLeg};

/// Convert every path in a response, in the order returned.
///
/// Any undecodable leg fails the whole response.
pub fn convert_response(
    response: RouteResponse,
    data: &ReferenceData,
) -> Result<Vec<BestRoute>, DecodeError> {
    response
        .paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| convert_path(index, path, data))
        .collect()
}

fn convert_path(
    index: usize,
    path: PathDto,
    data: &ReferenceData,
) -> Result<BestRoute, DecodeError> {
    let steps = path
        .legs
        .into_iter()
        .map(|value| Leg::from_value(value).and_then(|leg| convert_leg(leg, data)))
        .collect::<Result<Vec<_>, _>>()?;

    BestRoute::from_steps(steps).map_err(|_| DecodeError::EmptyPath(index))
}

fn convert_leg(leg: Leg, data: &ReferenceData) -> Result<Step, DecodeError> {
    match leg {
        Leg::Walk(walk) => convert_walk(walk).map(Step::Walk),
        Leg::Pt(pt) => convert_pt(pt, data).map(Step::Transit),
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<ClockTime, DecodeError> {
    ClockTime::parse_iso(value).map_err(|source| DecodeError::Time { field, source })
}

fn convert_walk(leg: WalkLeg) -> Result<WalkStep, DecodeError> {
    Ok(WalkStep {
        geometry: leg.geometry.to_coordinates()?,
        departure: parse_time("departure_time", &leg.departure_time)?,
        arrival: parse_time("arrival_time", &leg.arrival_time)?,
        instructions: leg.instructions.into_iter().map(convert_instruction).collect(),
    })
}

fn convert_instruction(instruction: InstructionDto) -> WalkInstruction {
    WalkInstruction {
        text: instruction.text,
        street_name: instruction.street_name,
        sign: InstructionSign::from_code(instruction.sign),
    }
}

fn convert_pt(leg: PtLeg, data: &ReferenceData) -> Result<TransitStep, DecodeError> {
    let geometry = leg.geometry.to_coordinates()?;
    let departure = parse_time("departure_time", &leg.departure_time)?;
    let arrival = parse_time("arrival_time", &leg.arrival_time)?;

    let route = match data.route(&leg.route_id) {
        Some(route) => route.clone(),
        None => {
            debug!(route_id = %leg.route_id, "unknown route, using placeholder");
            Arc::new(TransitRoute::placeholder(leg.route_id.as_str()))
        }
    };

    let trip = match data.trip(&leg.trip_id) {
        Some(trip) => trip.clone(),
        None => {
            debug!(trip_id = %leg.trip_id, "unknown trip, using placeholder");
            Arc::new(TransitTrip::placeholder(
                leg.trip_id.as_str(),
                route.clone(),
                leg.trip_headsign.as_str(),
            ))
        }
    };

    let stops = leg
        .stops
        .iter()
        .map(|stop| resolve_stop(stop, &route, data))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TransitStep {
        geometry,
        departure,
        arrival,
        stops,
        trip,
        route,
    })
}

fn resolve_stop(
    stop: &PtStop,
    route: &Arc<TransitRoute>,
    data: &ReferenceData,
) -> Result<Arc<StationDetails>, DecodeError> {
    if let Some(station) = data.station(&stop.stop_id) {
        return Ok(station.clone());
    }

    debug!(stop_id = %stop.stop_id, "unknown stop, using placeholder");
    let coordinates = stop.geometry.to_coordinates()?;
    Ok(Arc::new(StationDetails {
        id: stop.stop_id.clone(),
        name: stop.stop_name.clone(),
        coordinates,
        routes: vec![route.clone()],
        accessibility: Accessibility::NotAccessible,
        parent_id: None,
        child_ids: Vec::new(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinates, TripCollection, TripDirection, TripService};
    use serde_json::json;

    fn reference_data() -> ReferenceData {
        let mut trips = TripCollection::new();
        trips.insert(TripDirection::Zero, "Q1");
        let route = Arc::new(TransitRoute {
            id: "Q".into(),
            short_name: "Q".into(),
            long_name: "Broadway Express".into(),
            color: "F6BC26".into(),
            trips,
        });
        let mut trip = TransitTrip::placeholder("Q1", route.clone(), "Astoria-Ditmars Blvd");
        trip.service = TripService::all_days("Weekday");
        trip.direction = TripDirection::Zero;
        let station = Arc::new(StationDetails {
            id: "D35N".into(),
            name: "Kings Hwy".into(),
            coordinates: Coordinates::new(40.60867, -73.957734),
            routes: vec![route.clone()],
            accessibility: Accessibility::NotAccessible,
            parent_id: Some("D35".into()),
            child_ids: vec![],
        });
        ReferenceData::new(vec![route], vec![Arc::new(trip)], vec![station])
    }

    fn pt_leg(route_id: &str, trip_id: &str) -> serde_json::Value {
        json!({
            "type": "pt",
            "departure_time": "2024-11-27T13:38:00.000+00:00",
            "arrival_time": "2024-11-27T14:10:00.000+00:00",
            "geometry": {"coordinates": [[40.60867, -73.957734], [40.6148, -73.9614]]},
            "stops": [
                {"stop_id": "D35N", "stop_name": "Kings Hwy", "geometry": {"coordinates": [40.60867, -73.957734]}},
                {"stop_id": "D31N", "stop_name": "Avenue J", "geometry": {"coordinates": [40.625039, -73.960803]}}
            ],
            "trip_id": trip_id,
            "route_id": route_id,
            "trip_headsign": "Astoria-Ditmars Blvd"
        })
    }

    fn walk_leg() -> serde_json::Value {
        json!({
            "type": "walk",
            "departure_time": "2024-11-27T13:30:00.000+00:00",
            "arrival_time": "2024-11-27T13:37:30.000+00:00",
            "geometry": {"coordinates": [[40.61078, -73.94135], [40.60867, -73.957734]]},
            "instructions": [
                {"text": "Turn left onto Avenue P", "street_name": "Avenue P", "sign": -2},
                {"text": "Arrive at Kings Hwy", "street_name": "", "sign": 4}
            ]
        })
    }

    fn response(legs: Vec<serde_json::Value>) -> RouteResponse {
        serde_json::from_value(json!({"paths": [{"time": 2400000, "legs": legs}]})).unwrap()
    }

    #[test]
    fn known_references_are_shared() {
        let data = reference_data();
        let routes =
            convert_response(response(vec![walk_leg(), pt_leg("Q", "Q1")]), &data).unwrap();

        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.steps().len(), 2);
        assert_eq!(route.departure(), ClockTime::new(13, 30, 0));
        assert_eq!(route.arrival(), ClockTime::new(14, 10, 0));

        let Step::Walk(walk) = &route.steps()[0] else {
            panic!("expected walk step");
        };
        assert_eq!(walk.instructions[0].sign, InstructionSign::TurnLeft);
        assert_eq!(walk.instructions[1].sign, InstructionSign::Finish);

        let Step::Transit(transit) = &route.steps()[1] else {
            panic!("expected transit step");
        };
        assert!(Arc::ptr_eq(&transit.route, data.route("Q").unwrap()));
        assert!(Arc::ptr_eq(&transit.trip, data.trip("Q1").unwrap()));
        assert!(Arc::ptr_eq(&transit.stops[0], data.station("D35N").unwrap()));
    }

    #[test]
    fn missing_references_become_placeholders() {
        let data = reference_data();
        let routes = convert_response(response(vec![pt_leg("W", "W7")]), &data).unwrap();

        let Step::Transit(transit) = &routes[0].steps()[0] else {
            panic!("expected transit step");
        };
        assert_eq!(transit.route.id, "W");
        assert_eq!(transit.route.short_name, "");
        assert_eq!(transit.route.long_name, "");
        assert_eq!(transit.route.color, "");
        assert!(transit.route.trips.is_empty());

        assert_eq!(transit.trip.id, "W7");
        assert!(Arc::ptr_eq(&transit.trip.route, &transit.route));
        assert_eq!(transit.trip.service.id, "Not Found");
        assert_eq!(transit.trip.headsign, "Astoria-Ditmars Blvd");
        assert_eq!(transit.trip.direction, TripDirection::One);
        assert!(transit.trip.departures.is_empty());

        let avenue_j = &transit.stops[1];
        assert_eq!(avenue_j.id, "D31N");
        assert_eq!(avenue_j.name, "Avenue J");
        assert_eq!(avenue_j.coordinates, Coordinates::new(40.625039, -73.960803));
        assert_eq!(avenue_j.route_names(), vec![""]);
        assert!(avenue_j.is_served_by("W"));
        assert_eq!(avenue_j.accessibility, Accessibility::NotAccessible);
    }

    #[test]
    fn unknown_leg_type_fails_every_path() {
        let data = reference_data();
        let mut ferry = walk_leg();
        ferry["type"] = json!("ferry");

        let err = convert_response(response(vec![walk_leg(), ferry]), &data).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownLegType(ref t) if t == "ferry"));
    }

    #[test]
    fn path_without_legs_is_an_error() {
        let data = reference_data();
        let err = convert_response(response(vec![]), &data).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyPath(0)));
    }

    #[test]
    fn bad_timestamp_is_an_error() {
        let data = reference_data();
        let mut leg = walk_leg();
        leg["arrival_time"] = json!("13:37");

        let err = convert_response(response(vec![leg]), &data).unwrap_err();
        assert!(matches!(err, DecodeError::Time { field: "arrival_time", .. }));
    }
}
