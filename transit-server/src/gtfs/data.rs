//! The immutable reference dataset.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{Coordinates, StationDetails, TransitRoute, TransitTrip};

/// Lookup indices over the GTFS bundle.
///
/// Built once and never mutated; shared as `Arc<ReferenceData>` and read
/// without locking.
#[derive(Debug, Default)]
pub struct ReferenceData {
    routes_by_id: HashMap<String, Arc<TransitRoute>>,
    trips_by_id: HashMap<String, Arc<TransitTrip>>,
    stations_by_id: HashMap<String, Arc<StationDetails>>,
    /// Only stations without a parent.
    stations_by_coords: HashMap<Coordinates, Arc<StationDetails>>,
}

impl ReferenceData {
    /// Index the given routes, trips and stations.
    ///
    /// Stations with a parent are reachable by id only; the coordinate index
    /// holds parent (top-level) stations.
    pub fn new(
        routes: impl IntoIterator<Item = Arc<TransitRoute>>,
        trips: impl IntoIterator<Item = Arc<TransitTrip>>,
        stations: impl IntoIterator<Item = Arc<StationDetails>>,
    ) -> Self {
        let routes_by_id = routes.into_iter().map(|r| (r.id.clone(), r)).collect();
        let trips_by_id = trips.into_iter().map(|t| (t.id.clone(), t)).collect();

        let mut stations_by_id = HashMap::new();
        let mut stations_by_coords = HashMap::new();
        for station in stations {
            if station.parent_id.is_none() {
                stations_by_coords.insert(station.coordinates, station.clone());
            }
            stations_by_id.insert(station.id.clone(), station);
        }

        Self {
            routes_by_id,
            trips_by_id,
            stations_by_id,
            stations_by_coords,
        }
    }

    pub fn route(&self, id: &str) -> Option<&Arc<TransitRoute>> {
        self.routes_by_id.get(id)
    }

    pub fn trip(&self, id: &str) -> Option<&Arc<TransitTrip>> {
        self.trips_by_id.get(id)
    }

    pub fn station(&self, id: &str) -> Option<&Arc<StationDetails>> {
        self.stations_by_id.get(id)
    }

    /// The top-level station at exactly these coordinates.
    pub fn station_at(&self, coordinates: Coordinates) -> Option<&Arc<StationDetails>> {
        self.stations_by_coords.get(&coordinates)
    }

    pub fn route_count(&self) -> usize {
        self.routes_by_id.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trips_by_id.len()
    }

    pub fn station_count(&self) -> usize {
        self.stations_by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Accessibility;

    fn station(id: &str, lat: f64, lon: f64, parent: Option<&str>) -> Arc<StationDetails> {
        Arc::new(StationDetails {
            id: id.to_string(),
            name: id.to_string(),
            coordinates: Coordinates::new(lat, lon),
            routes: vec![],
            accessibility: Accessibility::NotAccessible,
            parent_id: parent.map(str::to_string),
            child_ids: vec![],
        })
    }

    #[test]
    fn only_parents_are_indexed_by_coordinates() {
        let data = ReferenceData::new(
            vec![],
            vec![],
            vec![
                station("D35", 40.60867, -73.957734, None),
                station("D35N", 40.60867, -73.957734, Some("D35")),
            ],
        );

        assert_eq!(data.station_count(), 2);
        assert_eq!(
            data.station_at(Coordinates::new(40.60867, -73.957734))
                .map(|s| s.id.as_str()),
            Some("D35")
        );
        assert!(data.station("D35N").is_some());
    }

    #[test]
    fn lookups_by_id() {
        let route = Arc::new(TransitRoute::placeholder("Q"));
        let trip = Arc::new(TransitTrip::placeholder("T1", route.clone(), "Coney Island"));
        let data = ReferenceData::new(vec![route], vec![trip], vec![]);

        assert_eq!(data.route("Q").map(|r| r.id.as_str()), Some("Q"));
        assert_eq!(data.trip("T1").map(|t| t.route.id.as_str()), Some("Q"));
        assert!(data.route("B").is_none());
        assert!(data.trip("T2").is_none());
        assert_eq!(data.route_count(), 1);
        assert_eq!(data.trip_count(), 1);
    }
}
