//! Build [`ReferenceData`] from a GTFS directory.
//!
//! Reads `stops.txt`, `stop_times.txt`, `shapes.txt`, `calendar.txt`,
//! `routes.txt` and `trips.txt`. Columns are matched by header name, so
//! feeds with extra columns load unchanged. This is blocking IO; the
//! reference store runs it on the blocking pool.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::{
    Accessibility, ClockTime, Coordinates, StationDetails, TransitRoute, TransitTrip,
    TripCollection, TripDirection, TripService, TripShape,
};

use super::data::ReferenceData;
use super::error::GtfsError;

const STOPS: &str = "stops.txt";
const STOP_TIMES: &str = "stop_times.txt";
const SHAPES: &str = "shapes.txt";
const CALENDAR: &str = "calendar.txt";
const ROUTES: &str = "routes.txt";
const TRIPS: &str = "trips.txt";

#[derive(Debug, Deserialize)]
struct StopRow {
    stop_id: String,
    stop_name: String,
    stop_lat: f64,
    stop_lon: f64,
    #[serde(default)]
    parent_station: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StopTimeRow {
    trip_id: String,
    stop_id: String,
    departure_time: String,
}

#[derive(Debug, Deserialize)]
struct ShapeRow {
    shape_id: String,
    shape_pt_sequence: usize,
    shape_pt_lat: f64,
    shape_pt_lon: f64,
}

#[derive(Debug, Deserialize)]
struct CalendarRow {
    service_id: String,
    monday: u8,
    tuesday: u8,
    wednesday: u8,
    thursday: u8,
    friday: u8,
    saturday: u8,
    sunday: u8,
    start_date: String,
    end_date: String,
}

#[derive(Debug, Deserialize)]
struct RouteRow {
    route_id: String,
    #[serde(default)]
    route_short_name: String,
    #[serde(default)]
    route_long_name: String,
    #[serde(default)]
    route_color: String,
}

#[derive(Debug, Deserialize)]
struct TripRow {
    route_id: String,
    trip_id: String,
    service_id: String,
    #[serde(default)]
    trip_headsign: String,
    direction_id: i64,
    #[serde(default)]
    shape_id: Option<String>,
}

/// A stop while the dataset is being assembled.
struct StopDraft {
    id: String,
    name: String,
    coordinates: Coordinates,
    parent_id: Option<String>,
    child_ids: Vec<String>,
    route_ids: BTreeSet<String>,
}

/// Load the full reference dataset from `dir`.
pub fn load_reference_data(dir: &Path) -> Result<ReferenceData, GtfsError> {
    let (stop_order, mut stops) = load_stops(dir)?;
    let departures = load_departures(dir)?;
    let shapes = load_shapes(dir)?;
    let services = load_services(dir)?;
    let route_rows = read_rows::<RouteRow>(dir, ROUTES)?;
    let trip_rows = read_rows::<TripRow>(dir, TRIPS)?;

    // Trips decide which routes serve which stops, and fill each route's
    // trip collection, so they are resolved before routes are frozen.
    let route_index: HashMap<&str, &RouteRow> =
        route_rows.iter().map(|r| (r.route_id.as_str(), r)).collect();
    let mut collections: HashMap<&str, TripCollection> = HashMap::new();
    let mut trip_directions = Vec::with_capacity(trip_rows.len());

    for row in &trip_rows {
        if !route_index.contains_key(row.route_id.as_str()) {
            return Err(GtfsError::UnknownRoute {
                trip_id: row.trip_id.clone(),
                route_id: row.route_id.clone(),
            });
        }
        let direction =
            TripDirection::from_id(row.direction_id).map_err(|source| GtfsError::Direction {
                trip_id: row.trip_id.clone(),
                source,
            })?;
        trip_directions.push(direction);

        collections
            .entry(row.route_id.as_str())
            .or_default()
            .insert(direction, row.trip_id.clone());

        for stop_id in departures.get(&row.trip_id).into_iter().flat_map(|d| d.values()) {
            match stops.get_mut(stop_id) {
                Some(stop) => {
                    stop.route_ids.insert(row.route_id.clone());
                }
                None => debug!(trip_id = %row.trip_id, %stop_id, "stop time names unknown stop"),
            }
        }
    }

    let routes: HashMap<String, Arc<TransitRoute>> = route_rows
        .iter()
        .map(|row| {
            let route = TransitRoute {
                id: row.route_id.clone(),
                short_name: row.route_short_name.clone(),
                long_name: row.route_long_name.clone(),
                color: row.route_color.clone(),
                trips: collections.remove(row.route_id.as_str()).unwrap_or_default(),
            };
            (row.route_id.clone(), Arc::new(route))
        })
        .collect();

    let mut departures = departures;
    let mut trips = Vec::with_capacity(trip_rows.len());
    for (row, direction) in trip_rows.into_iter().zip(trip_directions) {
        let Some(route) = routes.get(&row.route_id) else {
            continue;
        };
        let service = services.get(&row.service_id).cloned().unwrap_or_else(|| {
            warn!(
                trip_id = %row.trip_id,
                service_id = %row.service_id,
                "trip names unknown service; assuming every day"
            );
            TripService::all_days(row.service_id.clone())
        });
        let shape = row
            .shape_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .and_then(|id| shapes.get(id).cloned());

        trips.push(Arc::new(TransitTrip {
            departures: departures.remove(&row.trip_id).unwrap_or_default(),
            id: row.trip_id,
            route: route.clone(),
            shape,
            service,
            headsign: row.trip_headsign,
            direction,
        }));
    }

    let stations = freeze_stops(stop_order, &mut stops, &routes);

    let data = ReferenceData::new(routes.into_values(), trips, stations);
    info!(
        routes = data.route_count(),
        trips = data.trip_count(),
        stations = data.station_count(),
        "loaded GTFS reference data"
    );
    Ok(data)
}

/// Read every row of `file` into `T`.
fn read_rows<T: DeserializeOwned>(dir: &Path, file: &'static str) -> Result<Vec<T>, GtfsError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(dir.join(file))
        .map_err(|source| GtfsError::Csv { file, source })?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| GtfsError::Csv { file, source })
}

/// Load stops, linking children to parents. Parents must come first.
fn load_stops(dir: &Path) -> Result<(Vec<String>, HashMap<String, StopDraft>), GtfsError> {
    let rows = read_rows::<StopRow>(dir, STOPS)?;
    let mut order = Vec::with_capacity(rows.len());
    let mut stops: HashMap<String, StopDraft> = HashMap::with_capacity(rows.len());

    for row in rows {
        let parent_id = row.parent_station.filter(|p| !p.is_empty());
        if let Some(parent_id) = &parent_id {
            let parent = stops
                .get_mut(parent_id)
                .ok_or_else(|| GtfsError::UnknownParent {
                    stop_id: row.stop_id.clone(),
                    parent_id: parent_id.clone(),
                })?;
            parent.child_ids.push(row.stop_id.clone());
        }

        order.push(row.stop_id.clone());
        stops.insert(
            row.stop_id.clone(),
            StopDraft {
                id: row.stop_id,
                name: row.stop_name,
                coordinates: Coordinates::new(row.stop_lat, row.stop_lon),
                parent_id,
                child_ids: Vec::new(),
                route_ids: BTreeSet::new(),
            },
        );
    }

    Ok((order, stops))
}

/// Departure time → stop id, per trip.
fn load_departures(dir: &Path) -> Result<HashMap<String, BTreeMap<ClockTime, String>>, GtfsError> {
    let rows = read_rows::<StopTimeRow>(dir, STOP_TIMES)?;
    let mut departures: HashMap<String, BTreeMap<ClockTime, String>> = HashMap::new();

    for (idx, row) in rows.into_iter().enumerate() {
        let time = ClockTime::parse_hms(&row.departure_time).map_err(|e| GtfsError::InvalidRow {
            file: STOP_TIMES,
            line: idx + 2,
            message: e.to_string(),
        })?;
        departures
            .entry(row.trip_id)
            .or_default()
            .insert(time, row.stop_id);
    }

    Ok(departures)
}

fn load_shapes(dir: &Path) -> Result<HashMap<String, Arc<TripShape>>, GtfsError> {
    let rows = read_rows::<ShapeRow>(dir, SHAPES)?;
    let mut shapes: HashMap<String, TripShape> = HashMap::new();

    for row in rows {
        shapes
            .entry(row.shape_id.clone())
            .or_insert_with(|| TripShape::new(row.shape_id.clone()))
            .push_point(
                Coordinates::new(row.shape_pt_lat, row.shape_pt_lon),
                row.shape_pt_sequence,
            )?;
    }

    Ok(shapes
        .into_iter()
        .map(|(id, shape)| (id, Arc::new(shape)))
        .collect())
}

fn load_services(dir: &Path) -> Result<HashMap<String, TripService>, GtfsError> {
    let rows = read_rows::<CalendarRow>(dir, CALENDAR)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let days = [
                row.monday,
                row.tuesday,
                row.wednesday,
                row.thursday,
                row.friday,
                row.saturday,
                row.sunday,
            ]
            .map(|flag| flag == 1);
            let service = TripService {
                id: row.service_id.clone(),
                start_date: row.start_date,
                end_date: row.end_date,
                days,
            };
            (row.service_id, service)
        })
        .collect())
}

/// Turn drafts into shared `StationDetails`, in file order.
///
/// A parent's routes include those of its children.
fn freeze_stops(
    order: Vec<String>,
    stops: &mut HashMap<String, StopDraft>,
    routes: &HashMap<String, Arc<TransitRoute>>,
) -> Vec<Arc<StationDetails>> {
    let inherited: Vec<(String, BTreeSet<String>)> = stops
        .values()
        .filter(|s| !s.child_ids.is_empty())
        .map(|parent| {
            let from_children = parent
                .child_ids
                .iter()
                .filter_map(|c| stops.get(c))
                .flat_map(|c| c.route_ids.iter().cloned())
                .collect();
            (parent.id.clone(), from_children)
        })
        .collect();
    for (parent_id, route_ids) in inherited {
        if let Some(parent) = stops.get_mut(&parent_id) {
            parent.route_ids.extend(route_ids);
        }
    }

    order
        .into_iter()
        .filter_map(|id| stops.remove(&id))
        .map(|draft| {
            let mut serving: Vec<Arc<TransitRoute>> = draft
                .route_ids
                .iter()
                .filter_map(|id| routes.get(id).cloned())
                .collect();
            serving.sort_by(|a, b| a.short_name.cmp(&b.short_name).then(a.id.cmp(&b.id)));

            Arc::new(StationDetails {
                id: draft.id,
                name: draft.name,
                coordinates: draft.coordinates,
                routes: serving,
                accessibility: Accessibility::NotAccessible,
                parent_id: draft.parent_id,
                child_ids: draft.child_ids,
            })
        })
        .collect()
}
