//! Routes, trips and their schedules.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::Weekday;

use super::{ClockTime, Coordinates};

/// Direction of travel along a route (GTFS `direction_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TripDirection {
    Zero,
    One,
}

/// Error returned for a `direction_id` other than 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid trip direction {0}: must be 0 or 1")]
pub struct InvalidDirection(pub i64);

impl TripDirection {
    pub fn from_id(id: i64) -> Result<Self, InvalidDirection> {
        match id {
            0 => Ok(TripDirection::Zero),
            1 => Ok(TripDirection::One),
            other => Err(InvalidDirection(other)),
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            TripDirection::Zero => 0,
            TripDirection::One => 1,
        }
    }
}

/// The trips of a route, one per direction.
///
/// When a route has several trips in the same direction, the last one
/// loaded wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripCollection {
    by_direction: HashMap<TripDirection, String>,
}

impl TripCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `trip_id` as the trip for `direction`.
    pub fn insert(&mut self, direction: TripDirection, trip_id: impl Into<String>) {
        self.by_direction.insert(direction, trip_id.into());
    }

    pub fn trip_id(&self, direction: TripDirection) -> Option<&str> {
        self.by_direction.get(&direction).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_direction.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_direction.is_empty()
    }
}

/// A transit route (a subway line, GTFS `routes.txt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitRoute {
    pub id: String,
    /// Short display name, e.g. "Q".
    pub short_name: String,
    /// Long display name, e.g. "Broadway Express".
    pub long_name: String,
    /// Six hex digits without a leading '#'. Empty if unknown.
    pub color: String,
    pub trips: TripCollection,
}

impl TransitRoute {
    /// A route known only by its id.
    ///
    /// Used when the routing service names a route that is missing from
    /// the reference data.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            short_name: String::new(),
            long_name: String::new(),
            color: String::new(),
            trips: TripCollection::new(),
        }
    }
}

/// The days on which a trip runs (GTFS `calendar.txt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripService {
    pub id: String,
    /// Start date as given in the feed (YYYYMMDD).
    pub start_date: String,
    /// End date as given in the feed (YYYYMMDD).
    pub end_date: String,
    /// Flags for Monday through Sunday.
    pub days: [bool; 7],
}

impl TripService {
    /// A service that runs every day, with placeholder dates.
    pub fn all_days(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_date: "Start Date".to_string(),
            end_date: "End Date".to_string(),
            days: [true; 7],
        }
    }

    pub fn runs_on(&self, day: Weekday) -> bool {
        self.days[day.num_days_from_monday() as usize]
    }

    /// Compact day string using M T W R F S D for Monday through Sunday.
    ///
    /// ```
    /// use transit_server::domain::TripService;
    ///
    /// let mut service = TripService::all_days("WKD");
    /// service.days = [true, true, true, true, true, false, false];
    /// assert_eq!(service.day_string(), "MTWRF");
    /// ```
    pub fn day_string(&self) -> String {
        const LETTERS: [char; 7] = ['M', 'T', 'W', 'R', 'F', 'S', 'D'];
        LETTERS
            .iter()
            .zip(self.days)
            .filter(|(_, runs)| *runs)
            .map(|(letter, _)| *letter)
            .collect()
    }
}

impl fmt::Display for TripService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}-{}",
            self.id,
            self.day_string(),
            self.start_date,
            self.end_date
        )
    }
}

/// The drawn path of a trip (GTFS `shapes.txt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripShape {
    pub id: String,
    points: Vec<Coordinates>,
}

/// Error returned when shape points arrive out of sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("shape {shape_id}: expected point {expected}, got {got}")]
pub struct ShapeSequenceError {
    pub shape_id: String,
    pub expected: usize,
    pub got: usize,
}

impl TripShape {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            points: Vec::new(),
        }
    }

    /// Append a point. Sequence numbers must be contiguous from 0.
    pub fn push_point(
        &mut self,
        point: Coordinates,
        sequence: usize,
    ) -> Result<(), ShapeSequenceError> {
        if sequence != self.points.len() {
            return Err(ShapeSequenceError {
                shape_id: self.id.clone(),
                expected: self.points.len(),
                got: sequence,
            });
        }
        self.points.push(point);
        Ok(())
    }

    pub fn points(&self) -> &[Coordinates] {
        &self.points
    }
}

/// A single scheduled run of a route (GTFS `trips.txt`).
#[derive(Debug, Clone)]
pub struct TransitTrip {
    pub id: String,
    pub route: Arc<TransitRoute>,
    pub shape: Option<Arc<TripShape>>,
    pub service: TripService,
    pub headsign: String,
    pub direction: TripDirection,
    /// Stop id departed from at each time.
    pub departures: BTreeMap<ClockTime, String>,
}

impl TransitTrip {
    /// A trip known only by its id, attached to `route`.
    ///
    /// Runs every day, has no shape and no departures.
    pub fn placeholder(
        id: impl Into<String>,
        route: Arc<TransitRoute>,
        headsign: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            route,
            shape: None,
            service: TripService::all_days("Not Found"),
            headsign: headsign.into(),
            direction: TripDirection::One,
            departures: BTreeMap::new(),
        }
    }

    /// First departure of the trip, if any.
    pub fn first_departure(&self) -> Option<ClockTime> {
        self.departures.keys().next().copied()
    }
}
