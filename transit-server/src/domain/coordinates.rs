//! Geographic coordinates.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
///
/// Coordinates double as the join key between the station table and the
/// GTFS stops, so equality is exact: two values are equal only if both
/// components have the same bit pattern. No rounding is applied.
///
/// # Examples
///
/// ```
/// use transit_server::domain::Coordinates;
///
/// let a = Coordinates::new(40.6108, -73.9414);
/// let b = Coordinates::new(40.6108, -73.9414);
/// assert_eq!(a, b);
/// assert_eq!(Coordinates::distance_km(a, b), 0.0);
/// ```
#[derive(Clone, Copy, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Create coordinates from latitude and longitude.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns the latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance between two points, in kilometres.
    pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
        let lat_a = a.latitude.to_radians();
        let lat_b = b.latitude.to_radians();
        let d_lat = (b.latitude - a.latitude).to_radians();
        let d_lon = (b.longitude - a.longitude).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + (d_lon / 2.0).sin().powi(2) * lat_a.cos() * lat_b.cos();
        let angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

        EARTH_RADIUS_KM * angle
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
    }
}

impl Eq for Coordinates {}

impl Hash for Coordinates {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.latitude.to_bits().hash(state);
        self.longitude.to_bits().hash(state);
    }
}

impl fmt::Debug for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinates({}, {})", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A named place returned by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub coordinates: Coordinates,
    pub name: String,
}

impl Destination {
    pub fn new(coordinates: Coordinates, name: impl Into<String>) -> Self {
        Self {
            coordinates,
            name: name.into(),
        }
    }
}
