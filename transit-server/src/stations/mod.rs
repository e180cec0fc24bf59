//! Nearby-station search and station details.
//!
//! The bundled station table is loaded into a coordinate index at startup.
//! [`StationDirectory`] answers nearby queries from that index and joins
//! stations to their GTFS details through the reference store.

mod directory;
mod error;
mod index;

pub use directory::{DEFAULT_RADIUS_KM, StationDirectory};
pub use error::DirectoryError;
pub use index::{StationIndex, load_station_index, stations_within};
