//! The station table and nearby search over it.

use std::collections::HashMap;
use std::path::Path;

use csv::StringRecord;
use tracing::{error, info, warn};

use crate::domain::{Accessibility, Borough, Coordinates, Station};

/// Stations from the bundled table, keyed by exact coordinates.
pub type StationIndex = HashMap<Coordinates, Station>;

const NAME: usize = 2;
const BOROUGH: usize = 3;
const LATITUDE: usize = 6;
const LONGITUDE: usize = 7;
const ADA: usize = 10;
const ADA_NOTES: usize = 13;

/// Load the station table at `path`.
///
/// Rows that cannot be parsed are skipped. An unreadable file yields an
/// empty index.
pub fn load_station_index(path: &Path) -> StationIndex {
    let mut reader = match csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
    {
        Ok(reader) => reader,
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to open station table");
            return StationIndex::new();
        }
    };

    let mut index = StationIndex::new();
    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "skipping unreadable station row");
                continue;
            }
        };
        match parse_station(&record) {
            Ok(station) => {
                index.insert(station.coordinates, station);
            }
            Err(reason) => warn!(line, reason, "skipping station row"),
        }
    }

    info!(stations = index.len(), "loaded station table");
    index
}

fn parse_station(record: &StringRecord) -> Result<Station, &'static str> {
    let field = |i: usize| record.get(i).ok_or("missing column");

    let name = field(NAME)?;
    let borough = field(BOROUGH)?;
    let latitude: f64 = field(LATITUDE)?.parse().map_err(|_| "invalid latitude")?;
    let longitude: f64 = field(LONGITUDE)?.parse().map_err(|_| "invalid longitude")?;
    let ada = field(ADA)?;

    Ok(Station {
        name: name.to_string(),
        coordinates: Coordinates::new(latitude, longitude),
        accessibility: Accessibility::from_ada_code(ada),
        borough: Borough::from_code(borough),
        accessibility_note: record.get(ADA_NOTES).unwrap_or_default().to_string(),
    })
}

/// Stations no further than `radius_km` from `center`, in index order.
pub fn stations_within(index: &StationIndex, center: Coordinates, radius_km: f64) -> Vec<Station> {
    index
        .values()
        .filter(|s| Coordinates::distance_km(center, s.coordinates) <= radius_km)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    const TABLE: &str = "\
Station ID,Complex ID,Stop Name,Borough,Daytime Routes,Structure,GTFS Latitude,GTFS Longitude,North Direction Label,South Direction Label,ADA,ADA Direction Notes,ADA NB,ADA Notes
1,1,Astoria-Ditmars Blvd,Q,N W,Elevated,40.775036,-73.912034,,Manhattan,0,,,
58,58,Kings Hwy,Bk,B Q,Embankment,40.60867,-73.957734,Manhattan,Coney Island,1,,,
60,60,Avenue U,Bk,Q,Embankment,40.5993,-73.955929,Manhattan,Coney Island,2,,,Uptown only
61,61,Broken Row,Bk,Q,Embankment,not-a-number,-73.955929,Manhattan,Coney Island,0,,,
62,62,Short Row,Bk
";

    #[test]
    fn loads_table_and_skips_bad_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Stations.csv");
        fs::write(&path, TABLE).unwrap();

        let index = load_station_index(&path);
        assert_eq!(index.len(), 3);

        let avenue_u = &index[&Coordinates::new(40.5993, -73.955929)];
        assert_eq!(avenue_u.name, "Avenue U");
        assert_eq!(avenue_u.borough, Borough::Brooklyn);
        assert_eq!(avenue_u.accessibility, Accessibility::Partial);
        assert_eq!(avenue_u.accessibility_note, "Uptown only");

        let ditmars = &index[&Coordinates::new(40.775036, -73.912034)];
        assert_eq!(ditmars.borough, Borough::Queens);
        assert_eq!(ditmars.accessibility, Accessibility::NotAccessible);
        assert_eq!(ditmars.accessibility_note, "");
    }

    #[test]
    fn missing_table_is_empty() {
        let dir = tempdir().unwrap();
        let index = load_station_index(&dir.path().join("absent.csv"));
        assert!(index.is_empty());
    }

    fn station(name: &str, lat: f64, lon: f64) -> Station {
        Station {
            name: name.to_string(),
            coordinates: Coordinates::new(lat, lon),
            accessibility: Accessibility::NotAccessible,
            borough: Borough::Brooklyn,
            accessibility_note: String::new(),
        }
    }

    #[test]
    fn radius_includes_close_and_excludes_far() {
        let center = Coordinates::new(40.6108, -73.9414);
        let index: StationIndex = [
            station("Close", 40.6150, -73.9414),
            station("Far", 40.6558, -73.9414),
        ]
        .into_iter()
        .map(|s| (s.coordinates, s))
        .collect();

        let names: Vec<_> = stations_within(&index, center, 1.0)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Close"]);

        assert_eq!(stations_within(&index, center, 10.0).len(), 2);
        assert!(stations_within(&index, center, 0.1).is_empty());
    }

    proptest! {
        #[test]
        fn nearby_matches_distance(
            points in prop::collection::vec((40.4f64..41.0, -74.3f64..-73.6), 0..30),
            radius in 0.0f64..20.0,
        ) {
            let center = Coordinates::new(40.6108, -73.9414);
            let index: StationIndex = points
                .iter()
                .enumerate()
                .map(|(i, (lat, lon))| {
                    let s = station(&i.to_string(), *lat, *lon);
                    (s.coordinates, s)
                })
                .collect();

            let found = stations_within(&index, center, radius);
            for s in index.values() {
                let inside = Coordinates::distance_km(center, s.coordinates) <= radius;
                prop_assert_eq!(found.contains(s), inside);
            }
        }
    }
}
