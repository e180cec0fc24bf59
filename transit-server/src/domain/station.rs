//! Station types.
//!
//! Two sources describe stations. The bundled station table gives a small
//! [`Station`] record per platform complex, with accessibility and borough
//! data. The GTFS stops give a [`StationDetails`] record with the routes that
//! serve it. The two are joined by exact coordinates.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::Coordinates;
use super::transit::TransitRoute;

/// Step-free access at a station, from the ADA column of the station table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Accessible,
    Partial,
    NotAccessible,
}

impl Accessibility {
    /// Parse an ADA code: "1" is accessible, "2" partially accessible,
    /// anything else is not accessible.
    ///
    /// ```
    /// use transit_server::domain::Accessibility;
    ///
    /// assert_eq!(Accessibility::from_ada_code("1"), Accessibility::Accessible);
    /// assert_eq!(Accessibility::from_ada_code("2"), Accessibility::Partial);
    /// assert_eq!(Accessibility::from_ada_code("0"), Accessibility::NotAccessible);
    /// ```
    pub fn from_ada_code(code: &str) -> Self {
        match code.trim() {
            "1" => Accessibility::Accessible,
            "2" => Accessibility::Partial,
            _ => Accessibility::NotAccessible,
        }
    }

    pub fn is_accessible(&self) -> bool {
        matches!(self, Accessibility::Accessible)
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Accessibility::Accessible => "Accessible",
            Accessibility::Partial => "Partially Accessible",
            Accessibility::NotAccessible => "Not Accessible",
        }
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// New York City borough, from the station table's short codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Borough {
    Brooklyn,
    Bronx,
    Manhattan,
    Queens,
    StatenIsland,
    Unknown,
}

impl Borough {
    /// Parse a borough code ("Bk", "Bx", "M", "Q", "SI").
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "Bk" => Borough::Brooklyn,
            "Bx" => Borough::Bronx,
            "M" => Borough::Manhattan,
            "Q" => Borough::Queens,
            "SI" => Borough::StatenIsland,
            _ => Borough::Unknown,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Borough::Brooklyn => "Brooklyn",
            Borough::Bronx => "Bronx",
            Borough::Manhattan => "Manhattan",
            Borough::Queens => "Queens",
            Borough::StatenIsland => "Staten Island",
            Borough::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Borough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A station from the bundled station table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub name: String,
    pub coordinates: Coordinates,
    pub accessibility: Accessibility,
    pub borough: Borough,
    /// Free-text accessibility note, often empty.
    pub accessibility_note: String,
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}), {}, {}",
            self.name,
            self.coordinates.latitude(),
            self.coordinates.longitude(),
            self.accessibility,
            self.borough
        )?;
        if !self.accessibility_note.is_empty() {
            write!(f, ", {}", self.accessibility_note)?;
        }
        Ok(())
    }
}

/// A GTFS stop with the routes serving it.
///
/// Parent stations carry the routes of all their child platforms, so the
/// route list of the record found by a coordinate join is already complete.
#[derive(Debug, Clone)]
pub struct StationDetails {
    pub id: String,
    pub name: String,
    pub coordinates: Coordinates,
    /// Serving routes, de-duplicated and ordered by short name.
    pub routes: Vec<Arc<TransitRoute>>,
    pub accessibility: Accessibility,
    pub parent_id: Option<String>,
    pub child_ids: Vec<String>,
}

impl StationDetails {
    /// Returns true if `route_id` serves this station.
    pub fn is_served_by(&self, route_id: &str) -> bool {
        self.routes.iter().any(|r| r.id == route_id)
    }

    /// Short names of the serving routes, in display order.
    pub fn route_names(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.short_name.as_str()).collect()
    }
}

impl PartialEq for StationDetails {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.coordinates == other.coordinates
            && self.accessibility == other.accessibility
            && self.parent_id == other.parent_id
            && self.child_ids == other.child_ids
            && self.routes.len() == other.routes.len()
            && self
                .routes
                .iter()
                .zip(&other.routes)
                .all(|(a, b)| a.id == b.id)
    }
}
