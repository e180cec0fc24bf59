//! Query parameters for the routing service's `/route` endpoint.

use chrono::NaiveDateTime;
use reqwest::Url;

use crate::domain::Coordinates;

/// One public-transit route query.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Coordinates,
    pub destination: Coordinates,
    /// Earliest departure, sent as UTC.
    pub earliest_departure: NaiveDateTime,
    pub locale: String,
    pub arrive_by: bool,
    /// Range query over `profile_duration`.
    pub profile: bool,
    /// ISO-8601 duration, e.g. `PT60M`.
    pub profile_duration: String,
    /// ISO-8601 duration cap on walking time.
    pub limit_street_time: Option<String>,
    pub ignore_transfers: bool,
    pub limit_solutions: Option<u32>,
}

impl RouteRequest {
    /// A request with the default options.
    pub fn new(
        origin: Coordinates,
        destination: Coordinates,
        earliest_departure: NaiveDateTime,
    ) -> Self {
        Self {
            origin,
            destination,
            earliest_departure,
            locale: "en".to_string(),
            arrive_by: false,
            profile: false,
            profile_duration: "PT60M".to_string(),
            limit_street_time: None,
            ignore_transfers: false,
            limit_solutions: Some(5),
        }
    }

    /// Query parameters, in the order the service documents them.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("profile", "pt".to_string()),
            ("point", self.origin.to_string()),
            ("point", self.destination.to_string()),
            ("locale", self.locale.clone()),
            (
                "pt.earliest_departure_time",
                self.earliest_departure.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ),
            ("pt.arrive_by", self.arrive_by.to_string()),
            ("pt.profile", self.profile.to_string()),
            ("pt.profile_duration", self.profile_duration.clone()),
        ];
        if let Some(limit) = &self.limit_street_time {
            params.push(("pt.limit_street_time", limit.clone()));
        }
        params.push(("pt.ignore_transfers", self.ignore_transfers.to_string()));
        if let Some(limit) = self.limit_solutions {
            params.push(("pt.limit_solutions", limit.to_string()));
        }
        params
    }

    /// The full `/route` URL under `base_url`, with encoded parameters.
    pub fn to_url(&self, base_url: &str) -> Result<Url, String> {
        let endpoint = format!("{}/route", base_url.trim_end_matches('/'));
        Url::parse_with_params(&endpoint, self.query_params()).map_err(|e| e.to_string())
    }
}
