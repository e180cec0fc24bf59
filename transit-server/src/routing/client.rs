//! Routing service HTTP client.
//!
//! Sends one GET to a GraphHopper `/route` endpoint per query and converts
//! the itineraries into [`BestRoute`]s against the reference data.

use chrono::{Local, NaiveDate};
use reqwest::header::{HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::domain::{BestRoute, ClockTime, Destination};
use crate::gtfs::ReferenceData;

use super::convert::convert_response;
use super::error::{DecodeError, RoutingCause, RoutingFailed};
use super::request::RouteRequest;
use super::types::RouteResponse;

/// Default base URL for the routing service.
const DEFAULT_BASE_URL: &str = "http://localhost:8989";

const DEFAULT_USER_AGENT: &str = concat!("transit-server/", env!("CARGO_PKG_VERSION"));

/// Configuration for the routing client.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Base URL; `/route` is appended
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Locale for walking instructions
    pub locale: String,
    /// Range query window, e.g. `PT60M`
    pub profile_duration: String,
    /// Cap on walking time, e.g. `PT30M`
    pub limit_street_time: Option<String>,
    /// Maximum number of itineraries
    pub limit_solutions: Option<u32>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            locale: "en".to_string(),
            profile_duration: "PT60M".to_string(),
            limit_street_time: None,
            limit_solutions: Some(5),
        }
    }
}

impl RoutingConfig {
    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_profile_duration(mut self, duration: impl Into<String>) -> Self {
        self.profile_duration = duration.into();
        self
    }

    pub fn with_limit_street_time(mut self, duration: impl Into<String>) -> Self {
        self.limit_street_time = Some(duration.into());
        self
    }

    /// Set the maximum number of itineraries; `None` leaves it to the service.
    pub fn with_limit_solutions(mut self, limit: Option<u32>) -> Self {
        self.limit_solutions = limit;
        self
    }
}

/// Client for the routing service.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: reqwest::Client,
    config: RoutingConfig,
}

impl RoutingClient {
    /// Create a new routing client with the given configuration.
    pub fn new(config: RoutingConfig) -> Result<Self, RoutingFailed> {
        let user_agent =
            HeaderValue::from_str(&config.user_agent).map_err(|_| RoutingCause::Request {
                message: format!("invalid user agent: {:?}", config.user_agent),
            })?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(USER_AGENT, user_agent);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(RoutingCause::Network)?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Best routes from `origin` to `destination` leaving at or after
    /// `departure_time` today.
    pub async fn find_best_routes(
        &self,
        origin: &Destination,
        destination: &Destination,
        departure_time: ClockTime,
        data: &ReferenceData,
    ) -> Result<Vec<BestRoute>, RoutingFailed> {
        let today = Local::now().date_naive();
        self.find_best_routes_on(origin, destination, departure_time, today, data)
            .await
    }

    /// Best routes leaving at or after `departure_time` on `date`.
    ///
    /// Routes are returned in the order the service ranked them. One bad leg
    /// anywhere fails the whole call.
    pub async fn find_best_routes_on(
        &self,
        origin: &Destination,
        destination: &Destination,
        departure_time: ClockTime,
        date: NaiveDate,
        data: &ReferenceData,
    ) -> Result<Vec<BestRoute>, RoutingFailed> {
        let request = self.build_request(origin, destination, departure_time, date)?;
        let url = request
            .to_url(&self.config.base_url)
            .map_err(|message| RoutingCause::Request { message })?;

        info!(
            from = %origin.name,
            to = %destination.name,
            departure = %departure_time,
            "requesting routes"
        );
        debug!(%url, "calling routing service");

        let response = self.http.get(url).send().await.map_err(RoutingCause::Network)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RoutingCause::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response.text().await.map_err(RoutingCause::Network)?;
        if body.trim().is_empty() {
            return Err(RoutingCause::EmptyBody.into());
        }

        let parsed: RouteResponse = serde_json::from_str(&body).map_err(|e| DecodeError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

        let routes = convert_response(parsed, data)?;
        info!(routes = routes.len(), "routes found");
        Ok(routes)
    }

    fn build_request(
        &self,
        origin: &Destination,
        destination: &Destination,
        departure_time: ClockTime,
        date: NaiveDate,
    ) -> Result<RouteRequest, RoutingFailed> {
        let earliest = departure_time
            .on_date(date)
            .ok_or_else(|| RoutingCause::Request {
                message: format!("departure {departure_time} on {date} is out of range"),
            })?;

        let mut request = RouteRequest::new(origin.coordinates, destination.coordinates, earliest);
        request.locale = self.config.locale.clone();
        request.profile_duration = self.config.profile_duration.clone();
        request.limit_street_time = self.config.limit_street_time.clone();
        request.limit_solutions = self.config.limit_solutions;
        Ok(request)
    }
}
