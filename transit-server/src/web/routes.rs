//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{Local, NaiveTime};
use tracing::{error, warn};

use crate::domain::{ClockTime, Coordinates, Destination};
use crate::planner::PlannerError;
use crate::stations::DirectoryError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations/nearby", get(nearby_stations))
        .route("/stations/details", get(station_details))
        .route("/routes", get(best_routes))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Stations within a radius of a point.
async fn nearby_stations(
    State(state): State<AppState>,
    Query(req): Query<NearbyRequest>,
) -> Result<Json<NearbyResponse>, AppError> {
    let point = parse_point(req.lat, req.lon)?;
    let radius_km = match req.radius_km {
        Some(r) if !r.is_finite() || r < 0.0 => {
            return Err(AppError::BadRequest {
                message: format!("Invalid radius: {r}"),
            });
        }
        Some(r) => r,
        None => crate::stations::DEFAULT_RADIUS_KM,
    };

    let destination = Destination::new(point, "");
    let stations = state
        .planner
        .nearby_stations_within(&destination, radius_km)
        .await?;

    Ok(Json(NearbyResponse {
        stations: stations.iter().map(StationResult::from_station).collect(),
    }))
}

/// GTFS details for the station at exactly a point.
async fn station_details(
    State(state): State<AppState>,
    Query(req): Query<DetailsRequest>,
) -> Result<Json<StationDetailsResult>, AppError> {
    let point = parse_point(req.lat, req.lon)?;

    let destination = Destination::new(point, "");
    let station = state
        .planner
        .nearby_stations_within(&destination, 0.0)
        .await?
        .into_iter()
        .find(|s| s.coordinates == point)
        .ok_or_else(|| AppError::NotFound {
            message: format!("No station at {point}"),
        })?;

    let details = state.planner.station_details(&station).await?;
    Ok(Json(StationDetailsResult::from_details(&details)))
}

/// Routes between two points.
async fn best_routes(
    State(state): State<AppState>,
    Query(req): Query<RoutesRequest>,
) -> Result<Json<RoutesResponse>, AppError> {
    let from = parse_point(req.from_lat, req.from_lon)?;
    let to = parse_point(req.to_lat, req.to_lon)?;

    let time = match req.time.as_deref() {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M")
            .map(ClockTime::from)
            .map_err(|_| AppError::BadRequest {
                message: format!("Invalid time format: {t}. Use HH:MM"),
            })?,
        None => ClockTime::from(Local::now().time()),
    };

    let routes = state
        .planner
        .best_routes(
            &Destination::new(from, "origin"),
            &Destination::new(to, "destination"),
            time,
        )
        .await?;

    Ok(Json(RoutesResponse {
        routes: routes.iter().map(BestRouteResult::from_route).collect(),
    }))
}

fn parse_point(lat: f64, lon: f64) -> Result<Coordinates, AppError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::BadRequest {
            message: format!("Invalid coordinates: {lat},{lon}"),
        });
    }
    Ok(Coordinates::new(lat, lon))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// The routing service failed
    Upstream { message: String },
    /// Still starting up, or reference data failed to load
    Unavailable { message: String },
    Internal { message: String },
}

impl From<PlannerError> for AppError {
    fn from(e: PlannerError) -> Self {
        match e {
            PlannerError::Directory(DirectoryError::NotFound { .. }) => AppError::NotFound {
                message: e.to_string(),
            },
            PlannerError::Directory(DirectoryError::Superseded | DirectoryError::Unavailable(_))
            | PlannerError::Store(_) => AppError::Unavailable {
                message: e.to_string(),
            },
            PlannerError::Routing(_) => AppError::Upstream {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::{Accessibility, Borough, Station, StationDetails};
    use crate::gtfs::{ReferenceData, ReferenceStore, StoreError};
    use crate::planner::TransitPlanner;
    use crate::routing::{RoutingClient, RoutingConfig};
    use crate::stations::{StationDirectory, StationIndex};

    async fn test_state() -> AppState {
        let details = Arc::new(StationDetails {
            id: "D35".into(),
            name: "Kings Hwy".into(),
            coordinates: Coordinates::new(40.60867, -73.957734),
            routes: vec![],
            accessibility: Accessibility::NotAccessible,
            parent_id: None,
            child_ids: vec![],
        });
        let data = ReferenceData::new(vec![], vec![], vec![details]);
        let store = ReferenceStore::loaded(Arc::new(data));

        let index: StationIndex = [
            Station {
                name: "Kings Hwy".into(),
                coordinates: Coordinates::new(40.60867, -73.957734),
                accessibility: Accessibility::Accessible,
                borough: Borough::Brooklyn,
                accessibility_note: String::new(),
            },
            Station {
                name: "Avenue U".into(),
                coordinates: Coordinates::new(40.5993, -73.955929),
                accessibility: Accessibility::NotAccessible,
                borough: Borough::Brooklyn,
                accessibility_note: String::new(),
            },
        ]
        .into_iter()
        .map(|s| (s.coordinates, s))
        .collect();
        let directory = StationDirectory::new(store.clone());
        directory.publish_index(index);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let routing =
            RoutingClient::new(RoutingConfig::default().with_base_url(format!("http://{addr}")))
                .unwrap();

        AppState::new(TransitPlanner::from_parts(store, directory, routing))
    }

    #[tokio::test]
    async fn nearby_returns_stations_in_radius() {
        let state = test_state().await;
        let Json(response) = nearby_stations(
            State(state),
            Query(NearbyRequest {
                lat: 40.6108,
                lon: -73.9414,
                radius_km: Some(1.5),
            }),
        )
        .await
        .unwrap();

        let names: Vec<_> = response.stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Kings Hwy"]);
    }

    #[tokio::test]
    async fn nearby_rejects_bad_input() {
        let state = test_state().await;
        let err = nearby_stations(
            State(state.clone()),
            Query(NearbyRequest {
                lat: 91.0,
                lon: -73.9414,
                radius_km: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let err = nearby_stations(
            State(state),
            Query(NearbyRequest {
                lat: 40.6108,
                lon: -73.9414,
                radius_km: Some(-1.0),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn details_hit_and_miss() {
        let state = test_state().await;
        let Json(found) = station_details(
            State(state.clone()),
            Query(DetailsRequest {
                lat: 40.60867,
                lon: -73.957734,
            }),
        )
        .await
        .unwrap();
        assert_eq!(found.id, "D35");

        // In the station table but not in GTFS.
        let err = station_details(
            State(state.clone()),
            Query(DetailsRequest {
                lat: 40.5993,
                lon: -73.955929,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        // Not a station at all.
        let err = station_details(
            State(state),
            Query(DetailsRequest { lat: 40.0, lon: -73.0 }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn routes_report_upstream_failure() {
        let state = test_state().await;
        let err = best_routes(
            State(state.clone()),
            Query(RoutesRequest {
                from_lat: 40.61078,
                from_lon: -73.94135,
                to_lat: 42.575871,
                to_lon: -73.683647,
                time: Some("08:30".into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));

        let err = best_routes(
            State(state),
            Query(RoutesRequest {
                from_lat: 40.61078,
                from_lon: -73.94135,
                to_lat: 42.575871,
                to_lon: -73.683647,
                time: Some("half past eight".into()),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn replaced_nearby_request_is_unavailable() {
        let store = ReferenceStore::loaded(Arc::new(ReferenceData::default()));
        let directory = StationDirectory::spawn_with(
            || {
                std::thread::sleep(std::time::Duration::from_millis(50));
                StationIndex::new()
            },
            store.clone(),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let routing =
            RoutingClient::new(RoutingConfig::default().with_base_url(format!("http://{addr}")))
                .unwrap();
        let state = AppState::new(TransitPlanner::from_parts(store, directory, routing));

        let query = || {
            Query(NearbyRequest {
                lat: 40.6108,
                lon: -73.9414,
                radius_km: None,
            })
        };
        let (first, second) = futures::join!(
            nearby_stations(State(state.clone()), query()),
            nearby_stations(State(state.clone()), query()),
        );

        let results = [first, second];
        let answered = results.iter().filter(|r| r.is_ok()).count();
        let replaced = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::Unavailable { .. })))
            .count();
        assert_eq!((answered, replaced), (1, 1));
    }

    #[test]
    fn planner_errors_map_to_app_errors() {
        let err = AppError::from(PlannerError::Directory(DirectoryError::Superseded));
        assert!(matches!(err, AppError::Unavailable { .. }));

        let unavailable = StoreError::Unavailable {
            reason: "cancelled".into(),
        };
        let err = AppError::from(PlannerError::Directory(unavailable.clone().into()));
        assert!(matches!(err, AppError::Unavailable { .. }));
        let err = AppError::from(PlannerError::Store(unavailable));
        assert!(matches!(err, AppError::Unavailable { .. }));

        let err = AppError::from(PlannerError::Directory(DirectoryError::Closed));
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[test]
    fn error_status_codes() {
        let cases = [
            (AppError::BadRequest { message: "x".into() }, StatusCode::BAD_REQUEST),
            (AppError::NotFound { message: "x".into() }, StatusCode::NOT_FOUND),
            (AppError::Upstream { message: "x".into() }, StatusCode::BAD_GATEWAY),
            (AppError::Unavailable { message: "x".into() }, StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Internal { message: "x".into() }, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
