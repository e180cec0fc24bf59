//! The transit planner: one reference store, one station directory and one
//! routing client, started and stopped together.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info};

use crate::domain::{BestRoute, ClockTime, Destination, Station, StationDetails};
use crate::gtfs::ReferenceStore;
use crate::routing::RoutingClient;
use crate::stations::{DEFAULT_RADIUS_KM, StationDirectory};

use super::config::PlannerConfig;
use super::error::PlannerError;

/// Answers station and route queries.
#[derive(Debug)]
pub struct TransitPlanner {
    store: ReferenceStore,
    directory: StationDirectory,
    routing: RoutingClient,
}

impl TransitPlanner {
    /// Start loading reference data and the station table in the background.
    ///
    /// Must be called from within a Tokio runtime. Queries made before the
    /// data is ready wait for it.
    pub fn start(config: PlannerConfig) -> Result<Self, PlannerError> {
        let routing = RoutingClient::new(config.routing)?;

        info!(
            gtfs_dir = %config.gtfs_dir.display(),
            station_table = %config.station_table.display(),
            "starting transit planner"
        );
        let store = ReferenceStore::spawn(config.gtfs_dir, |e| {
            error!(error = %e, "routes and station details are unavailable");
        });
        let directory = StationDirectory::spawn(config.station_table, store.clone());

        Ok(Self::from_parts(store, directory, routing))
    }

    /// Assemble a planner from running parts.
    pub fn from_parts(
        store: ReferenceStore,
        directory: StationDirectory,
        routing: RoutingClient,
    ) -> Self {
        Self {
            store,
            directory,
            routing,
        }
    }

    /// Stations within walking distance of `destination`.
    pub async fn nearby_stations(
        &self,
        destination: &Destination,
    ) -> Result<Vec<Station>, PlannerError> {
        self.nearby_stations_within(destination, DEFAULT_RADIUS_KM).await
    }

    pub async fn nearby_stations_within(
        &self,
        destination: &Destination,
        radius_km: f64,
    ) -> Result<Vec<Station>, PlannerError> {
        Ok(self
            .directory
            .find_nearby_stations_within(destination, radius_km)
            .await?)
    }

    pub async fn station_details(
        &self,
        station: &Station,
    ) -> Result<Arc<StationDetails>, PlannerError> {
        Ok(self.directory.find_station_details(station).await?)
    }

    /// Routes leaving at or after `time` today, in the routing service's order.
    pub async fn best_routes(
        &self,
        origin: &Destination,
        destination: &Destination,
        time: ClockTime,
    ) -> Result<Vec<BestRoute>, PlannerError> {
        let data = self.store.get().await?;
        Ok(self
            .routing
            .find_best_routes(origin, destination, time, &data)
            .await?)
    }

    /// Routes leaving at or after `time` on `date`.
    pub async fn best_routes_on(
        &self,
        origin: &Destination,
        destination: &Destination,
        time: ClockTime,
        date: NaiveDate,
    ) -> Result<Vec<BestRoute>, PlannerError> {
        let data = self.store.get().await?;
        Ok(self
            .routing
            .find_best_routes_on(origin, destination, time, date, &data)
            .await?)
    }

    /// Stop background work. Loaded reference data stays usable.
    pub fn shutdown(&self) {
        info!(
            reference_data_loaded = self.store.is_loaded(),
            "shutting down transit planner"
        );
        self.store.cancel();
        self.directory.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::{Accessibility, Borough, Coordinates};
    use crate::gtfs::{ReferenceData, StoreError};
    use crate::routing::{RoutingCause, RoutingConfig};
    use crate::stations::{DirectoryError, StationIndex};

    fn kings_hwy() -> Station {
        Station {
            name: "Kings Hwy".into(),
            coordinates: Coordinates::new(40.60867, -73.957734),
            accessibility: Accessibility::Accessible,
            borough: Borough::Brooklyn,
            accessibility_note: String::new(),
        }
    }

    fn index() -> StationIndex {
        let station = kings_hwy();
        [(station.coordinates, station)].into_iter().collect()
    }

    fn details() -> Arc<StationDetails> {
        Arc::new(StationDetails {
            id: "D35".into(),
            name: "Kings Hwy".into(),
            coordinates: Coordinates::new(40.60867, -73.957734),
            routes: vec![],
            accessibility: Accessibility::NotAccessible,
            parent_id: None,
            child_ids: vec![],
        })
    }

    /// A routing client pointed at a port nobody listens on.
    async fn dead_routing() -> RoutingClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        RoutingClient::new(RoutingConfig::default().with_base_url(format!("http://{addr}")))
            .unwrap()
    }

    fn here() -> Destination {
        Destination::new(Coordinates::new(40.6108, -73.9414), "Midwood")
    }

    #[tokio::test]
    async fn stations_and_details() {
        let data = ReferenceData::new(vec![], vec![], vec![details()]);
        let store = ReferenceStore::loaded(Arc::new(data));
        let directory = StationDirectory::new(store.clone());
        directory.publish_index(index());
        let planner = TransitPlanner::from_parts(store, directory, dead_routing().await);

        let nearby = planner.nearby_stations_within(&here(), 2.0).await.unwrap();
        assert_eq!(nearby, vec![kings_hwy()]);
        assert!(planner.nearby_stations(&here()).await.unwrap().is_empty());

        let found = planner.station_details(&nearby[0]).await.unwrap();
        assert_eq!(found.id, "D35");
    }

    #[tokio::test]
    async fn routing_failure_is_reported() {
        let store = ReferenceStore::loaded(Arc::new(ReferenceData::default()));
        let directory = StationDirectory::new(store.clone());
        let planner = TransitPlanner::from_parts(store, directory, dead_routing().await);

        let err = planner
            .best_routes(&here(), &here(), ClockTime::new(8, 30, 0))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, PlannerError::Routing(f) if matches!(f.cause, RoutingCause::Network(_))),
            "{err}"
        );
    }

    #[tokio::test]
    async fn shutdown_cancels_loading() {
        let store = ReferenceStore::spawn_with(
            || {
                std::thread::sleep(Duration::from_millis(200));
                Ok(ReferenceData::default())
            },
            |_| {},
        );
        let directory = StationDirectory::new(store.clone());
        let planner = TransitPlanner::from_parts(store, directory, dead_routing().await);
        planner.shutdown();

        let err = planner
            .best_routes(&here(), &here(), ClockTime::new(8, 30, 0))
            .await
            .unwrap_err();
        assert!(
            matches!(&err, PlannerError::Store(StoreError::Unavailable { .. })),
            "{err}"
        );

        let err = planner.nearby_stations(&here()).await.unwrap_err();
        assert!(matches!(err, PlannerError::Directory(DirectoryError::Closed)));
    }
}
