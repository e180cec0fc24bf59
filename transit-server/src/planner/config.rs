//! Configuration for the transit planner.

use std::path::PathBuf;

use crate::routing::RoutingConfig;

/// Where the planner finds its data and how it reaches the routing service.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Directory holding the GTFS text files.
    pub gtfs_dir: PathBuf,

    /// The bundled station table (CSV).
    pub station_table: PathBuf,

    /// Routing service client settings.
    pub routing: RoutingConfig,
}

impl PlannerConfig {
    /// Create a configuration with the given data paths and default routing.
    pub fn new(gtfs_dir: impl Into<PathBuf>, station_table: impl Into<PathBuf>) -> Self {
        Self {
            gtfs_dir: gtfs_dir.into(),
            station_table: station_table.into(),
            routing: RoutingConfig::default(),
        }
    }

    /// Use the given routing settings.
    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new("data/gtfs", "data/Stations.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.gtfs_dir, PathBuf::from("data/gtfs"));
        assert_eq!(config.station_table, PathBuf::from("data/Stations.csv"));
        assert_eq!(config.routing.limit_solutions, Some(5));
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::new("/srv/gtfs", "/srv/stations.csv")
            .with_routing(RoutingConfig::default().with_base_url("http://router:8989"));

        assert_eq!(config.gtfs_dir, PathBuf::from("/srv/gtfs"));
        assert_eq!(config.station_table, PathBuf::from("/srv/stations.csv"));
        assert_eq!(config.routing.base_url, "http://router:8989");
    }
}
