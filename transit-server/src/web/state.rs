//! Application state for the web layer.

use std::sync::Arc;

use crate::planner::TransitPlanner;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Station and route queries
    pub planner: Arc<TransitPlanner>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(planner: TransitPlanner) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}
