//! Planner error types.

use crate::gtfs::StoreError;
use crate::routing::RoutingFailed;
use crate::stations::DirectoryError;

/// Errors from a planner query.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// Reference data could not be loaded
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Station lookup failed
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The routing service call failed
    #[error(transparent)]
    Routing(#[from] RoutingFailed),
}
