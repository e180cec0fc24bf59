//! GTFS loading and reference store error types.

use crate::domain::{InvalidDirection, ShapeSequenceError};

/// Errors that can occur while loading the GTFS bundle.
#[derive(Debug, thiserror::Error)]
pub enum GtfsError {
    /// File missing, unreadable, or not valid CSV
    #[error("failed to read {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },

    /// A row parsed as CSV but a field was invalid
    #[error("{file} line {line}: {message}")]
    InvalidRow {
        file: &'static str,
        line: usize,
        message: String,
    },

    /// A stop named a parent station that had not been seen yet
    #[error("stop {stop_id} references parent {parent_id} before it is defined")]
    UnknownParent { stop_id: String, parent_id: String },

    /// A trip named a route that is not in routes.txt
    #[error("trip {trip_id} references unknown route {route_id}")]
    UnknownRoute { trip_id: String, route_id: String },

    /// Shape points out of sequence
    #[error(transparent)]
    Shape(#[from] ShapeSequenceError),

    /// Direction id other than 0 or 1
    #[error("trip {trip_id}: {source}")]
    Direction {
        trip_id: String,
        #[source]
        source: InvalidDirection,
    },
}

/// Errors returned to callers waiting on the reference store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store will never be loaded (load failed or was cancelled)
    #[error("reference data unavailable: {reason}")]
    Unavailable { reason: String },
}
