//! Transit planner.
//!
//! Composes the reference store, the station directory and the routing
//! client behind one handle, and owns their background tasks.

mod config;
mod error;
mod service;

pub use config::PlannerConfig;
pub use error::PlannerError;
pub use service::TransitPlanner;
