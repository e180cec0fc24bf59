//! Web layer for the transit planner.
//!
//! Provides JSON endpoints for nearby stations, station details and routes.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
