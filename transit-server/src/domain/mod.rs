//! Domain types for the transit planner.
//!
//! This module contains the core model shared by the reference store, the
//! station directory and the route resolver. Reference-data types are built
//! once and then shared read-only behind `Arc`.

mod coordinates;
mod error;
mod route;
mod station;
mod time;
mod transit;

pub use coordinates::{Coordinates, Destination};
pub use error::{DomainError, InvalidTransition};
pub use route::{BestRoute, InstructionSign, Step, TransitStep, WalkInstruction, WalkStep};
pub use station::{Accessibility, Borough, Station, StationDetails};
pub use time::{ClockTime, TimeError};
pub use transit::{
    InvalidDirection, ShapeSequenceError, TransitRoute, TransitTrip, TripCollection,
    TripDirection, TripService, TripShape,
};
