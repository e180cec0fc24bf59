//! Transit planner server.
//!
//! Answers three questions for a subway rider: which stations are near this
//! point, which lines serve this station, and how do I get from here to
//! there leaving at this time.

pub mod domain;
pub mod gtfs;
pub mod planner;
pub mod routing;
pub mod stations;
pub mod web;
