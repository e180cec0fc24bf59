//! Public-transit routing through a GraphHopper service.
//!
//! [`RoutingClient`] builds the `/route` query, decodes the polymorphic leg
//! list and resolves GTFS ids against [`ReferenceData`](crate::gtfs::ReferenceData).
//! Ids the reference data does not know are replaced by placeholders rather
//! than failing the route.

mod client;
mod convert;
mod error;
mod request;
mod types;

pub use client::{RoutingClient, RoutingConfig};
pub use convert::convert_response;
pub use error::{DecodeError, RoutingCause, RoutingFailed};
pub use request::RouteRequest;
pub use types::{
    Geometry, InstructionDto, Leg, PathDto, PointGeometry, PtLeg, PtStop, RouteResponse, WalkLeg,
};
