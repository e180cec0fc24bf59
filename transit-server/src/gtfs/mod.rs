//! Static GTFS reference data.
//!
//! [`load_reference_data`] reads a GTFS directory into an immutable
//! [`ReferenceData`]; [`ReferenceStore`] loads it once in the background and
//! hands the same `Arc` to every caller.

mod data;
mod error;
mod loader;
mod store;

pub use data::ReferenceData;
pub use error::{GtfsError, StoreError};
pub use loader::load_reference_data;
pub use store::ReferenceStore;
