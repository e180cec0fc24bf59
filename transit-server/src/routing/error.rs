//! Routing client error types.

use crate::domain::TimeError;

/// A routing call that produced no routes.
#[derive(Debug, thiserror::Error)]
#[error("routing failed: {cause}")]
pub struct RoutingFailed {
    #[source]
    pub cause: RoutingCause,
}

impl RoutingFailed {
    pub fn new(cause: RoutingCause) -> Self {
        Self { cause }
    }
}

impl From<RoutingCause> for RoutingFailed {
    fn from(cause: RoutingCause) -> Self {
        Self::new(cause)
    }
}

impl From<DecodeError> for RoutingFailed {
    fn from(err: DecodeError) -> Self {
        Self::new(RoutingCause::Decode(err))
    }
}

/// Why a routing call failed.
#[derive(Debug, thiserror::Error)]
pub enum RoutingCause {
    /// The request could not be built
    #[error("invalid request: {message}")]
    Request { message: String },

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// The routing service returned a non-success status
    #[error("routing service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The routing service returned no body
    #[error("empty response body")]
    EmptyBody,

    /// The body could not be decoded into routes
    #[error(transparent)]
    Decode(DecodeError),
}

/// Errors decoding a routing response.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Malformed JSON, or JSON of the wrong shape
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// A leg had no `type` field
    #[error("leg has no type")]
    MissingLegType,

    /// A leg had a `type` other than `walk` or `pt`
    #[error("unknown leg type: {0}")]
    UnknownLegType(String),

    /// A coordinate pair had fewer than two components
    #[error("coordinate must have latitude and longitude, got {0} values")]
    Coordinate(usize),

    /// A leg timestamp could not be parsed
    #[error("invalid {field}: {source}")]
    Time {
        field: &'static str,
        #[source]
        source: TimeError,
    },

    /// A path with no legs
    #[error("path {0} has no legs")]
    EmptyPath(usize),
}
