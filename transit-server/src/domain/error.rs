//! Domain error types.
//!
//! These errors represent broken invariants of the domain model. They are
//! distinct from API and IO errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// A route was built with no steps
    #[error("route must have at least one step")]
    EmptyRoute,
}

/// An event arrived in a state that has no transition for it.
///
/// This is a protocol violation by the caller, not a runtime condition;
/// the owning task logs it and panics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid state transition: {event} in state {state}")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub event: &'static str,
}
