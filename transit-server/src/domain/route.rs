//! Planned routes.
//!
//! A [`BestRoute`] is one itinerary suggested by the routing service, made of
//! walking and transit steps in the order the service returned them.

use std::sync::Arc;

use super::error::DomainError;
use super::{ClockTime, Coordinates, StationDetails, TransitRoute, TransitTrip};

/// A walking maneuver, using the routing service's sign codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionSign {
    UTurnUnknown,
    UTurnLeft,
    KeepLeft,
    LeaveRoundabout,
    TurnSharpLeft,
    TurnLeft,
    TurnSlightLeft,
    Continue,
    TurnSlightRight,
    TurnRight,
    TurnSharpRight,
    Finish,
    ReachedVia,
    UseRoundabout,
    KeepRight,
    UTurnRight,
    /// A code outside the known set. Instructions are cosmetic, so this is
    /// kept rather than rejected.
    Unknown(i32),
}

impl InstructionSign {
    /// Map a sign code to a maneuver.
    ///
    /// ```
    /// use transit_server::domain::InstructionSign;
    ///
    /// assert_eq!(InstructionSign::from_code(-2), InstructionSign::TurnLeft);
    /// assert_eq!(InstructionSign::from_code(4), InstructionSign::Finish);
    /// assert_eq!(InstructionSign::from_code(42), InstructionSign::Unknown(42));
    /// ```
    pub fn from_code(code: i32) -> Self {
        match code {
            -98 => InstructionSign::UTurnUnknown,
            -8 => InstructionSign::UTurnLeft,
            -7 => InstructionSign::KeepLeft,
            -6 => InstructionSign::LeaveRoundabout,
            -3 => InstructionSign::TurnSharpLeft,
            -2 => InstructionSign::TurnLeft,
            -1 => InstructionSign::TurnSlightLeft,
            0 => InstructionSign::Continue,
            1 => InstructionSign::TurnSlightRight,
            2 => InstructionSign::TurnRight,
            3 => InstructionSign::TurnSharpRight,
            4 => InstructionSign::Finish,
            5 => InstructionSign::ReachedVia,
            6 => InstructionSign::UseRoundabout,
            7 => InstructionSign::KeepRight,
            8 => InstructionSign::UTurnRight,
            other => InstructionSign::Unknown(other),
        }
    }

    /// The wire code for this maneuver.
    pub fn code(&self) -> i32 {
        match self {
            InstructionSign::UTurnUnknown => -98,
            InstructionSign::UTurnLeft => -8,
            InstructionSign::KeepLeft => -7,
            InstructionSign::LeaveRoundabout => -6,
            InstructionSign::TurnSharpLeft => -3,
            InstructionSign::TurnLeft => -2,
            InstructionSign::TurnSlightLeft => -1,
            InstructionSign::Continue => 0,
            InstructionSign::TurnSlightRight => 1,
            InstructionSign::TurnRight => 2,
            InstructionSign::TurnSharpRight => 3,
            InstructionSign::Finish => 4,
            InstructionSign::ReachedVia => 5,
            InstructionSign::UseRoundabout => 6,
            InstructionSign::KeepRight => 7,
            InstructionSign::UTurnRight => 8,
            InstructionSign::Unknown(code) => *code,
        }
    }
}

/// One instruction within a walking step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkInstruction {
    /// e.g. "Turn left onto Avenue U"
    pub text: String,
    pub street_name: String,
    pub sign: InstructionSign,
}

/// A walk between two points.
#[derive(Debug, Clone)]
pub struct WalkStep {
    pub geometry: Vec<Coordinates>,
    pub departure: ClockTime,
    pub arrival: ClockTime,
    pub instructions: Vec<WalkInstruction>,
}

/// A ride on one transit trip.
#[derive(Debug, Clone)]
pub struct TransitStep {
    pub geometry: Vec<Coordinates>,
    pub departure: ClockTime,
    pub arrival: ClockTime,
    /// Stops in riding order, boarding stop first.
    pub stops: Vec<Arc<StationDetails>>,
    pub trip: Arc<TransitTrip>,
    pub route: Arc<TransitRoute>,
}

/// One step of a route.
#[derive(Debug, Clone)]
pub enum Step {
    Walk(WalkStep),
    Transit(TransitStep),
}

impl Step {
    pub fn departure(&self) -> ClockTime {
        match self {
            Step::Walk(w) => w.departure,
            Step::Transit(t) => t.departure,
        }
    }

    pub fn arrival(&self) -> ClockTime {
        match self {
            Step::Walk(w) => w.arrival,
            Step::Transit(t) => t.arrival,
        }
    }

    pub fn geometry(&self) -> &[Coordinates] {
        match self {
            Step::Walk(w) => &w.geometry,
            Step::Transit(t) => &t.geometry,
        }
    }
}

/// An itinerary: a non-empty sequence of steps.
///
/// Departure and arrival are taken from the first and last step. The steps
/// are kept in the order given; they are never re-sorted.
#[derive(Debug, Clone)]
pub struct BestRoute {
    departure: ClockTime,
    arrival: ClockTime,
    steps: Vec<Step>,
}

impl BestRoute {
    /// Build a route from its steps.
    ///
    /// Returns `DomainError::EmptyRoute` if `steps` is empty.
    pub fn from_steps(steps: Vec<Step>) -> Result<Self, DomainError> {
        let (Some(first), Some(last)) = (steps.first(), steps.last()) else {
            return Err(DomainError::EmptyRoute);
        };
        Ok(Self {
            departure: first.departure(),
            arrival: last.arrival(),
            steps,
        })
    }

    pub fn departure(&self) -> ClockTime {
        self.departure
    }

    pub fn arrival(&self) -> ClockTime {
        self.arrival
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Total minutes from departure to arrival.
    pub fn duration_minutes(&self) -> i64 {
        ClockTime::minute_duration(self.departure, self.arrival)
    }

    /// Number of transit steps.
    pub fn transit_legs(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Transit(_)))
            .count()
    }
}
