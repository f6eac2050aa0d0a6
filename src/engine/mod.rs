//! Round state machine and competition loop.

pub mod competition;
pub mod round;

pub use competition::{Competition, MatchResult, Standing, StopHandle};
pub use round::{Round, RoundOutcome, RoundState};

use crate::controller::TimedController;
use crate::core::Register;

/// One competitor: its state and its time-boxed controller.
#[derive(Debug)]
pub struct Competitor {
    pub register: Register,
    pub controller: TimedController,
}
