//! Common types for the arena: player identifiers and model errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::coordinates::Coordinates;

/// Identifier of one competitor. It is the competitor's index in the
/// competition and stays fixed for the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

impl PlayerId {
    /// Index of the competitor in the competition.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player #{}", self.0)
    }
}

/// Errors returned by [`Ship`](super::Ship) operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ShipError {
    /// Ship was already placed this round.
    #[error("ship is already placed")]
    AlreadyPlaced,
}

/// Reason a ship layout returned by a controller was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementError {
    /// The controller returned a different number of ships than it was given.
    #[error("expected {expected} ships, got {actual}")]
    WrongShipCount { expected: usize, actual: usize },
    /// A ship's length does not match the template at the same position.
    #[error("ship {index} has length {actual}, expected {expected}")]
    WrongShipLength {
        index: usize,
        expected: usize,
        actual: usize,
    },
    /// A ship was left unplaced.
    #[error("ship {index} was not placed")]
    NotPlaced { index: usize },
    /// A ship extends past the field.
    #[error("ship {index} lies outside the field")]
    OutOfBounds { index: usize },
    /// Two ships share a cell.
    #[error("ships {first} and {second} overlap")]
    Overlap { first: usize, second: usize },
}

/// Reason a shot was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotError {
    /// Target lies outside the field.
    #[error("shot at {0} is out of bounds")]
    OutOfBounds(Coordinates),
    /// The shooter targeted itself.
    #[error("shot targets the shooter itself")]
    SelfTarget,
    /// The receiver is not part of this competition.
    #[error("{0} is not a competitor")]
    UnknownReceiver(PlayerId),
    /// The receiver is already out of the round.
    #[error("{0} is already eliminated")]
    ReceiverEliminated(PlayerId),
    /// The same cell of the same receiver was shot before.
    #[error("{target} of {receiver} was already shot")]
    Duplicate {
        receiver: PlayerId,
        target: Coordinates,
    },
}
