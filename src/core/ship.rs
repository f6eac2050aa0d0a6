//! Ship definitions and placement checks.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::common::ShipError;
use super::coordinates::{Coordinates, FieldSize};

/// Orientation of a ship on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Extends along +x from its origin.
    Horizontal,
    /// Extends along +y from its origin.
    Vertical,
}

impl Orientation {
    fn step(self) -> (i32, i32) {
        match self {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
        }
    }
}

/// A ship of fixed length. Ships are handed out unplaced at the start of
/// every round and placed exactly once by their controller.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ship {
    length: usize,
    placement: Option<(Coordinates, Orientation)>,
}

impl Ship {
    /// Create an unplaced ship. Lengths are validated by the match
    /// configuration; a ship is never shorter than one cell.
    pub const fn new(length: usize) -> Self {
        Self {
            length,
            placement: None,
        }
    }

    /// Ship's length.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Place the ship with its bottom/left-most cell at `origin`.
    pub fn place(&mut self, origin: Coordinates, orientation: Orientation) -> Result<(), ShipError> {
        if self.placement.is_some() {
            return Err(ShipError::AlreadyPlaced);
        }
        self.placement = Some((origin, orientation));
        Ok(())
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    /// Origin cell, if placed.
    pub fn location(&self) -> Option<Coordinates> {
        self.placement.map(|(origin, _)| origin)
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.placement.map(|(_, orientation)| orientation)
    }

    /// Cells occupied by the ship. Empty while unplaced.
    pub fn cells(&self) -> impl Iterator<Item = Coordinates> {
        let (origin, (dx, dy), length) = match self.placement {
            Some((origin, orientation)) => (origin, orientation.step(), self.length),
            None => (Coordinates::ORIGIN, (0, 0), 0),
        };
        (0..length as i32).map(move |i| origin.offset(dx * i, dy * i))
    }

    /// Whether the ship occupies `c`. Always false for an unplaced ship.
    pub fn is_at(&self, c: Coordinates) -> bool {
        let Some((origin, orientation)) = self.placement else {
            return false;
        };
        let (along, across) = match orientation {
            Orientation::Horizontal => (c.x - origin.x, c.y - origin.y),
            Orientation::Vertical => (c.y - origin.y, c.x - origin.x),
        };
        across == 0 && along >= 0 && (along as usize) < self.length
    }

    /// Placed and entirely inside `field`.
    pub fn is_valid(&self, field: FieldSize) -> bool {
        self.is_placed() && self.cells().all(|c| field.contains(c))
    }

    /// Both ships are placed and share at least one cell.
    pub fn conflicts_with(&self, other: &Ship) -> bool {
        self.is_placed() && other.is_placed() && self.cells().any(|c| other.is_at(c))
    }

    /// Every occupied cell appears in `shots`.
    pub fn is_sunk(&self, shots: &[Coordinates]) -> bool {
        self.is_placed() && self.cells().all(|c| shots.contains(&c))
    }
}

impl fmt::Debug for Ship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.placement {
            Some((origin, orientation)) => write!(
                f,
                "Ship {{ length: {}, origin: {}, orientation: {:?} }}",
                self.length, origin, orientation
            ),
            None => write!(f, "Ship {{ length: {}, unplaced }}", self.length),
        }
    }
}
