//! Per-competitor state kept by the round engine.

use serde::{Deserialize, Serialize};

use super::common::{PlacementError, PlayerId, ShotError};
use super::coordinates::{Coordinates, FieldSize};
use super::ship::Ship;
use super::shot::Shot;

/// Where a competitor stands in the current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundStatus {
    #[default]
    Active,
    /// Lost every ship.
    Defeated,
    /// Timed out, faulted or made an invalid move.
    Forfeited,
}

/// Copy of one competitor's board at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub player: PlayerId,
    pub ships: Vec<Ship>,
    pub shots_received: Vec<Coordinates>,
}

/// One competitor's state. Ships and shots live for a single round; the
/// score lives for the whole competition.
#[derive(Debug, Clone)]
pub struct Register {
    id: PlayerId,
    name: String,
    score: u32,
    status: RoundStatus,
    ships: Vec<Ship>,
    shots: Vec<Shot>,
    shots_received: Vec<Coordinates>,
}

impl Register {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            status: RoundStatus::Active,
            ships: Vec::new(),
            shots: Vec::new(),
            shots_received: Vec::new(),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn add_win(&mut self) {
        self.score += 1;
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn set_status(&mut self, status: RoundStatus) {
        self.status = status;
    }

    pub fn is_active(&self) -> bool {
        self.status == RoundStatus::Active
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Shots this competitor fired this round.
    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    /// Cells of this competitor's field that were shot this round.
    pub fn shots_received(&self) -> &[Coordinates] {
        &self.shots_received
    }

    /// Clear round state for a new round. The score is kept.
    pub fn reset(&mut self) {
        self.status = RoundStatus::Active;
        self.ships.clear();
        self.shots.clear();
        self.shots_received.clear();
    }

    /// Fresh unplaced ships for the configured lengths.
    pub fn ship_templates(lengths: &[usize]) -> Vec<Ship> {
        lengths.iter().map(|&len| Ship::new(len)).collect()
    }

    /// Validate a layout returned by a controller against the templates it
    /// was given and install it on success.
    pub fn set_ships(
        &mut self,
        ships: Vec<Ship>,
        lengths: &[usize],
        field: FieldSize,
    ) -> Result<(), PlacementError> {
        if ships.len() != lengths.len() {
            return Err(PlacementError::WrongShipCount {
                expected: lengths.len(),
                actual: ships.len(),
            });
        }
        for (index, (ship, &expected)) in ships.iter().zip(lengths).enumerate() {
            if ship.length() != expected {
                return Err(PlacementError::WrongShipLength {
                    index,
                    expected,
                    actual: ship.length(),
                });
            }
            if !ship.is_placed() {
                return Err(PlacementError::NotPlaced { index });
            }
            if !ship.is_valid(field) {
                return Err(PlacementError::OutOfBounds { index });
            }
        }
        for (first, a) in ships.iter().enumerate() {
            for (second, b) in ships.iter().enumerate().skip(first + 1) {
                if a.conflicts_with(b) {
                    return Err(PlacementError::Overlap { first, second });
                }
            }
        }
        self.ships = ships;
        Ok(())
    }

    /// Check the parts of shot legality that depend on the shooter alone:
    /// field bounds, self-targeting and duplicates.
    pub fn check_shot(&self, shot: &Shot, field: FieldSize) -> Result<(), ShotError> {
        if !field.contains(shot.target) {
            return Err(ShotError::OutOfBounds(shot.target));
        }
        if shot.receiver == self.id {
            return Err(ShotError::SelfTarget);
        }
        if self.shots.contains(shot) {
            return Err(ShotError::Duplicate {
                receiver: shot.receiver,
                target: shot.target,
            });
        }
        Ok(())
    }

    pub fn record_shot(&mut self, shot: Shot) {
        self.shots.push(shot);
    }

    /// Record an incoming shot and return the index of the ship it hit.
    pub fn receive_shot(&mut self, target: Coordinates) -> Option<usize> {
        self.shots_received.push(target);
        self.ships.iter().position(|ship| ship.is_at(target))
    }

    /// Whether the ship at `index` is sunk by the shots received so far.
    pub fn is_ship_sunk(&self, index: usize) -> bool {
        self.ships
            .get(index)
            .is_some_and(|ship| ship.is_sunk(&self.shots_received))
    }

    /// Every ship is sunk.
    pub fn all_sunk(&self) -> bool {
        !self.ships.is_empty() && self.ships.iter().all(|s| s.is_sunk(&self.shots_received))
    }

    /// Number of ships sunk so far.
    pub fn ships_lost(&self) -> usize {
        self.ships
            .iter()
            .filter(|s| s.is_sunk(&self.shots_received))
            .count()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            player: self.id,
            ships: self.ships.clone(),
            shots_received: self.shots_received.clone(),
        }
    }
}
