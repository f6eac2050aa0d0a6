//! Controller trait and implementations
//!
//! This module defines the Controller trait every bot implements and the
//! pieces the engine wraps around it:
//! - TimedController: runs each call on an abandonable worker with a deadline
//! - ControllerRegistry: explicit table of controller factories and metadata
//! - RandomBot / SweepBot: reference controllers

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{FieldSize, PlayerId, Ship, Shot};

/// Match modes a controller can take part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// One opponent.
    Classic,
    /// Two or more opponents sharing a round.
    MultiPlayer,
}

/// Static description of a controller implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerInfo {
    pub name: String,
    pub version: String,
    pub modes: Vec<GameMode>,
}

impl ControllerInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>, modes: &[GameMode]) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            modes: modes.to_vec(),
        }
    }

    /// Whether the controller can play a match with `players` competitors.
    pub fn supports(&self, players: usize) -> bool {
        let mode = if players > 2 {
            GameMode::MultiPlayer
        } else {
            GameMode::Classic
        };
        self.modes.contains(&mode)
    }
}

impl fmt::Display for ControllerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// What a controller learns about the match it joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchInfo {
    /// The controller's own identity.
    pub player: PlayerId,
    pub field: FieldSize,
    pub time_limit: Duration,
    pub ship_lengths: Vec<usize>,
    /// Every other competitor with its description.
    pub opponents: Vec<(PlayerId, ControllerInfo)>,
}

/// Interface implemented by every bot.
///
/// A Controller is responsible for:
/// - Placing the ships it is handed each round
/// - Selecting the next shot
/// - Reacting to notifications about the round
///
/// Every call is time-boxed by the engine. Returning `Err` or panicking is a
/// fault and forfeits the round, exactly like running out of time.
pub trait Controller: Send + 'static {
    /// A new competition begins.
    fn new_match(&mut self, _info: &MatchInfo) -> anyhow::Result<()> {
        Ok(())
    }

    /// A new round begins.
    fn new_round(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Place every ship and hand them back in the same order.
    fn place_ships(&mut self, ships: Vec<Ship>) -> anyhow::Result<Vec<Ship>>;

    /// Choose the next shot.
    fn make_shot(&mut self) -> anyhow::Result<Shot>;

    /// An opponent fired at this controller's field.
    fn opponent_shot(&mut self, _shot: Shot) -> anyhow::Result<()> {
        Ok(())
    }

    /// The last shot hit a ship; `sunk` is set when that ship went down.
    fn shot_hit(&mut self, _shot: Shot, _sunk: bool) -> anyhow::Result<()> {
        Ok(())
    }

    /// The last shot missed.
    fn shot_miss(&mut self, _shot: Shot) -> anyhow::Result<()> {
        Ok(())
    }

    /// An opponent left the round and can no longer be targeted.
    fn opponent_eliminated(&mut self, _player: PlayerId) -> anyhow::Result<()> {
        Ok(())
    }

    fn round_won(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn round_lost(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn match_over(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub mod random;
pub mod registry;
pub mod sweep;
pub mod timed;

pub use random::RandomBot;
pub use registry::{ControllerFactory, ControllerRegistry};
pub use sweep::SweepBot;
pub use timed::{ControllerCall, ControllerError, Timed, TimedController};
