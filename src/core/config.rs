use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::coordinates::FieldSize;

pub const BOARD_SIZE: i32 = 10;
pub const NUM_SHIPS: usize = 5;
pub const SHIP_LENGTHS: [usize; NUM_SHIPS] = [5, 4, 3, 3, 2];

/// Per-call budget granted to a controller unless configured otherwise.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_millis(200);
pub const DEFAULT_TARGET_WINS: u32 = 3;

/// When a competition stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StopPolicy {
    /// Stop as soon as any competitor reaches the target score.
    #[default]
    FirstTo,
    /// Keep playing until `target * 2 - 1` rounds have been won in total.
    PlayOut,
}

impl StopPolicy {
    /// Stopping predicate evaluated before every round.
    pub fn is_finished(self, target: u32, scores: &[u32]) -> bool {
        match self {
            StopPolicy::FirstTo => scores.iter().any(|&s| s >= target),
            StopPolicy::PlayOut => {
                let total = scores.iter().fold(0u32, |acc, &s| acc.saturating_add(s));
                total >= target.saturating_mul(2).saturating_sub(1)
            }
        }
    }
}

/// Everything needed to run a competition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub field: FieldSize,
    pub ship_lengths: Vec<usize>,
    /// Hard wall-clock limit on every single controller call.
    pub time_limit: Duration,
    pub target_wins: u32,
    pub policy: StopPolicy,
    /// Seed for turn-order shuffling. `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    /// Upper bound on rounds played, whatever the stop policy says.
    pub max_rounds: Option<u32>,
    /// Attach board snapshots to placement and shot events.
    pub record_snapshots: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            field: FieldSize::new(BOARD_SIZE, BOARD_SIZE),
            ship_lengths: SHIP_LENGTHS.to_vec(),
            time_limit: DEFAULT_TIME_LIMIT,
            target_wins: DEFAULT_TARGET_WINS,
            policy: StopPolicy::FirstTo,
            seed: None,
            max_rounds: None,
            record_snapshots: false,
        }
    }
}

/// Invalid competition setup. Always reported before the first round.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("at least 2 controllers are required, got {0}")]
    NotEnoughPlayers(usize),
    #[error("field size {0} is invalid")]
    InvalidField(FieldSize),
    #[error("no ships configured")]
    NoShips,
    #[error("ship {index} has length 0")]
    ZeroLengthShip { index: usize },
    #[error("ship {index} of length {length} does not fit on the field")]
    ShipTooLong { index: usize, length: usize },
    #[error("ships need {cells} cells but the field only has {area}")]
    FieldTooSmall { cells: usize, area: usize },
    #[error("time limit must be greater than zero")]
    ZeroTimeLimit,
    #[error("target wins must be greater than zero")]
    ZeroTargetWins,
    #[error("no controller registered as {0}")]
    UnknownController(String),
    #[error("controller {name} does not support {players}-player matches")]
    UnsupportedMode { name: String, players: usize },
}

impl MatchConfig {
    /// Check the configuration for a competition between `players` controllers.
    pub fn validate(&self, players: usize) -> Result<(), ConfigError> {
        if players < 2 {
            return Err(ConfigError::NotEnoughPlayers(players));
        }
        if self.field.width < 1 || self.field.height < 1 {
            return Err(ConfigError::InvalidField(self.field));
        }
        if self.ship_lengths.is_empty() {
            return Err(ConfigError::NoShips);
        }
        let longest_side = self.field.width.max(self.field.height) as usize;
        for (index, &length) in self.ship_lengths.iter().enumerate() {
            if length == 0 {
                return Err(ConfigError::ZeroLengthShip { index });
            }
            if length > longest_side {
                return Err(ConfigError::ShipTooLong { index, length });
            }
        }
        let cells: usize = self.ship_lengths.iter().sum();
        let area = self.field.area();
        if cells > area {
            return Err(ConfigError::FieldTooSmall { cells, area });
        }
        if self.time_limit.is_zero() {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if self.target_wins == 0 {
            return Err(ConfigError::ZeroTargetWins);
        }
        Ok(())
    }
}
