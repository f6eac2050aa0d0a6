//! Events recorded while a competition runs.
//!
//! Every state transition of a round becomes one immutable [`Event`]
//! appended to the [`EventLog`]. Accolade processors may tag an event before
//! it is stored; listeners see it right after.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::{ControllerCall, ControllerError};
use crate::core::{BoardSnapshot, PlacementError, PlayerId, Shot, ShotError};

pub mod accolade;
pub mod journal;

pub use accolade::{
    default_processors, Accolade, AccoladeProcessor, ComebackProcessor, DominationProcessor,
    HeadToHeadProcessor, PaceProcessor, StreakProcessor,
};
pub use journal::{EventListener, EventLog, EventLogError, LogListener, Pacing, Replay};

/// Why a competitor left a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// All ships were sunk.
    Defeated,
    /// A call ran past the time limit.
    Timeout {
        call: ControllerCall,
        elapsed: Duration,
    },
    /// A call could not start because an abandoned call was still running.
    Unresponsive { call: ControllerCall },
    /// The controller returned an error or panicked.
    Fault {
        call: ControllerCall,
        message: String,
    },
    InvalidPlacement(PlacementError),
    InvalidShot(ShotError),
}

impl LossReason {
    /// Any loss other than having every ship sunk.
    pub fn is_forfeit(&self) -> bool {
        !matches!(self, LossReason::Defeated)
    }
}

impl From<ControllerError> for LossReason {
    fn from(err: ControllerError) -> Self {
        match err {
            ControllerError::Timeout { call, elapsed, .. } => LossReason::Timeout { call, elapsed },
            ControllerError::Unresponsive { call } => LossReason::Unresponsive { call },
            ControllerError::Fault { call, message } => LossReason::Fault { call, message },
        }
    }
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossReason::Defeated => write!(f, "all ships destroyed"),
            LossReason::Timeout { call, elapsed } => write!(f, "{call} timed out after {elapsed:?}"),
            LossReason::Unresponsive { call } => write!(f, "unresponsive at {call}"),
            LossReason::Fault { call, message } => write!(f, "fault in {call}: {message}"),
            LossReason::InvalidPlacement(err) => write!(f, "invalid placement: {err}"),
            LossReason::InvalidShot(err) => write!(f, "invalid shot: {err}"),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    MatchBegin { players: Vec<String> },
    /// `turn_order[0]` acts first.
    RoundBegin { turn_order: Vec<PlayerId> },
    ShipsPlaced,
    ShotHit { shot: Shot },
    ShotMiss { shot: Shot },
    ShipDestroyed { shot: Shot, length: usize },
    PlayerWon,
    PlayerLost { reason: LossReason },
    RoundEnd { winner: Option<PlayerId> },
    MatchEnd { scores: Vec<u32> },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::MatchBegin { .. } => "match-begin",
            EventKind::RoundBegin { .. } => "round-begin",
            EventKind::ShipsPlaced => "ships-placed",
            EventKind::ShotHit { .. } => "shot-hit",
            EventKind::ShotMiss { .. } => "shot-miss",
            EventKind::ShipDestroyed { .. } => "ship-destroyed",
            EventKind::PlayerWon => "won",
            EventKind::PlayerLost { .. } => "lost",
            EventKind::RoundEnd { .. } => "round-end",
            EventKind::MatchEnd { .. } => "match-end",
        }
    }

    /// The shot behind a hit, miss or sinking.
    pub fn shot(&self) -> Option<&Shot> {
        match self {
            EventKind::ShotHit { shot }
            | EventKind::ShotMiss { shot }
            | EventKind::ShipDestroyed { shot, .. } => Some(shot),
            _ => None,
        }
    }
}

/// One immutable entry of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Round number, starting at 1. Match-level events use 0.
    pub round: u32,
    pub kind: EventKind,
    /// Competitor the event is about.
    pub player: Option<PlayerId>,
    pub detail: String,
    /// Duration of the controller call that produced the event.
    pub elapsed: Duration,
    pub snapshot: Option<BoardSnapshot>,
    pub accolades: Vec<Accolade>,
}

impl Event {
    pub fn new(round: u32, kind: EventKind, player: Option<PlayerId>) -> Self {
        Self {
            round,
            kind,
            player,
            detail: String::new(),
            elapsed: Duration::ZERO,
            snapshot: None,
            accolades: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_snapshot(mut self, snapshot: Option<BoardSnapshot>) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn has_accolade(&self, accolade: Accolade) -> bool {
        self.accolades.contains(&accolade)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[round {}] {}", self.round, self.kind.name())?;
        if let Some(player) = self.player {
            write!(f, " {player}")?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        for accolade in &self.accolades {
            write!(f, " <{accolade:?}>")?;
        }
        Ok(())
    }
}
