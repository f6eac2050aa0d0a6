//! Commonly used types and utilities for ease of import.

pub use crate::controller::{
    Controller, ControllerInfo, ControllerRegistry, GameMode, MatchInfo, RandomBot, SweepBot,
};
pub use crate::core::{
    Coordinates, FieldSize, MatchConfig, Orientation, PlayerId, Ship, Shot, StopPolicy,
};
pub use crate::engine::{Competition, MatchResult, StopHandle};
pub use crate::event::{Accolade, Event, EventKind, EventLog, LossReason, Pacing};
