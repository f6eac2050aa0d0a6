pub mod controller;
pub mod core;
pub mod engine;
pub mod event;
mod logging;
pub mod prelude;

pub use crate::controller::{
    Controller, ControllerCall, ControllerError, ControllerInfo, ControllerRegistry, GameMode,
    MatchInfo, RandomBot, SweepBot, TimedController,
};
pub use crate::core::{
    BoardSnapshot, ConfigError, Coordinates, FieldSize, MatchConfig, Orientation, PlacementError,
    PlayerId, Register, RoundStatus, Ship, ShipError, Shot, ShotError, StopPolicy, BOARD_SIZE,
    DEFAULT_TARGET_WINS, DEFAULT_TIME_LIMIT, NUM_SHIPS, SHIP_LENGTHS,
};
pub use crate::engine::{
    Competition, Competitor, MatchResult, Round, RoundOutcome, RoundState, Standing, StopHandle,
};
pub use crate::event::{Accolade, Event, EventKind, EventLog, LossReason};
pub use logging::init_logging;
