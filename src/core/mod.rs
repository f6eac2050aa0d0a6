//! Board and ship model for the arena.
//!
//! Pure value types with no knowledge of controllers or timing: field
//! dimensions, coordinates, ships, shots and the per-competitor register
//! the round engine mutates.

pub mod common;
pub mod config;
pub mod coordinates;
pub mod register;
pub mod ship;
pub mod shot;

// Re-export commonly used types
pub use common::{PlacementError, PlayerId, ShipError, ShotError};
pub use config::*;
pub use coordinates::{Coordinates, FieldSize};
pub use register::{BoardSnapshot, Register, RoundStatus};
pub use ship::{Orientation, Ship};
pub use shot::Shot;
