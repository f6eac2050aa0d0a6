use std::fmt;

use serde::{Deserialize, Serialize};

use super::common::PlayerId;
use super::coordinates::Coordinates;

/// A shot fired by the active controller at one opponent's field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shot {
    pub target: Coordinates,
    pub receiver: PlayerId,
}

impl Shot {
    pub const fn new(target: Coordinates, receiver: PlayerId) -> Self {
        Self { target, receiver }
    }
}

impl fmt::Display for Shot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.receiver, self.target)
    }
}
