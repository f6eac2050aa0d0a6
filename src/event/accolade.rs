//! Accolade processors.
//!
//! A processor looks at each event before it is stored and may tag it. It
//! keeps only a small rolling state of its own, which is cleared at every
//! round start unless noted otherwise.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Event, EventKind};
use crate::core::PlayerId;

/// Derived, non-authoritative annotation on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accolade {
    /// Round won after trailing by two or more ships.
    Comeback,
    /// Round won without losing a ship.
    Domination,
    /// Fifth hit in a row.
    HotStreak,
    /// Shot chosen far faster than the player's usual pace.
    Fast,
    /// Shot chosen far slower than the player's usual pace.
    Slow,
    /// A sinking that answers the opponent sinking one of the shooter's ships.
    HeadToHead,
}

/// Inspects events as they are appended and tags them.
pub trait AccoladeProcessor: Send {
    fn process(&mut self, event: &Event, tags: &mut Vec<Accolade>);
}

/// One of each processor shipped with the crate.
pub fn default_processors() -> Vec<Box<dyn AccoladeProcessor>> {
    vec![
        Box::new(ComebackProcessor::default()),
        Box::new(DominationProcessor::default()),
        Box::new(StreakProcessor::default()),
        Box::new(PaceProcessor::default()),
        Box::new(HeadToHeadProcessor::default()),
    ]
}

/// Tags the round win of a player that lost no ship.
#[derive(Debug, Default)]
pub struct DominationProcessor {
    lost: HashMap<PlayerId, usize>,
}

impl AccoladeProcessor for DominationProcessor {
    fn process(&mut self, event: &Event, tags: &mut Vec<Accolade>) {
        match &event.kind {
            EventKind::RoundBegin { .. } => self.lost.clear(),
            EventKind::ShipDestroyed { shot, .. } => {
                *self.lost.entry(shot.receiver).or_default() += 1;
            }
            EventKind::PlayerWon => {
                if let Some(player) = event.player {
                    if self.lost.get(&player).copied().unwrap_or(0) == 0 {
                        tags.push(Accolade::Domination);
                    }
                }
            }
            _ => {}
        }
    }
}

const COMEBACK_DEFICIT: usize = 2;

/// Tags the round win of a player that was at some point two or more ships
/// behind the best-placed opponent.
#[derive(Debug, Default)]
pub struct ComebackProcessor {
    players: Vec<PlayerId>,
    lost: HashMap<PlayerId, usize>,
    worst_deficit: HashMap<PlayerId, usize>,
}

impl AccoladeProcessor for ComebackProcessor {
    fn process(&mut self, event: &Event, tags: &mut Vec<Accolade>) {
        match &event.kind {
            EventKind::RoundBegin { turn_order } => {
                self.players = turn_order.clone();
                self.lost.clear();
                self.worst_deficit.clear();
            }
            EventKind::ShipDestroyed { shot, .. } => {
                *self.lost.entry(shot.receiver).or_default() += 1;
                for &player in &self.players {
                    let own = self.lost.get(&player).copied().unwrap_or(0);
                    let best_other = self
                        .players
                        .iter()
                        .filter(|&&p| p != player)
                        .map(|p| self.lost.get(p).copied().unwrap_or(0))
                        .min()
                        .unwrap_or(0);
                    let deficit = own.saturating_sub(best_other);
                    let worst = self.worst_deficit.entry(player).or_default();
                    *worst = (*worst).max(deficit);
                }
            }
            EventKind::PlayerWon => {
                if let Some(player) = event.player {
                    if self.worst_deficit.get(&player).copied().unwrap_or(0) >= COMEBACK_DEFICIT {
                        tags.push(Accolade::Comeback);
                    }
                }
            }
            _ => {}
        }
    }
}

const STREAK_LENGTH: usize = 5;

/// Tags the hit that completes a run of five consecutive hits.
#[derive(Debug, Default)]
pub struct StreakProcessor {
    streaks: HashMap<PlayerId, usize>,
}

impl AccoladeProcessor for StreakProcessor {
    fn process(&mut self, event: &Event, tags: &mut Vec<Accolade>) {
        let Some(player) = event.player else {
            if matches!(event.kind, EventKind::RoundBegin { .. }) {
                self.streaks.clear();
            }
            return;
        };
        match event.kind {
            EventKind::ShotHit { .. } => {
                let streak = self.streaks.entry(player).or_default();
                *streak += 1;
                if *streak == STREAK_LENGTH {
                    tags.push(Accolade::HotStreak);
                }
            }
            EventKind::ShotMiss { .. } => {
                self.streaks.insert(player, 0);
            }
            _ => {}
        }
    }
}

const PACE_SAMPLES: u32 = 5;
const PACE_FACTOR: f64 = 4.0;

/// Compares each shot's elapsed time with the shooter's running mean over
/// the whole match. Needs five samples before it tags anything.
#[derive(Debug, Default)]
pub struct PaceProcessor {
    pace: HashMap<PlayerId, (u32, f64)>,
}

impl AccoladeProcessor for PaceProcessor {
    fn process(&mut self, event: &Event, tags: &mut Vec<Accolade>) {
        if !matches!(event.kind, EventKind::ShotHit { .. } | EventKind::ShotMiss { .. }) {
            return;
        }
        let Some(player) = event.player else {
            return;
        };
        let elapsed = event.elapsed.as_secs_f64();
        let (count, mean) = self.pace.entry(player).or_insert((0, 0.0));
        if *count >= PACE_SAMPLES && *mean > 0.0 {
            if elapsed > *mean * PACE_FACTOR {
                tags.push(Accolade::Slow);
            } else if elapsed * PACE_FACTOR < *mean {
                tags.push(Accolade::Fast);
            }
        }
        *count += 1;
        *mean += (elapsed - *mean) / f64::from(*count);
    }
}

/// Tags a sinking whose receiver sank one of the shooter's ships with the
/// previous sinking of the round.
#[derive(Debug, Default)]
pub struct HeadToHeadProcessor {
    last: Option<(PlayerId, PlayerId)>,
}

impl AccoladeProcessor for HeadToHeadProcessor {
    fn process(&mut self, event: &Event, tags: &mut Vec<Accolade>) {
        match &event.kind {
            EventKind::RoundBegin { .. } => self.last = None,
            EventKind::ShipDestroyed { shot, .. } => {
                let Some(shooter) = event.player else {
                    return;
                };
                if self.last == Some((shot.receiver, shooter)) {
                    tags.push(Accolade::HeadToHead);
                }
                self.last = Some((shooter, shot.receiver));
            }
            _ => {}
        }
    }
}
