use anyhow::{anyhow, bail};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{Controller, MatchInfo};
use crate::core::{Coordinates, FieldSize, Orientation, PlayerId, Ship, Shot};

const PLACEMENT_ATTEMPTS: usize = 100;

/// Controller that places ships and picks targets uniformly at random.
pub struct RandomBot {
    rng: SmallRng,
    info: Option<MatchInfo>,
    /// Opponents still in the round with the cells not yet shot.
    targets: Vec<(PlayerId, Vec<Coordinates>)>,
}

impl RandomBot {
    pub fn new() -> Self {
        let mut seed_rng = rand::rng();
        Self::with_rng(SmallRng::from_rng(&mut seed_rng))
    }

    /// Bot with a fixed seed for reproducible games.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            rng,
            info: None,
            targets: Vec::new(),
        }
    }

    fn info(&self) -> anyhow::Result<&MatchInfo> {
        self.info
            .as_ref()
            .ok_or_else(|| anyhow!("no match in progress"))
    }

    /// Returns a random (origin, orientation) for `ship` that fits `field`.
    fn random_placement(&mut self, ship: &Ship, field: FieldSize) -> Option<(Coordinates, Orientation)> {
        let len = ship.length() as i32;
        let orient = if self.rng.random() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let (max_x, max_y) = match orient {
            Orientation::Horizontal => (field.width - len, field.height - 1),
            Orientation::Vertical => (field.width - 1, field.height - len),
        };
        if max_x < 0 || max_y < 0 {
            return None;
        }
        let x = self.rng.random_range(0..=max_x);
        let y = self.rng.random_range(0..=max_y);
        Some((Coordinates::new(x, y), orient))
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for RandomBot {
    fn new_match(&mut self, info: &MatchInfo) -> anyhow::Result<()> {
        self.info = Some(info.clone());
        Ok(())
    }

    fn new_round(&mut self) -> anyhow::Result<()> {
        let info = self.info()?;
        let cells: Vec<Coordinates> = info.field.cells().collect();
        self.targets = info
            .opponents
            .iter()
            .map(|(id, _)| (*id, cells.clone()))
            .collect();
        Ok(())
    }

    fn place_ships(&mut self, ships: Vec<Ship>) -> anyhow::Result<Vec<Ship>> {
        let field = self.info()?.field;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let mut placed: Vec<Ship> = Vec::with_capacity(ships.len());
            for template in &ships {
                let mut ship = *template;
                for _ in 0..PLACEMENT_ATTEMPTS {
                    let Some((origin, orient)) = self.random_placement(&ship, field) else {
                        continue;
                    };
                    let mut candidate = ship;
                    candidate.place(origin, orient)?;
                    if placed.iter().all(|other| !other.conflicts_with(&candidate)) {
                        ship = candidate;
                        break;
                    }
                }
                if !ship.is_placed() {
                    break;
                }
                placed.push(ship);
            }
            if placed.len() == ships.len() {
                return Ok(placed);
            }
        }
        bail!("unable to place ships")
    }

    fn make_shot(&mut self) -> anyhow::Result<Shot> {
        self.targets.retain(|(_, cells)| !cells.is_empty());
        if self.targets.is_empty() {
            bail!("no cells left to shoot");
        }
        let which = self.rng.random_range(0..self.targets.len());
        let (receiver, cells) = &mut self.targets[which];
        let cell = self.rng.random_range(0..cells.len());
        let target = cells.swap_remove(cell);
        Ok(Shot::new(target, *receiver))
    }

    fn opponent_eliminated(&mut self, player: PlayerId) -> anyhow::Result<()> {
        self.targets.retain(|(id, _)| *id != player);
        Ok(())
    }
}
