use anyhow::{anyhow, bail};

use super::{Controller, MatchInfo};
use crate::core::{Coordinates, Orientation, PlayerId, Ship, Shot};

/// Controller that places one ship per row, starting in the first column,
/// and shoots every cell in row-major order, one opponent at a time.
#[derive(Debug, Default)]
pub struct SweepBot {
    info: Option<MatchInfo>,
    /// Opponents still in the round with the index of the next cell to shoot.
    targets: Vec<(PlayerId, usize)>,
}

impl SweepBot {
    pub fn new() -> Self {
        Self::default()
    }

    fn info(&self) -> anyhow::Result<&MatchInfo> {
        self.info
            .as_ref()
            .ok_or_else(|| anyhow!("no match in progress"))
    }
}

impl Controller for SweepBot {
    fn new_match(&mut self, info: &MatchInfo) -> anyhow::Result<()> {
        self.info = Some(info.clone());
        Ok(())
    }

    fn new_round(&mut self) -> anyhow::Result<()> {
        self.targets = self.info()?.opponents.iter().map(|(id, _)| (*id, 0)).collect();
        Ok(())
    }

    /// Ship `i` lies horizontally with its origin at `(0, i)`.
    fn place_ships(&mut self, mut ships: Vec<Ship>) -> anyhow::Result<Vec<Ship>> {
        for (row, ship) in ships.iter_mut().enumerate() {
            ship.place(Coordinates::new(0, row as i32), Orientation::Horizontal)?;
        }
        Ok(ships)
    }

    fn make_shot(&mut self) -> anyhow::Result<Shot> {
        let field = self.info()?.field;
        let area = field.area();
        self.targets.retain(|(_, next)| *next < area);
        let Some((receiver, next)) = self.targets.first_mut() else {
            bail!("no cells left to shoot");
        };
        let width = field.width as usize;
        let target = Coordinates::new((*next % width) as i32, (*next / width) as i32);
        *next += 1;
        Ok(Shot::new(target, *receiver))
    }

    fn opponent_eliminated(&mut self, player: PlayerId) -> anyhow::Result<()> {
        self.targets.retain(|(id, _)| *id != player);
        Ok(())
    }
}
