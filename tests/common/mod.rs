#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arena::engine::Competitor;
use arena::{
    Controller, ControllerInfo, Coordinates, GameMode, MatchConfig, MatchInfo, Orientation,
    PlayerId, Register, Ship, Shot, TimedController,
};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn calls() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn count(calls: &CallLog, name: &str) -> usize {
    calls.lock().unwrap().iter().filter(|c| c.as_str() == name).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Ship `i` horizontal at `(0, i)`.
    #[default]
    Rows,
    /// Ship `i` vertical at `(i, 0)`.
    Columns,
    /// Every ship at the origin.
    Overlapping,
}

/// Scriptable controller. Shoots the scripted shots first, then sweeps the
/// first remaining opponent row by row.
pub struct TestBot {
    placement: Placement,
    scripted: VecDeque<Shot>,
    shot_delay: Duration,
    notice_delay: Duration,
    fault: bool,
    panic: bool,
    failing: Option<&'static str>,
    calls: CallLog,
    info: Option<MatchInfo>,
    targets: Vec<(PlayerId, usize)>,
}

impl TestBot {
    pub fn new(calls: &CallLog) -> Self {
        Self {
            placement: Placement::Rows,
            scripted: VecDeque::new(),
            shot_delay: Duration::ZERO,
            notice_delay: Duration::ZERO,
            fault: false,
            panic: false,
            failing: None,
            calls: Arc::clone(calls),
            info: None,
            targets: Vec::new(),
        }
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn shots(mut self, shots: Vec<Shot>) -> Self {
        self.scripted = shots.into();
        self
    }

    /// Sleep this long in every `make_shot`.
    pub fn slow_shots(mut self, delay: Duration) -> Self {
        self.shot_delay = delay;
        self
    }

    /// Sleep this long in every `opponent_shot`.
    pub fn slow_to_notice(mut self, delay: Duration) -> Self {
        self.notice_delay = delay;
        self
    }

    /// Return an error from `make_shot`.
    pub fn faulty(mut self) -> Self {
        self.fault = true;
        self
    }

    /// Panic in `make_shot`.
    pub fn panicky(mut self) -> Self {
        self.panic = true;
        self
    }

    /// Return an error from the named notification, e.g. `"shot_hit"`.
    pub fn fails_in(mut self, call: &'static str) -> Self {
        self.failing = Some(call);
        self
    }

    fn record(&self, call: &str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.failing == Some(call) {
            anyhow::bail!("refusing {call}");
        }
        Ok(())
    }
}

impl Controller for TestBot {
    fn new_match(&mut self, info: &MatchInfo) -> anyhow::Result<()> {
        self.record("new_match")?;
        self.info = Some(info.clone());
        Ok(())
    }

    fn new_round(&mut self) -> anyhow::Result<()> {
        self.record("new_round")?;
        let info = self.info.as_ref().ok_or_else(|| anyhow::anyhow!("no match"))?;
        self.targets = info.opponents.iter().map(|(id, _)| (*id, 0)).collect();
        Ok(())
    }

    fn place_ships(&mut self, mut ships: Vec<Ship>) -> anyhow::Result<Vec<Ship>> {
        self.record("place_ships")?;
        for (i, ship) in ships.iter_mut().enumerate() {
            let (origin, orientation) = match self.placement {
                Placement::Rows => (Coordinates::new(0, i as i32), Orientation::Horizontal),
                Placement::Columns => (Coordinates::new(i as i32, 0), Orientation::Vertical),
                Placement::Overlapping => (Coordinates::ORIGIN, Orientation::Horizontal),
            };
            ship.place(origin, orientation)?;
        }
        Ok(ships)
    }

    fn make_shot(&mut self) -> anyhow::Result<Shot> {
        self.record("make_shot")?;
        if !self.shot_delay.is_zero() {
            std::thread::sleep(self.shot_delay);
        }
        if self.fault {
            anyhow::bail!("out of ideas");
        }
        if self.panic {
            panic!("controller exploded");
        }
        if let Some(shot) = self.scripted.pop_front() {
            return Ok(shot);
        }
        let field = self.info.as_ref().ok_or_else(|| anyhow::anyhow!("no match"))?.field;
        let (receiver, next) = self
            .targets
            .first_mut()
            .ok_or_else(|| anyhow::anyhow!("nobody to shoot"))?;
        let width = field.width as usize;
        let target = Coordinates::new((*next % width) as i32, (*next / width) as i32);
        *next += 1;
        Ok(Shot::new(target, *receiver))
    }

    fn opponent_shot(&mut self, _shot: Shot) -> anyhow::Result<()> {
        self.record("opponent_shot")?;
        if !self.notice_delay.is_zero() {
            std::thread::sleep(self.notice_delay);
        }
        Ok(())
    }

    fn shot_hit(&mut self, _shot: Shot, _sunk: bool) -> anyhow::Result<()> {
        self.record("shot_hit")
    }

    fn shot_miss(&mut self, _shot: Shot) -> anyhow::Result<()> {
        self.record("shot_miss")
    }

    fn opponent_eliminated(&mut self, player: PlayerId) -> anyhow::Result<()> {
        self.record("opponent_eliminated")?;
        self.targets.retain(|(id, _)| *id != player);
        Ok(())
    }

    fn round_won(&mut self) -> anyhow::Result<()> {
        self.record("round_won")?;
        Ok(())
    }

    fn round_lost(&mut self) -> anyhow::Result<()> {
        self.record("round_lost")?;
        Ok(())
    }

    fn match_over(&mut self) -> anyhow::Result<()> {
        self.record("match_over")?;
        Ok(())
    }
}

pub fn info(name: &str) -> ControllerInfo {
    ControllerInfo::new(name, "test", &[GameMode::Classic, GameMode::MultiPlayer])
}

pub fn entry(name: &str, bot: TestBot) -> (ControllerInfo, Box<dyn Controller>) {
    (info(name), Box::new(bot))
}

pub fn config(time_limit: Duration) -> MatchConfig {
    MatchConfig {
        time_limit,
        seed: Some(7),
        ..MatchConfig::default()
    }
}

/// Wrap the bots and introduce them to a match, ready for a standalone round.
pub async fn competitors(config: &MatchConfig, bots: Vec<(&str, TestBot)>) -> Vec<Competitor> {
    let infos: Vec<(PlayerId, ControllerInfo)> = bots
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (PlayerId(i), info(name)))
        .collect();
    let mut competitors = Vec::new();
    for (i, (name, bot)) in bots.into_iter().enumerate() {
        let id = PlayerId(i);
        let mut controller =
            TimedController::new(id, info(name), Box::new(bot), config.time_limit);
        let match_info = MatchInfo {
            player: id,
            field: config.field,
            time_limit: config.time_limit,
            ship_lengths: config.ship_lengths.clone(),
            opponents: infos.iter().filter(|(p, _)| *p != id).cloned().collect(),
        };
        controller.new_match(match_info).await.unwrap();
        competitors.push(Competitor {
            register: Register::new(id, name),
            controller,
        });
    }
    competitors
}
