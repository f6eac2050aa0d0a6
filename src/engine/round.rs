//! One round of the competition as an explicit state machine.
//!
//! ```text
//! Begin -> ShipPlacement -> Turn -> Turn -> ... -> End
//! ```
//!
//! A competitor that times out, faults or makes an invalid move forfeits the
//! round on the spot. The round ends as soon as fewer than two competitors
//! remain active.

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, info, warn};

use super::Competitor;
use crate::core::{BoardSnapshot, MatchConfig, PlayerId, Register, RoundStatus, Shot, ShotError};
use crate::event::{Event, EventKind, EventLog, LossReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Begin,
    ShipPlacement,
    Turn,
    End,
}

/// Result of a finished round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    /// `None` when every competitor left the round.
    pub winner: Option<PlayerId>,
    /// Number of turns taken.
    pub turns: u32,
}

/// A single round over borrowed competitors.
pub struct Round<'a> {
    number: u32,
    config: &'a MatchConfig,
    competitors: &'a mut [Competitor],
    log: &'a mut EventLog,
    turn_order: Vec<PlayerId>,
    cursor: usize,
    state: RoundState,
    turns: u32,
    winner: Option<PlayerId>,
}

impl<'a> Round<'a> {
    /// `turn_order` must list every competitor exactly once; its first entry
    /// takes the first turn.
    pub fn new(
        number: u32,
        config: &'a MatchConfig,
        competitors: &'a mut [Competitor],
        log: &'a mut EventLog,
        turn_order: Vec<PlayerId>,
    ) -> Self {
        debug_assert_eq!(turn_order.len(), competitors.len());
        Self {
            number,
            config,
            competitors,
            log,
            turn_order,
            cursor: 0,
            state: RoundState::Begin,
            turns: 0,
            winner: None,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn turn_order(&self) -> &[PlayerId] {
        &self.turn_order
    }

    /// Whose turn it is. Only meaningful in the `Turn` state.
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.state {
            RoundState::Turn => self.turn_order.get(self.cursor).copied(),
            _ => None,
        }
    }

    /// Competitors still in the round, in turn order.
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.turn_order
            .iter()
            .copied()
            .filter(|&id| self.is_active(id))
            .collect()
    }

    pub fn register(&self, id: PlayerId) -> Option<&Register> {
        self.competitors.get(id.index()).map(|c| &c.register)
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        (self.state == RoundState::End).then_some(RoundOutcome {
            winner: self.winner,
            turns: self.turns,
        })
    }

    /// Perform one transition and return the new state. Does nothing once
    /// the round has ended.
    pub async fn step(&mut self) -> RoundState {
        match self.state {
            RoundState::Begin => self.begin().await,
            RoundState::ShipPlacement => self.place_ships().await,
            RoundState::Turn => self.turn().await,
            RoundState::End => {}
        }
        self.state
    }

    /// Drive the round to the end.
    pub async fn play(mut self) -> RoundOutcome {
        while self.state != RoundState::End {
            self.step().await;
        }
        RoundOutcome {
            winner: self.winner,
            turns: self.turns,
        }
    }

    fn is_active(&self, id: PlayerId) -> bool {
        self.competitors
            .get(id.index())
            .is_some_and(|c| c.register.is_active())
    }

    fn name(&self, id: PlayerId) -> &str {
        self.competitors
            .get(id.index())
            .map_or("?", |c| c.register.name())
    }

    fn snapshot(&self, id: PlayerId) -> Option<BoardSnapshot> {
        if !self.config.record_snapshots {
            return None;
        }
        self.register(id).map(Register::snapshot)
    }

    async fn begin(&mut self) {
        for competitor in self.competitors.iter_mut() {
            competitor.register.reset();
        }
        let first = self.turn_order.first().copied();
        info!(
            "round {} begins, {} acts first",
            self.number,
            first.map_or("nobody", |id| self.name(id))
        );
        self.log.append(
            Event::new(
                self.number,
                EventKind::RoundBegin {
                    turn_order: self.turn_order.clone(),
                },
                None,
            )
            .with_detail(format!("round {}", self.number)),
        );

        // Everyone hears about the new round before anyone is removed from it.
        let mut failed = Vec::new();
        for id in self.turn_order.clone() {
            if let Err(err) = self.competitors[id.index()].controller.new_round().await {
                failed.push((id, LossReason::from(err)));
            }
        }
        for (id, reason) in failed {
            self.eliminate(id, reason).await;
        }

        self.state = RoundState::ShipPlacement;
        if self.active_players().len() < 2 {
            self.finish().await;
        }
    }

    async fn place_ships(&mut self) {
        let config = self.config;
        for id in self.turn_order.clone() {
            if !self.is_active(id) {
                continue;
            }
            let templates = Register::ship_templates(&config.ship_lengths);
            let controller = &mut self.competitors[id.index()].controller;
            let placed = match controller.place_ships(templates).await {
                Ok(placed) => placed,
                Err(err) => {
                    self.eliminate(id, err.into()).await;
                    continue;
                }
            };
            let register = &mut self.competitors[id.index()].register;
            if let Err(err) = register.set_ships(placed.value, &config.ship_lengths, config.field) {
                self.eliminate(id, LossReason::InvalidPlacement(err)).await;
                continue;
            }
            debug!("{} placed ships in {:?}", id, placed.elapsed);
            let event = Event::new(self.number, EventKind::ShipsPlaced, Some(id))
                .with_elapsed(placed.elapsed)
                .with_snapshot(self.snapshot(id));
            self.log.append(event);
        }

        if self.active_players().len() < 2 {
            self.finish().await;
            return;
        }
        self.state = RoundState::Turn;
        self.cursor = 0;
        if !self.is_active(self.turn_order[0]) {
            self.advance();
        }
    }

    async fn turn(&mut self) {
        let shooter = self.turn_order[self.cursor];
        self.turns += 1;

        match self.competitors[shooter.index()].controller.make_shot().await {
            Ok(shot) => match self.check_shot(shooter, &shot.value) {
                Ok(()) => self.resolve_shot(shooter, shot.value, shot.elapsed).await,
                Err(err) => self.eliminate(shooter, LossReason::InvalidShot(err)).await,
            },
            Err(err) => self.eliminate(shooter, err.into()).await,
        }

        if self.active_players().len() < 2 {
            self.finish().await;
        } else {
            self.advance();
        }
    }

    /// Unknown receiver, then bounds, self-targeting and duplicates, then
    /// an already eliminated receiver.
    fn check_shot(&self, shooter: PlayerId, shot: &Shot) -> Result<(), ShotError> {
        let receiver = self
            .competitors
            .get(shot.receiver.index())
            .ok_or(ShotError::UnknownReceiver(shot.receiver))?;
        self.competitors[shooter.index()]
            .register
            .check_shot(shot, self.config.field)?;
        if !receiver.register.is_active() {
            return Err(ShotError::ReceiverEliminated(shot.receiver));
        }
        Ok(())
    }

    async fn resolve_shot(&mut self, shooter: PlayerId, shot: Shot, elapsed: Duration) {
        let receiver = shot.receiver;
        self.competitors[shooter.index()].register.record_shot(shot);
        let hit = self.competitors[receiver.index()].register.receive_shot(shot.target);

        if let Err(err) = self.competitors[receiver.index()].controller.opponent_shot(shot).await {
            self.eliminate(receiver, err.into()).await;
            return;
        }

        let Some(ship) = hit else {
            let detail = format!(
                "{} missed {} at {}",
                self.name(shooter),
                self.name(receiver),
                shot.target
            );
            let event = Event::new(self.number, EventKind::ShotMiss { shot }, Some(shooter))
                .with_detail(detail)
                .with_elapsed(elapsed)
                .with_snapshot(self.snapshot(receiver));
            self.log.append(event);
            if let Err(err) = self.competitors[shooter.index()].controller.shot_miss(shot).await {
                self.eliminate(shooter, err.into()).await;
            }
            return;
        };

        let register = &self.competitors[receiver.index()].register;
        let sunk = register.is_ship_sunk(ship);
        let length = register.ships()[ship].length();
        let detail = format!(
            "{} hit {} at {}",
            self.name(shooter),
            self.name(receiver),
            shot.target
        );
        let event = Event::new(self.number, EventKind::ShotHit { shot }, Some(shooter))
            .with_detail(detail)
            .with_elapsed(elapsed)
            .with_snapshot(self.snapshot(receiver));
        self.log.append(event);
        if sunk {
            info!(
                "{} sank a ship of length {} from {}",
                self.name(shooter),
                length,
                self.name(receiver)
            );
            let detail = format!("{} lost a ship of length {}", self.name(receiver), length);
            let event = Event::new(
                self.number,
                EventKind::ShipDestroyed { shot, length },
                Some(shooter),
            )
            .with_detail(detail);
            self.log.append(event);
        }

        if let Err(err) = self.competitors[shooter.index()].controller.shot_hit(shot, sunk).await {
            self.eliminate(shooter, err.into()).await;
        }

        let register = &self.competitors[receiver.index()].register;
        if sunk && register.is_active() && register.all_sunk() {
            self.eliminate(receiver, LossReason::Defeated).await;
        }
    }

    /// Move the cursor to the next active competitor in turn order.
    fn advance(&mut self) {
        let len = self.turn_order.len();
        for _ in 0..len {
            self.cursor = (self.cursor + 1) % len;
            if self.is_active(self.turn_order[self.cursor]) {
                return;
            }
        }
    }

    /// Remove `player` from the round. Notifying the remaining competitors
    /// may fail in turn, so removals are processed as a queue.
    async fn eliminate(&mut self, player: PlayerId, reason: LossReason) {
        let mut pending = VecDeque::from([(player, reason)]);
        while let Some((player, reason)) = pending.pop_front() {
            if !self.is_active(player) {
                continue;
            }
            let status = if reason.is_forfeit() {
                warn!("{} forfeits round {}: {}", self.name(player), self.number, reason);
                RoundStatus::Forfeited
            } else {
                info!("{} is out of round {}: {}", self.name(player), self.number, reason);
                RoundStatus::Defeated
            };
            self.competitors[player.index()].register.set_status(status);

            let elapsed = match &reason {
                LossReason::Timeout { elapsed, .. } => *elapsed,
                _ => Duration::ZERO,
            };
            let detail = reason.to_string();
            self.log.append(
                Event::new(self.number, EventKind::PlayerLost { reason }, Some(player))
                    .with_detail(detail)
                    .with_elapsed(elapsed),
            );

            if let Err(err) = self.competitors[player.index()].controller.round_lost().await {
                warn!("{} missed its round_lost notification: {}", player, err);
            }

            let remaining = self.active_players();
            if remaining.len() < 2 {
                continue;
            }
            for other in remaining {
                let controller = &mut self.competitors[other.index()].controller;
                if let Err(err) = controller.opponent_eliminated(player).await {
                    pending.push_back((other, err.into()));
                }
            }
        }
    }

    async fn finish(&mut self) {
        let remaining = self.active_players();
        self.winner = remaining.first().copied();
        for id in remaining {
            info!("{} wins round {}", self.name(id), self.number);
            let detail = format!("{} won round {}", self.name(id), self.number);
            self.log
                .append(Event::new(self.number, EventKind::PlayerWon, Some(id)).with_detail(detail));
            if let Err(err) = self.competitors[id.index()].controller.round_won().await {
                warn!("{} missed its round_won notification: {}", id, err);
            }
        }
        if self.winner.is_none() {
            info!("round {} ends without a winner", self.number);
        }
        self.log.append(Event::new(
            self.number,
            EventKind::RoundEnd {
                winner: self.winner,
            },
            None,
        ));
        self.state = RoundState::End;
    }
}
