//! Multi-round competition between registered controllers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use super::round::{Round, RoundOutcome};
use super::Competitor;
use crate::controller::{Controller, ControllerInfo, ControllerRegistry, MatchInfo, TimedController};
use crate::core::{ConfigError, MatchConfig, PlayerId, Register};
use crate::event::{Event, EventKind, EventLog, LogListener};

/// Cooperative stop request, honoured between rounds.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Final score of one competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub player: PlayerId,
    pub name: String,
    pub score: u32,
}

/// Summary returned when a competition finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub standings: Vec<Standing>,
    pub rounds: u32,
    /// The competition was stopped before its policy was satisfied.
    pub stopped: bool,
}

impl MatchResult {
    pub fn scores(&self) -> Vec<u32> {
        self.standings.iter().map(|s| s.score).collect()
    }

    /// Competitor with the strictly highest score, if there is one.
    pub fn leader(&self) -> Option<&Standing> {
        let best = self.standings.iter().map(|s| s.score).max()?;
        let mut top = self.standings.iter().filter(|s| s.score == best);
        let leader = top.next()?;
        top.next().is_none().then_some(leader)
    }
}

/// Runs rounds until the stop policy is satisfied.
///
/// Turn order is shuffled once for the first round and rotated by one
/// position for every following round, so with two competitors the first
/// mover alternates.
pub struct Competition {
    config: MatchConfig,
    competitors: Vec<Competitor>,
    log: EventLog,
    rng: SmallRng,
    stop: StopHandle,
    turn_order: Vec<PlayerId>,
    rounds_played: u32,
    started: bool,
}

impl Competition {
    /// Validate the configuration and wrap each controller in its time box.
    pub fn new(
        config: MatchConfig,
        controllers: Vec<(ControllerInfo, Box<dyn Controller>)>,
    ) -> Result<Self, ConfigError> {
        let players = controllers.len();
        config.validate(players)?;
        if let Some((info, _)) = controllers.iter().find(|(info, _)| !info.supports(players)) {
            return Err(ConfigError::UnsupportedMode {
                name: info.name.clone(),
                players,
            });
        }

        let competitors = controllers
            .into_iter()
            .enumerate()
            .map(|(idx, (info, controller))| {
                let id = PlayerId(idx);
                Competitor {
                    register: Register::new(id, info.name.clone()),
                    controller: TimedController::new(id, info, controller, config.time_limit),
                }
            })
            .collect();
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        let mut log = EventLog::with_accolades();
        log.add_listener(LogListener);

        Ok(Self {
            config,
            competitors,
            log,
            rng,
            stop: StopHandle::default(),
            turn_order: Vec::new(),
            rounds_played: 0,
            started: false,
        })
    }

    /// Build every controller by name from `registry`.
    pub fn from_registry(
        config: MatchConfig,
        registry: &ControllerRegistry,
        names: &[&str],
    ) -> Result<Self, ConfigError> {
        let controllers = names
            .iter()
            .map(|&name| {
                registry
                    .create(name)
                    .ok_or_else(|| ConfigError::UnknownController(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(config, controllers)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Mutable access for adding listeners or processors before running.
    pub fn log_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    pub fn into_log(self) -> EventLog {
        self.log
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn scores(&self) -> Vec<u32> {
        self.competitors.iter().map(|c| c.register.score()).collect()
    }

    pub fn register(&self, id: PlayerId) -> Option<&Register> {
        self.competitors.get(id.index()).map(|c| &c.register)
    }

    /// Stop policy satisfied or round cap reached.
    pub fn is_finished(&self) -> bool {
        let capped = self
            .config
            .max_rounds
            .is_some_and(|max| self.rounds_played >= max);
        capped
            || self
                .config
                .policy
                .is_finished(self.config.target_wins, &self.scores())
    }

    /// Introduce every controller to the match. Runs once; later calls are
    /// no-ops.
    pub async fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let descriptions: Vec<(PlayerId, ControllerInfo)> = self
            .competitors
            .iter()
            .map(|c| (c.register.id(), c.controller.info().clone()))
            .collect();
        for competitor in &mut self.competitors {
            let id = competitor.register.id();
            let info = MatchInfo {
                player: id,
                field: self.config.field,
                time_limit: self.config.time_limit,
                ship_lengths: self.config.ship_lengths.clone(),
                opponents: descriptions.iter().filter(|(p, _)| *p != id).cloned().collect(),
            };
            if let Err(err) = competitor.controller.new_match(info).await {
                warn!("{} failed to start the match: {}", competitor.register.name(), err);
            }
        }

        let players: Vec<String> = self
            .competitors
            .iter()
            .map(|c| c.register.name().to_string())
            .collect();
        info!("match begins: {}", players.join(" vs "));
        let detail = players.join(" vs ");
        self.log
            .append(Event::new(0, EventKind::MatchBegin { players }, None).with_detail(detail));
    }

    /// Play one more round regardless of the stop policy and credit its
    /// winner.
    pub async fn play_round(&mut self) -> RoundOutcome {
        self.start().await;
        self.rounds_played += 1;
        let order = self.next_turn_order();
        let outcome = Round::new(
            self.rounds_played,
            &self.config,
            &mut self.competitors,
            &mut self.log,
            order,
        )
        .play()
        .await;
        if let Some(winner) = outcome.winner {
            self.competitors[winner.index()].register.add_win();
        }
        info!("scores after round {}: {:?}", self.rounds_played, self.scores());
        outcome
    }

    /// Play rounds until the policy is satisfied, the round cap is reached
    /// or a stop is requested, then tell everyone the match is over.
    pub async fn run(&mut self) -> MatchResult {
        self.start().await;
        let mut stopped = false;
        while !self.is_finished() {
            if self.stop.is_stopped() {
                info!("stop requested after {} rounds", self.rounds_played);
                stopped = true;
                break;
            }
            self.play_round().await;
        }
        self.finish(stopped).await
    }

    async fn finish(&mut self, stopped: bool) -> MatchResult {
        for competitor in &mut self.competitors {
            if let Err(err) = competitor.controller.match_over().await {
                warn!("{} missed the end of the match: {}", competitor.register.name(), err);
            }
        }
        let scores = self.scores();
        self.log.append(
            Event::new(0, EventKind::MatchEnd { scores: scores.clone() }, None)
                .with_detail(format!("{} rounds, scores {:?}", self.rounds_played, scores)),
        );

        let standings = self
            .competitors
            .iter()
            .map(|c| Standing {
                player: c.register.id(),
                name: c.register.name().to_string(),
                score: c.register.score(),
            })
            .collect();
        MatchResult {
            standings,
            rounds: self.rounds_played,
            stopped,
        }
    }

    fn next_turn_order(&mut self) -> Vec<PlayerId> {
        if self.turn_order.is_empty() {
            self.turn_order = self.competitors.iter().map(|c| c.register.id()).collect();
            self.turn_order.shuffle(&mut self.rng);
        } else {
            self.turn_order.rotate_left(1);
        }
        self.turn_order.clone()
    }
}

impl std::fmt::Debug for Competition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Competition")
            .field("config", &self.config)
            .field("competitors", &self.competitors)
            .field("rounds_played", &self.rounds_played)
            .finish()
    }
}
