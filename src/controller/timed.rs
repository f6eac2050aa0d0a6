//! Time-boxed wrapper around an untrusted controller.
//!
//! Each call moves the controller onto tokio's blocking pool and waits for
//! the result with a deadline. A call that overruns is abandoned, never
//! killed: the worker keeps the controller until the call returns, and the
//! wrapper takes it back before the next call if the worker has finished by
//! then.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};

use super::{Controller, ControllerInfo, MatchInfo};
use crate::core::{PlayerId, Ship, Shot};

/// Entry points of the controller contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerCall {
    NewMatch,
    NewRound,
    PlaceShips,
    MakeShot,
    OpponentShot,
    ShotHit,
    ShotMiss,
    OpponentEliminated,
    RoundWon,
    RoundLost,
    MatchOver,
}

impl fmt::Display for ControllerCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerCall::NewMatch => "new_match",
            ControllerCall::NewRound => "new_round",
            ControllerCall::PlaceShips => "place_ships",
            ControllerCall::MakeShot => "make_shot",
            ControllerCall::OpponentShot => "opponent_shot",
            ControllerCall::ShotHit => "shot_hit",
            ControllerCall::ShotMiss => "shot_miss",
            ControllerCall::OpponentEliminated => "opponent_eliminated",
            ControllerCall::RoundWon => "round_won",
            ControllerCall::RoundLost => "round_lost",
            ControllerCall::MatchOver => "match_over",
        };
        f.write_str(name)
    }
}

/// Why a controller call did not produce a value.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerError {
    /// The call ran past the time limit.
    #[error("{call} took {elapsed:?}, limit is {limit:?}")]
    Timeout {
        call: ControllerCall,
        elapsed: Duration,
        limit: Duration,
    },
    /// An earlier abandoned call is still running, or the controller was lost.
    #[error("{call} not attempted: controller is unresponsive")]
    Unresponsive { call: ControllerCall },
    /// The controller returned an error or panicked.
    #[error("{call} failed: {message}")]
    Fault {
        call: ControllerCall,
        message: String,
    },
}

impl ControllerError {
    /// The call that failed.
    pub fn call(&self) -> ControllerCall {
        match self {
            ControllerError::Timeout { call, .. }
            | ControllerError::Unresponsive { call }
            | ControllerError::Fault { call, .. } => *call,
        }
    }
}

/// A value returned by a controller together with how long the call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

type CallResult<T> = (Duration, std::thread::Result<anyhow::Result<T>>);

/// Controller plus its identity and per-call time limit.
pub struct TimedController {
    id: PlayerId,
    info: ControllerInfo,
    time_limit: Duration,
    idle: Option<Box<dyn Controller>>,
    running: Option<JoinHandle<Box<dyn Controller>>>,
}

impl TimedController {
    pub fn new(
        id: PlayerId,
        info: ControllerInfo,
        controller: Box<dyn Controller>,
        time_limit: Duration,
    ) -> Self {
        Self {
            id,
            info,
            time_limit,
            idle: Some(controller),
            running: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn info(&self) -> &ControllerInfo {
        &self.info
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// An abandoned call still holds the controller.
    pub fn is_busy(&self) -> bool {
        self.idle.is_none()
    }

    /// Run `f` against the controller under the time limit.
    pub async fn call<T, F>(&mut self, call: ControllerCall, f: F) -> Result<Timed<T>, ControllerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn Controller) -> anyhow::Result<T> + Send + 'static,
    {
        let Some(mut controller) = self.reclaim().await else {
            return Err(ControllerError::Unresponsive { call });
        };

        let (tx, rx) = oneshot::channel::<CallResult<T>>();
        let mut worker = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let result = panic::catch_unwind(AssertUnwindSafe(|| f(controller.as_mut())));
            let _ = tx.send((started.elapsed(), result));
            controller
        });

        let limit = self.time_limit;
        let dispatched = Instant::now();
        match time::timeout(limit, rx).await {
            Ok(Ok((elapsed, result))) => {
                match (&mut worker).await {
                    Ok(controller) => self.idle = Some(controller),
                    Err(err) => warn!("{} lost its controller after {}: {}", self.id, call, err),
                }
                if elapsed > limit {
                    return Err(ControllerError::Timeout {
                        call,
                        elapsed,
                        limit,
                    });
                }
                match result {
                    Ok(Ok(value)) => Ok(Timed { value, elapsed }),
                    Ok(Err(err)) => Err(ControllerError::Fault {
                        call,
                        message: format!("{err:#}"),
                    }),
                    Err(payload) => Err(ControllerError::Fault {
                        call,
                        message: format!("panicked: {}", panic_message(&*payload)),
                    }),
                }
            }
            Ok(Err(_)) => {
                // The worker died before reporting; keep its handle so the
                // controller can be reclaimed if it is still there.
                self.running = Some(worker);
                Err(ControllerError::Fault {
                    call,
                    message: "worker stopped without a result".to_string(),
                })
            }
            Err(_) => {
                self.running = Some(worker);
                Err(ControllerError::Timeout {
                    call,
                    elapsed: dispatched.elapsed(),
                    limit,
                })
            }
        }
    }

    /// Take the controller back from the last worker if it has finished.
    async fn reclaim(&mut self) -> Option<Box<dyn Controller>> {
        if let Some(controller) = self.idle.take() {
            return Some(controller);
        }
        let worker = self.running.take()?;
        if !worker.is_finished() {
            self.running = Some(worker);
            return None;
        }
        match worker.await {
            Ok(controller) => {
                debug!("{} reclaimed after an abandoned call", self.id);
                Some(controller)
            }
            Err(err) => {
                warn!("{} controller is gone: {}", self.id, err);
                None
            }
        }
    }

    pub async fn new_match(&mut self, info: MatchInfo) -> Result<Timed<()>, ControllerError> {
        self.call(ControllerCall::NewMatch, move |c| c.new_match(&info))
            .await
    }

    pub async fn new_round(&mut self) -> Result<Timed<()>, ControllerError> {
        self.call(ControllerCall::NewRound, |c| c.new_round()).await
    }

    pub async fn place_ships(&mut self, ships: Vec<Ship>) -> Result<Timed<Vec<Ship>>, ControllerError> {
        self.call(ControllerCall::PlaceShips, move |c| c.place_ships(ships))
            .await
    }

    pub async fn make_shot(&mut self) -> Result<Timed<Shot>, ControllerError> {
        self.call(ControllerCall::MakeShot, |c| c.make_shot()).await
    }

    pub async fn opponent_shot(&mut self, shot: Shot) -> Result<Timed<()>, ControllerError> {
        self.call(ControllerCall::OpponentShot, move |c| c.opponent_shot(shot))
            .await
    }

    pub async fn shot_hit(&mut self, shot: Shot, sunk: bool) -> Result<Timed<()>, ControllerError> {
        self.call(ControllerCall::ShotHit, move |c| c.shot_hit(shot, sunk))
            .await
    }

    pub async fn shot_miss(&mut self, shot: Shot) -> Result<Timed<()>, ControllerError> {
        self.call(ControllerCall::ShotMiss, move |c| c.shot_miss(shot))
            .await
    }

    pub async fn opponent_eliminated(&mut self, player: PlayerId) -> Result<Timed<()>, ControllerError> {
        self.call(ControllerCall::OpponentEliminated, move |c| {
            c.opponent_eliminated(player)
        })
        .await
    }

    pub async fn round_won(&mut self) -> Result<Timed<()>, ControllerError> {
        self.call(ControllerCall::RoundWon, |c| c.round_won()).await
    }

    pub async fn round_lost(&mut self) -> Result<Timed<()>, ControllerError> {
        self.call(ControllerCall::RoundLost, |c| c.round_lost()).await
    }

    pub async fn match_over(&mut self) -> Result<Timed<()>, ControllerError> {
        self.call(ControllerCall::MatchOver, |c| c.match_over()).await
    }
}

impl fmt::Debug for TimedController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedController")
            .field("id", &self.id)
            .field("info", &self.info)
            .field("time_limit", &self.time_limit)
            .field("busy", &self.is_busy())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
