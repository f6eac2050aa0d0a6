//! Append-only event log with listeners, replay and persistence.

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use log::debug;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use super::accolade::{default_processors, Accolade, AccoladeProcessor};
use super::Event;

/// Receives every event right after it is appended. Listeners run on the
/// round-driving task and must return quickly; slow consumers should use
/// [`EventLog::subscribe`] instead.
pub trait EventListener: Send {
    fn on_event(&mut self, event: &Arc<Event>);
}

impl<F> EventListener for F
where
    F: FnMut(&Event) + Send,
{
    fn on_event(&mut self, event: &Arc<Event>) {
        self(event.as_ref())
    }
}

/// Forwards events to an unbounded channel. Stops silently once the
/// receiver is dropped.
struct ChannelListener(mpsc::UnboundedSender<Arc<Event>>);

impl EventListener for ChannelListener {
    fn on_event(&mut self, event: &Arc<Event>) {
        let _ = self.0.send(Arc::clone(event));
    }
}

/// Writes every event to the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl EventListener for LogListener {
    fn on_event(&mut self, event: &Arc<Event>) {
        debug!("{}", event);
    }
}

/// Errors returned when saving or loading a log.
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("event log encoding failed: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("event log io failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered, append-only record of a competition.
#[derive(Default)]
pub struct EventLog {
    events: Vec<Arc<Event>>,
    processors: Vec<Box<dyn AccoladeProcessor>>,
    listeners: Vec<Box<dyn EventListener>>,
}

impl EventLog {
    /// Empty log without accolade processors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty log running the default accolade processors.
    pub fn with_accolades() -> Self {
        Self {
            processors: default_processors(),
            ..Self::default()
        }
    }

    pub fn add_processor(&mut self, processor: Box<dyn AccoladeProcessor>) {
        self.processors.push(processor);
    }

    pub fn add_listener<L: EventListener + 'static>(&mut self, listener: L) {
        self.listeners.push(Box::new(listener));
    }

    /// Channel receiving every event appended from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Arc<Event>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.add_listener(ChannelListener(tx));
        rx
    }

    /// Tag, store and broadcast `event`. Returns its index.
    pub fn append(&mut self, mut event: Event) -> usize {
        let mut tags: Vec<Accolade> = Vec::new();
        for processor in &mut self.processors {
            processor.process(&event, &mut tags);
        }
        event.accolades.extend(tags);

        let event = Arc::new(event);
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
        self.events.push(event);
        self.events.len() - 1
    }

    /// Event at `idx`. Returns the same shared event on every call.
    pub fn get(&self, idx: usize) -> Option<&Arc<Event>> {
        self.events.get(idx)
    }

    pub fn last(&self) -> Option<&Arc<Event>> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Event>> {
        self.events.iter()
    }

    /// Events of one round, in order.
    pub fn round(&self, round: u32) -> impl Iterator<Item = &Arc<Event>> {
        self.events.iter().filter(move |e| e.round == round)
    }

    /// Cursor over the log starting at the first event.
    pub fn replay(&self) -> Replay<'_> {
        Replay {
            log: self,
            cursor: 0,
        }
    }

    /// Encode every event with bincode. Processors and listeners are not
    /// saved.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), EventLogError> {
        let events: Vec<&Event> = self.events.iter().map(Arc::as_ref).collect();
        bincode::serialize_into(writer, &events)?;
        Ok(())
    }

    /// Load a log written by [`EventLog::write_to`].
    pub fn read_from<R: Read>(reader: R) -> Result<Self, EventLogError> {
        let events: Vec<Event> = bincode::deserialize_from(reader)?;
        Ok(Self {
            events: events.into_iter().map(Arc::new).collect(),
            ..Self::default()
        })
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.events.len())
            .field("processors", &self.processors.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// How [`Replay::play`] paces events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pacing {
    /// Return the next event at once.
    Immediate,
    /// Wait for the event's recorded elapsed time divided by `speed`.
    Recorded { speed: f64 },
}

/// Sequential read cursor over an [`EventLog`].
#[derive(Debug, Clone)]
pub struct Replay<'a> {
    log: &'a EventLog,
    cursor: usize,
}

impl<'a> Replay<'a> {
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.log.len()
    }

    /// Move the cursor, clamped to the end of the log.
    pub fn seek(&mut self, idx: usize) {
        self.cursor = idx.min(self.log.len());
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Advance by one event, optionally waiting as long as it originally took.
    pub async fn play(&mut self, pacing: Pacing) -> Option<&'a Arc<Event>> {
        let event = self.log.get(self.cursor)?;
        if let Pacing::Recorded { speed } = pacing {
            if speed.is_finite() && speed > 0.0 && !event.elapsed.is_zero() {
                // A pause too long for a Duration is skipped.
                match Duration::try_from_secs_f64(event.elapsed.as_secs_f64() / speed) {
                    Ok(pause) => sleep(pause).await,
                    Err(err) => debug!("not pacing event {}: {}", self.cursor, err),
                }
            }
        }
        self.cursor += 1;
        Some(event)
    }
}

impl<'a> Iterator for Replay<'a> {
    type Item = &'a Arc<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let event = self.log.get(self.cursor)?;
        self.cursor += 1;
        Some(event)
    }
}
