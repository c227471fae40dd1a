//! Core traits for the event engine.

use anyhow::Result;
use async_trait::async_trait;

use crate::sink::RecordedEvent;

/// Events carry a type string and know how to serialize for the journal.
pub trait EventLike: Clone + Send + Sync + 'static {
    /// The event type string recorded in the journal.
    fn event_type_str(&self) -> String;

    /// Serialize this event to the JSON payload recorded in the journal.
    fn to_payload(&self) -> serde_json::Value;
}

/// Result of reducing one event: the whole next state plus the side effects
/// it asks for.
#[derive(Debug)]
pub struct Transition<S, I> {
    pub state: S,
    pub intents: Vec<I>,
}

impl<S, I> Transition<S, I> {
    /// Move to `state` with no side effects.
    pub fn to(state: S) -> Self {
        Self {
            state,
            intents: Vec::new(),
        }
    }

    pub fn with(mut self, intent: I) -> Self {
        self.intents.push(intent);
        self
    }

    pub fn with_all(mut self, intents: impl IntoIterator<Item = I>) -> Self {
        self.intents.extend(intents);
        self
    }
}

impl<S: Clone, I> Transition<S, I> {
    /// Keep the current state, do nothing.
    pub fn unchanged(state: &S) -> Self {
        Self::to(state.clone())
    }
}

/// Pure transitions. No I/O, no side effects.
///
/// Receives the current state and returns the next one. Anything the
/// transition needs done in the outside world is returned as an intent.
pub trait Reducer<E: EventLike, S>: Send + Sync {
    type Intent: Send + std::fmt::Debug;

    fn reduce(&self, state: &S, event: &E) -> Transition<S, Self::Intent>;
}

/// Performs intents. May perform I/O, emit new events.
///
/// Returns zero or more child events that re-enter the dispatch loop.
#[async_trait]
pub trait Router<E: EventLike, S: Send + Sync, I: Send, D: Send + Sync>: Send + Sync {
    async fn route(&self, intent: I, state: &S, deps: &D) -> Result<Vec<E>>;
}

/// Records events and returns a RecordedEvent with sequence numbers.
///
/// Implemented by TracingSink (logs) and MemoryEventSink (tests).
/// Also implemented for `Arc<P>` so the sink can be shared for assertions.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn record(
        &self,
        event_type: String,
        payload: serde_json::Value,
        caused_by_seq: Option<i64>,
    ) -> Result<RecordedEvent>;
}
