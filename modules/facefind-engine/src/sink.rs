//! EventSink implementations.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::traits::EventSink;

/// One journalled event.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedEvent {
    pub seq: i64,
    pub ts: DateTime<Utc>,
    pub event_type: String,
    pub caused_by_seq: Option<i64>,
    pub payload: serde_json::Value,
}

struct Sequencer(AtomicI64);

impl Sequencer {
    fn new() -> Self {
        Self(AtomicI64::new(1))
    }

    fn stamp(
        &self,
        event_type: String,
        payload: serde_json::Value,
        caused_by_seq: Option<i64>,
    ) -> RecordedEvent {
        RecordedEvent {
            seq: self.0.fetch_add(1, Ordering::SeqCst),
            ts: Utc::now(),
            event_type,
            caused_by_seq,
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// TracingSink (production: log only, nothing kept)
// ---------------------------------------------------------------------------

pub struct TracingSink {
    sequencer: Sequencer,
}

impl TracingSink {
    pub fn new() -> Self {
        Self {
            sequencer: Sequencer::new(),
        }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for TracingSink {
    async fn record(
        &self,
        event_type: String,
        payload: serde_json::Value,
        caused_by_seq: Option<i64>,
    ) -> Result<RecordedEvent> {
        let recorded = self.sequencer.stamp(event_type, payload, caused_by_seq);
        tracing::debug!(
            seq = recorded.seq,
            caused_by_seq = ?recorded.caused_by_seq,
            event_type = %recorded.event_type,
            "Workflow event"
        );
        Ok(recorded)
    }
}

// ---------------------------------------------------------------------------
// MemoryEventSink (tests)
// ---------------------------------------------------------------------------

/// In-memory event sink for testing. Keeps every recorded event with
/// incrementing sequence numbers. Thread-safe.
pub struct MemoryEventSink {
    sequencer: Sequencer,
    events: Mutex<Vec<RecordedEvent>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self {
            sequencer: Sequencer::new(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Read all recorded events (for test assertions).
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Event type strings in dispatch order.
    pub fn event_types(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.event_type).collect()
    }
}

impl Default for MemoryEventSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn record(
        &self,
        event_type: String,
        payload: serde_json::Value,
        caused_by_seq: Option<i64>,
    ) -> Result<RecordedEvent> {
        let recorded = self.sequencer.stamp(event_type, payload, caused_by_seq);
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded.clone());
        Ok(recorded)
    }
}

// ---------------------------------------------------------------------------
// Arc<P> blanket so tests can share the sink for assertions
// ---------------------------------------------------------------------------

#[async_trait]
impl<P: EventSink + ?Sized> EventSink for Arc<P> {
    async fn record(
        &self,
        event_type: String,
        payload: serde_json::Value,
        caused_by_seq: Option<i64>,
    ) -> Result<RecordedEvent> {
        (**self).record(event_type, payload, caused_by_seq).await
    }
}
