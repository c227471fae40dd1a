//! Integration tests for Engine dispatch loop.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use facefind_engine::{Engine, EventLike, MemoryEventSink, Reducer, Router, Transition};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Test event type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum TestEvent {
    Start { label: String },
    Middle { label: String },
    End { label: String },
}

impl EventLike for TestEvent {
    fn event_type_str(&self) -> String {
        match self {
            TestEvent::Start { .. } => "test:start".into(),
            TestEvent::Middle { .. } => "test:middle".into(),
            TestEvent::End { .. } => "test:end".into(),
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("TestEvent serialization should never fail")
    }
}

// ---------------------------------------------------------------------------
// Test state and intents
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
struct TestState {
    events_seen: Vec<String>,
    start_count: u32,
    middle_count: u32,
    end_count: u32,
}

#[derive(Debug)]
enum TestIntent {
    Advance { label: String },
    Finish { label: String },
    FanOut,
}

// ---------------------------------------------------------------------------
// Test reducer: Start asks to Advance, Middle asks to Finish
// ---------------------------------------------------------------------------

struct ChainingReducer;

impl Reducer<TestEvent, TestState> for ChainingReducer {
    type Intent = TestIntent;

    fn reduce(&self, state: &TestState, event: &TestEvent) -> Transition<TestState, TestIntent> {
        let mut next = state.clone();
        match event {
            TestEvent::Start { label } => {
                next.events_seen.push(label.clone());
                next.start_count += 1;
                Transition::to(next).with(TestIntent::Advance {
                    label: label.clone(),
                })
            }
            TestEvent::Middle { label } => {
                next.events_seen.push(label.clone());
                next.middle_count += 1;
                Transition::to(next).with(TestIntent::Finish {
                    label: label.clone(),
                })
            }
            TestEvent::End { label } => {
                next.events_seen.push(label.clone());
                next.end_count += 1;
                Transition::to(next)
            }
        }
    }
}

/// Start fans out three intents' worth of End events.
struct FanOutReducer;

impl Reducer<TestEvent, TestState> for FanOutReducer {
    type Intent = TestIntent;

    fn reduce(&self, state: &TestState, event: &TestEvent) -> Transition<TestState, TestIntent> {
        let mut next = state.clone();
        match event {
            TestEvent::Start { label } => {
                next.events_seen.push(label.clone());
                next.start_count += 1;
                Transition::to(next).with(TestIntent::FanOut)
            }
            TestEvent::End { label } => {
                next.events_seen.push(label.clone());
                next.end_count += 1;
                Transition::to(next)
            }
            TestEvent::Middle { .. } => Transition::unchanged(state),
        }
    }
}

// ---------------------------------------------------------------------------
// Test router
// ---------------------------------------------------------------------------

struct TestRouter;

#[async_trait]
impl Router<TestEvent, TestState, TestIntent, ()> for TestRouter {
    async fn route(
        &self,
        intent: TestIntent,
        _state: &TestState,
        _deps: &(),
    ) -> Result<Vec<TestEvent>> {
        match intent {
            TestIntent::Advance { label } => Ok(vec![TestEvent::Middle {
                label: format!("{label}→middle"),
            }]),
            TestIntent::Finish { label } => Ok(vec![TestEvent::End {
                label: format!("{label}→end"),
            }]),
            TestIntent::FanOut => Ok(vec![
                TestEvent::End {
                    label: "child-1".into(),
                },
                TestEvent::End {
                    label: "child-2".into(),
                },
                TestEvent::End {
                    label: "child-3".into(),
                },
            ]),
        }
    }
}

/// Router whose effects fail.
struct FailingRouter;

#[async_trait]
impl Router<TestEvent, TestState, TestIntent, ()> for FailingRouter {
    async fn route(
        &self,
        _intent: TestIntent,
        _state: &TestState,
        _deps: &(),
    ) -> Result<Vec<TestEvent>> {
        anyhow::bail!("effect failed")
    }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn single_event_records_and_reduces_state() {
    let sink = Arc::new(MemoryEventSink::new());
    let engine = Engine::new(FanOutReducer, TestRouter, sink.clone());

    let mut state = TestState::default();
    engine
        .dispatch(
            TestEvent::End {
                label: "hello".into(),
            },
            &mut state,
            &(),
        )
        .await
        .unwrap();

    assert_eq!(state.end_count, 1);
    assert_eq!(state.events_seen, vec!["hello"]);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "test:end");
    assert_eq!(events[0].caused_by_seq, None);
    assert_eq!(events[0].payload["label"], "hello");
}

#[tokio::test]
async fn chained_events_form_causal_tree() {
    let sink = Arc::new(MemoryEventSink::new());
    let engine = Engine::new(ChainingReducer, TestRouter, sink.clone());

    let mut state = TestState::default();
    engine
        .dispatch(
            TestEvent::Start {
                label: "root".into(),
            },
            &mut state,
            &(),
        )
        .await
        .unwrap();

    // Reducer saw all 3 events in order
    assert_eq!(state.start_count, 1);
    assert_eq!(state.middle_count, 1);
    assert_eq!(state.end_count, 1);
    assert_eq!(
        state.events_seen,
        vec!["root", "root→middle", "root→middle→end"]
    );

    let events = sink.events();
    assert_eq!(
        sink.event_types(),
        vec!["test:start", "test:middle", "test:end"]
    );
    assert_eq!(events[1].caused_by_seq, Some(events[0].seq));
    assert_eq!(events[2].caused_by_seq, Some(events[1].seq));
}

#[tokio::test]
async fn fan_out_children_share_one_parent() {
    let sink = Arc::new(MemoryEventSink::new());
    let engine = Engine::new(FanOutReducer, TestRouter, sink.clone());

    let mut state = TestState::default();
    engine
        .dispatch(
            TestEvent::Start {
                label: "root".into(),
            },
            &mut state,
            &(),
        )
        .await
        .unwrap();

    assert_eq!(state.end_count, 3);
    assert_eq!(
        state.events_seen,
        vec!["root", "child-1", "child-2", "child-3"]
    );

    let events = sink.events();
    let root_seq = events[0].seq;
    assert!(events[1..]
        .iter()
        .all(|e| e.caused_by_seq == Some(root_seq)));
}

#[tokio::test]
async fn router_errors_propagate_after_state_is_reduced() {
    let sink = Arc::new(MemoryEventSink::new());
    let engine = Engine::new(ChainingReducer, FailingRouter, sink.clone());

    let mut state = TestState::default();
    let err = engine
        .dispatch(
            TestEvent::Start {
                label: "root".into(),
            },
            &mut state,
            &(),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "effect failed");
    assert_eq!(state.start_count, 1);
    assert_eq!(sink.event_types(), vec!["test:start"]);
}

#[tokio::test]
async fn sequence_numbers_increase_across_dispatches() {
    let sink = Arc::new(MemoryEventSink::new());
    let engine = Engine::new(FanOutReducer, TestRouter, sink.clone());

    let mut state = TestState::default();
    for label in ["a", "b"] {
        engine
            .dispatch(TestEvent::End { label: label.into() }, &mut state, &())
            .await
            .unwrap();
    }

    let seqs: Vec<i64> = sink.events().iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![1, 2]);
}
