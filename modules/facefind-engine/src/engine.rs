//! The dispatch loop.

use std::collections::VecDeque;
use std::marker::PhantomData;

use anyhow::Result;

use crate::traits::{EventLike, EventSink, Reducer, Router};

/// Generic event dispatch engine.
///
/// Record → reduce → route → recurse until settled.
/// Causal chaining is automatic: child events reference their trigger's seq.
pub struct Engine<E, S, D, Red, Rout, P>
where
    E: EventLike,
    S: Send + Sync,
    D: Send + Sync,
    Red: Reducer<E, S>,
    Rout: Router<E, S, Red::Intent, D>,
    P: EventSink,
{
    reducer: Red,
    router: Rout,
    sink: P,
    _phantom: PhantomData<fn() -> (E, S, D)>,
}

impl<E, S, D, Red, Rout, P> Engine<E, S, D, Red, Rout, P>
where
    E: EventLike,
    S: Send + Sync,
    D: Send + Sync,
    Red: Reducer<E, S>,
    Rout: Router<E, S, Red::Intent, D>,
    P: EventSink,
{
    pub fn new(reducer: Red, router: Rout, sink: P) -> Self {
        Self {
            reducer,
            router,
            sink,
            _phantom: PhantomData,
        }
    }

    /// Dispatch an event. Records it, replaces the state with the reduced
    /// one, routes each intent, and processes any emitted child events until
    /// the queue is empty.
    pub async fn dispatch(&self, event: E, state: &mut S, deps: &D) -> Result<()> {
        let mut queue: VecDeque<(E, Option<i64>)> = VecDeque::new();
        queue.push_back((event, None));

        while let Some((evt, parent_seq)) = queue.pop_front() {
            // 1. Record with causal chain
            let recorded = self
                .sink
                .record(evt.event_type_str(), evt.to_payload(), parent_seq)
                .await?;

            // 2. Reduce (pure transition)
            let transition = self.reducer.reduce(state, &evt);
            *state = transition.state;

            // 3. Route each intent in order (may do I/O, may emit new events)
            for intent in transition.intents {
                let children = self.router.route(intent, &*state, deps).await?;

                // 4. Enqueue children (chained off this event)
                for child in children {
                    queue.push_back((child, Some(recorded.seq)));
                }
            }
        }

        Ok(())
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }
}
