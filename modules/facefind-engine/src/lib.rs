//! Event dispatch engine.
//!
//! Provides a generic event loop: record → reduce → route → recurse until
//! settled. Events form causal chains through the sequence numbers handed out
//! by the `EventSink`.
//!
//! Consumers define their domain by implementing `Reducer` (pure transitions
//! that name side effects as intents) and `Router` (performs intents and may
//! emit new events).

pub mod engine;
pub mod sink;
pub mod traits;

pub use engine::Engine;
pub use sink::{MemoryEventSink, RecordedEvent, TracingSink};
pub use traits::{EventLike, EventSink, Reducer, Router, Transition};
