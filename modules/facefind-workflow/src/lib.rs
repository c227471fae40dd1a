//! The capture-and-recognition workflow.
//!
//! `WorkflowController` owns a single `WorkflowRecord` and drives it through
//! the dispatch engine: user actions and background completions become
//! `WorkflowEvent`s, `WorkflowReducer` turns each into the next record plus
//! `WorkflowIntent`s, and `EffectRouter` carries those out against the camera
//! and the recognition service. `present` maps a record to what the user sees.

pub mod controller;
pub mod events;
pub mod presenter;
pub mod reducer;
pub mod router;
pub mod state;

pub use controller::WorkflowController;
pub use events::{DismissVia, WorkflowEvent, WorkflowIntent};
pub use presenter::{present, PhotoOverlay, PhotoTile, ResultsView, Screen, View};
pub use reducer::WorkflowReducer;
pub use router::{EffectRouter, WorkflowDeps};
pub use state::{WorkflowRecord, WorkflowState, CAMERA_DENIED_NOTICE, CAPTURE_FAILED_NOTICE};
