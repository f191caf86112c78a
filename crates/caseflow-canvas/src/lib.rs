//! Caseflow Canvas
//!
//! Headless editor state for the workflow canvas: the bidirectional
//! projection between a [`caseflow_workflow::Workflow`] aggregate and an
//! interactive node/edge diagram.
//!
//! The crate renders nothing. [`EditorSession`] tracks selection,
//! optimistic step positions, and read-only mode; edits come back out as
//! stubs ([`StepStub`], [`TransitionStub`]) and queued position writes for
//! the caller to persist. The [`PositionQueue`] replaces fire-and-forget
//! position sync with pending writes, retries, and an unsaved-changes
//! indicator.

mod actions;
mod error;
mod panel;
mod queue;
mod session;
mod view;

pub use actions::{ActionBlocked, LifecycleAction, check_action, duplicate_name};
pub use error::CanvasError;
pub use panel::{StepForm, TransitionForm, Write};
pub use queue::{PositionQueue, PositionWrite};
pub use session::EditorSession;
pub use view::{EdgeView, NEW_TRANSITION_NAME, NodeView, Selection, StepStub, TransitionStub};
