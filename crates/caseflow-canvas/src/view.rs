use caseflow_workflow::{StepColor, StepType};
use serde::{Deserialize, Serialize};

/// Default label for a transition created by drag-connect.
pub const NEW_TRANSITION_NAME: &str = "New Transition";

/// What is currently focused on the canvas. Step and transition focus are
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
  Step(String),
  Transition(String),
}

/// A step projected for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
  pub step_id: String,
  pub display_name: String,
  pub step_type: StepType,
  pub color: StepColor,
  pub position_x: f64,
  pub position_y: f64,
  /// False for END steps: they never offer an outgoing connector.
  pub has_source_handle: bool,
  /// False for START steps: they never offer an incoming connector.
  pub has_target_handle: bool,
  pub is_selected: bool,
  /// The running service's current step, highlighted in read-only mode.
  pub is_live: bool,
}

/// A transition projected for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
  pub transition_id: String,
  pub from_step_id: String,
  pub to_step_id: String,
  pub label: String,
  /// Marker glyph: some business precondition is set on this transition.
  pub has_conditions: bool,
  pub is_selected: bool,
}

/// A step in create mode: a palette item dropped onto empty canvas space.
/// Carries no id; the configuration panel fills in the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStub {
  pub step_type: StepType,
  pub position_x: f64,
  pub position_y: f64,
  pub is_new: bool,
}

/// A transition in create mode, produced by drag-connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionStub {
  pub from_step_id: String,
  pub to_step_id: String,
  pub name: String,
}
