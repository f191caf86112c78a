use serde::{Deserialize, Serialize};

/// Semantic role of a step within a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
  /// Entry point. Has no incoming transitions by convention.
  Start,
  /// Any in-progress step.
  Normal,
  /// A step awaiting external (client) input.
  Query,
  /// Terminal. Has no outgoing transitions by convention.
  End,
}

impl StepType {
  /// Whether the canvas exposes an outgoing (source) connector.
  pub fn has_source_handle(self) -> bool {
    !matches!(self, StepType::End)
  }

  /// Whether the canvas exposes an incoming (target) connector.
  pub fn has_target_handle(self) -> bool {
    !matches!(self, StepType::Start)
  }
}

/// Presentation color for a step node. No semantic constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepColor {
  Gray,
  Blue,
  Green,
  Yellow,
  Orange,
  Red,
  Purple,
  Indigo,
  Pink,
}

impl Default for StepColor {
  fn default() -> Self {
    StepColor::Gray
  }
}

/// Role identifiers used for step access and transition gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  SuperAdmin,
  Admin,
  SeniorAccountant,
  Accountant,
  User,
}
