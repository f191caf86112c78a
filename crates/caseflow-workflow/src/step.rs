use serde::{Deserialize, Serialize};

use crate::enums::{Role, StepColor, StepType};

/// A persisted step (node) in a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
  pub step_id: String,
  /// Internal key, lowercase with underscores, unique within the workflow.
  pub name: String,
  pub display_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub step_type: StepType,
  #[serde(default)]
  pub color: StepColor,
  /// Roles permitted to act on this step.
  #[serde(default)]
  pub allowed_roles: Vec<Role>,
  /// Field keys that must be populated before leaving this step.
  #[serde(default)]
  pub required_fields: Vec<String>,
  /// Entering this step assigns the service to the least-loaded accountant.
  #[serde(default)]
  pub auto_assign: bool,
  /// Roles notified when a service enters this step.
  #[serde(default)]
  pub notify_roles: Vec<Role>,
  /// Notify the external client on entry.
  #[serde(default)]
  pub notify_client: bool,
  #[serde(default)]
  pub position_x: f64,
  #[serde(default)]
  pub position_y: f64,
}

impl Step {
  /// Build a persisted step from an id and its field set.
  pub fn from_spec(step_id: String, spec: StepSpec) -> Self {
    Self {
      step_id,
      name: normalize_step_name(&spec.name),
      display_name: spec.display_name,
      description: spec.description,
      step_type: spec.step_type,
      color: spec.color,
      allowed_roles: spec.allowed_roles,
      required_fields: spec.required_fields,
      auto_assign: spec.auto_assign,
      notify_roles: spec.notify_roles,
      notify_client: spec.notify_client,
      position_x: spec.position_x,
      position_y: spec.position_y,
    }
  }
}

/// The full field set of a step, without an id. Used when creating or
/// updating a step; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
  pub name: String,
  pub display_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub step_type: StepType,
  #[serde(default)]
  pub color: StepColor,
  #[serde(default)]
  pub allowed_roles: Vec<Role>,
  #[serde(default)]
  pub required_fields: Vec<String>,
  #[serde(default)]
  pub auto_assign: bool,
  #[serde(default)]
  pub notify_roles: Vec<Role>,
  #[serde(default)]
  pub notify_client: bool,
  #[serde(default)]
  pub position_x: f64,
  #[serde(default)]
  pub position_y: f64,
}

/// Normalize a step name to its internal key form: lowercase, with runs of
/// spaces and other non-alphanumeric characters collapsed to single
/// underscores.
pub fn normalize_step_name(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  let mut last_underscore = true;

  for c in input.trim().chars() {
    if c.is_alphanumeric() {
      out.extend(c.to_lowercase());
      last_underscore = false;
    } else if !last_underscore {
      out.push('_');
      last_underscore = true;
    }
  }

  while out.ends_with('_') {
    out.pop();
  }

  out
}
