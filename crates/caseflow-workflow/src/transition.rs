use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// A persisted transition (directed edge) between two steps of a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
  pub transition_id: String,
  pub from_step_id: String,
  pub to_step_id: String,
  /// Label shown on the connecting edge / action button.
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default)]
  pub requires_invoice_raised: bool,
  #[serde(default)]
  pub requires_invoice_paid: bool,
  #[serde(default)]
  pub requires_assignment: bool,
  /// Roles permitted to trigger this transition. Empty means unrestricted.
  #[serde(default)]
  pub allowed_roles: Vec<Role>,
  #[serde(default)]
  pub send_notification: bool,
  /// Override text for the notification. None means the system default.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notification_template: Option<String>,
}

impl Transition {
  /// Build a persisted transition from an id and its field set.
  pub fn from_spec(transition_id: String, spec: TransitionSpec) -> Self {
    Self {
      transition_id,
      from_step_id: spec.from_step_id,
      to_step_id: spec.to_step_id,
      name: spec.name,
      description: spec.description,
      requires_invoice_raised: spec.requires_invoice_raised,
      requires_invoice_paid: spec.requires_invoice_paid,
      requires_assignment: spec.requires_assignment,
      allowed_roles: spec.allowed_roles,
      send_notification: spec.send_notification,
      notification_template: spec.notification_template,
    }
  }

  /// Whether any business precondition is set on this transition. The
  /// canvas shows a marker glyph on edges where this holds.
  pub fn has_conditions(&self) -> bool {
    self.requires_invoice_raised || self.requires_invoice_paid || self.requires_assignment
  }

  /// Whether the transition connects a step to itself.
  pub fn is_self_loop(&self) -> bool {
    self.from_step_id == self.to_step_id
  }
}

/// The full field set of a transition, without an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSpec {
  pub from_step_id: String,
  pub to_step_id: String,
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default)]
  pub requires_invoice_raised: bool,
  #[serde(default)]
  pub requires_invoice_paid: bool,
  #[serde(default)]
  pub requires_assignment: bool,
  #[serde(default)]
  pub allowed_roles: Vec<Role>,
  #[serde(default)]
  pub send_notification: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notification_template: Option<String>,
}
