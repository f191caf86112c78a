use caseflow_workflow::{Role, Step, StepColor, StepType, Transition};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

/// A workflow as listed, without its steps and transitions expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkflowSummary {
  pub workflow_id: String,
  pub name: String,
  pub description: String,
  pub is_active: bool,
  pub is_default: bool,
  pub version: i64,
  pub step_count: i64,
  pub transition_count: i64,
  pub service_count: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Fields of a workflow document write. `expected_version` must match the
/// stored version or the write is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowUpdate {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub is_active: bool,
  pub expected_version: i64,
}

/// One entry of a batch position write. Cosmetic only; does not bump the
/// workflow version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
  pub step_id: String,
  pub x: f64,
  pub y: f64,
}

#[derive(Debug, FromRow)]
pub(crate) struct StepRow {
  pub step_id: String,
  pub name: String,
  pub display_name: String,
  pub description: Option<String>,
  pub step_type: Json<StepType>,
  pub color: Json<StepColor>,
  pub allowed_roles: Json<Vec<Role>>,
  pub required_fields: Json<Vec<String>>,
  pub auto_assign: bool,
  pub notify_roles: Json<Vec<Role>>,
  pub notify_client: bool,
  pub position_x: f64,
  pub position_y: f64,
}

impl From<StepRow> for Step {
  fn from(row: StepRow) -> Self {
    Step {
      step_id: row.step_id,
      name: row.name,
      display_name: row.display_name,
      description: row.description,
      step_type: row.step_type.0,
      color: row.color.0,
      allowed_roles: row.allowed_roles.0,
      required_fields: row.required_fields.0,
      auto_assign: row.auto_assign,
      notify_roles: row.notify_roles.0,
      notify_client: row.notify_client,
      position_x: row.position_x,
      position_y: row.position_y,
    }
  }
}

#[derive(Debug, FromRow)]
pub(crate) struct TransitionRow {
  pub transition_id: String,
  pub from_step_id: String,
  pub to_step_id: String,
  pub name: String,
  pub description: Option<String>,
  pub requires_invoice_raised: bool,
  pub requires_invoice_paid: bool,
  pub requires_assignment: bool,
  pub allowed_roles: Json<Vec<Role>>,
  pub send_notification: bool,
  pub notification_template: Option<String>,
}

impl From<TransitionRow> for Transition {
  fn from(row: TransitionRow) -> Self {
    Transition {
      transition_id: row.transition_id,
      from_step_id: row.from_step_id,
      to_step_id: row.to_step_id,
      name: row.name,
      description: row.description,
      requires_invoice_raised: row.requires_invoice_raised,
      requires_invoice_paid: row.requires_invoice_paid,
      requires_assignment: row.requires_assignment,
      allowed_roles: row.allowed_roles.0,
      send_notification: row.send_notification,
      notification_template: row.notification_template,
    }
  }
}

#[derive(Debug, FromRow)]
pub(crate) struct WorkflowRow {
  pub workflow_id: String,
  pub name: String,
  pub description: String,
  pub is_active: bool,
  pub is_default: bool,
  pub version: i64,
}
