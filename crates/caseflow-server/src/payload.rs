use caseflow_workflow::Issue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkflowRequest {
  pub name: String,
  #[serde(default)]
  pub description: String,
}

/// Document write. `version` is the version the caller last read; a
/// mismatch is answered with 409.
#[derive(Debug, Deserialize)]
pub struct UpdateWorkflowRequest {
  pub name: String,
  #[serde(default)]
  pub description: String,
  pub is_active: bool,
  pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateRequest {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BindServiceRequest {
  pub service_id: String,
}

/// Validation verdict. `errors` carries the rendered strings the original
/// client contract expects; `issues` the typed form.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
  pub is_valid: bool,
  pub errors: Vec<String>,
  pub issues: Vec<Issue>,
}
