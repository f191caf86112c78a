use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use caseflow_store::{Store, WorkflowSummary, WorkflowUpdate};
use caseflow_workflow::{Workflow, validate};

use crate::error::ApiError;
use crate::payload::{
  BindServiceRequest, CreateWorkflowRequest, DuplicateRequest, ListParams, UpdateWorkflowRequest,
  ValidateResponse,
};
use crate::AppState;

pub async fn list_workflows(
  State(state): State<AppState>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<WorkflowSummary>>, ApiError> {
  let workflows = state.store.list_workflows(params.active_only).await?;
  Ok(Json(workflows))
}

pub async fn create_workflow(
  State(state): State<AppState>,
  Json(body): Json<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
  let workflow = state
    .store
    .create_workflow(&body.name, &body.description)
    .await?;
  Ok((StatusCode::CREATED, Json(workflow)))
}

pub async fn get_workflow(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
) -> Result<Json<Workflow>, ApiError> {
  let workflow = state.store.get_workflow(&workflow_id).await?;
  Ok(Json(workflow))
}

pub async fn update_workflow(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
  Json(body): Json<UpdateWorkflowRequest>,
) -> Result<Json<Workflow>, ApiError> {
  let update = WorkflowUpdate {
    name: body.name,
    description: body.description,
    is_active: body.is_active,
    expected_version: body.version,
  };
  let workflow = state.store.update_workflow(&workflow_id, &update).await?;
  Ok(Json(workflow))
}

pub async fn delete_workflow(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
) -> Result<StatusCode, ApiError> {
  state.store.delete_workflow(&workflow_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

pub async fn duplicate_workflow(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
  Json(body): Json<DuplicateRequest>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
  let copy = state
    .store
    .duplicate_workflow(&workflow_id, &body.name)
    .await?;
  Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn set_default_workflow(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
) -> Result<StatusCode, ApiError> {
  state.store.set_default(&workflow_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// Validation runs locally over the stored aggregate; nothing round-trips
/// through another service.
pub async fn validate_workflow(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
) -> Result<Json<ValidateResponse>, ApiError> {
  let workflow = state.store.get_workflow(&workflow_id).await?;
  let report = validate(&workflow.steps, &workflow.transitions);

  Ok(Json(ValidateResponse {
    is_valid: report.is_valid(),
    errors: report.messages(),
    issues: report.issues,
  }))
}

pub async fn bind_service(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
  Json(body): Json<BindServiceRequest>,
) -> Result<StatusCode, ApiError> {
  state
    .store
    .bind_service(&workflow_id, &body.service_id)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}

pub async fn release_service(
  State(state): State<AppState>,
  Path(service_id): Path<String>,
) -> Result<StatusCode, ApiError> {
  state.store.release_service(&service_id).await?;
  Ok(StatusCode::NO_CONTENT)
}
