use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use caseflow_store::{PositionUpdate, Store};
use caseflow_workflow::{Step, StepSpec};

use crate::AppState;
use crate::error::ApiError;

pub async fn create_step(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
  Json(spec): Json<StepSpec>,
) -> Result<(StatusCode, Json<Step>), ApiError> {
  let step = state.store.insert_step(&workflow_id, spec).await?;
  Ok((StatusCode::CREATED, Json(step)))
}

pub async fn update_step(
  State(state): State<AppState>,
  Path((workflow_id, step_id)): Path<(String, String)>,
  Json(spec): Json<StepSpec>,
) -> Result<Json<Step>, ApiError> {
  let step = state.store.update_step(&workflow_id, &step_id, spec).await?;
  Ok(Json(step))
}

pub async fn delete_step(
  State(state): State<AppState>,
  Path((workflow_id, step_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
  state.store.delete_step(&workflow_id, &step_id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// Batch position write from the canvas save-queue. Cosmetic; never bumps
/// the workflow version.
pub async fn update_step_positions(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
  Json(updates): Json<Vec<PositionUpdate>>,
) -> Result<StatusCode, ApiError> {
  state
    .store
    .update_step_positions(&workflow_id, &updates)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
