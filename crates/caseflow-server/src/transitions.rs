use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use caseflow_store::Store;
use caseflow_workflow::{Transition, TransitionSpec};

use crate::AppState;
use crate::error::ApiError;

pub async fn create_transition(
  State(state): State<AppState>,
  Path(workflow_id): Path<String>,
  Json(spec): Json<TransitionSpec>,
) -> Result<(StatusCode, Json<Transition>), ApiError> {
  let transition = state.store.insert_transition(&workflow_id, spec).await?;
  Ok((StatusCode::CREATED, Json(transition)))
}

pub async fn update_transition(
  State(state): State<AppState>,
  Path((workflow_id, transition_id)): Path<(String, String)>,
  Json(spec): Json<TransitionSpec>,
) -> Result<Json<Transition>, ApiError> {
  let transition = state
    .store
    .update_transition(&workflow_id, &transition_id, spec)
    .await?;
  Ok(Json(transition))
}

pub async fn delete_transition(
  State(state): State<AppState>,
  Path((workflow_id, transition_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
  state
    .store
    .delete_transition(&workflow_id, &transition_id)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
