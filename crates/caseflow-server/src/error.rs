use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use caseflow_store::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
  NotFound,
  VersionConflict,
  DefaultWorkflowProtected,
  WorkflowInactive,
  UnknownStep,
  DuplicateStepName,
  Internal,
}

/// The JSON error envelope every failing route returns.
#[derive(Debug, Serialize)]
pub struct ApiError {
  pub code: ApiErrorCode,
  pub message: String,
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self.code {
      ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
      ApiErrorCode::VersionConflict | ApiErrorCode::DefaultWorkflowProtected => {
        StatusCode::CONFLICT
      }
      ApiErrorCode::WorkflowInactive
      | ApiErrorCode::UnknownStep
      | ApiErrorCode::DuplicateStepName => StatusCode::UNPROCESSABLE_ENTITY,
      ApiErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (self.status(), Json(json!({ "error": self }))).into_response()
  }
}

impl From<StoreError> for ApiError {
  fn from(err: StoreError) -> Self {
    let code = match &err {
      StoreError::WorkflowNotFound(_)
      | StoreError::StepNotFound(_)
      | StoreError::TransitionNotFound(_) => ApiErrorCode::NotFound,
      StoreError::VersionConflict { .. } => ApiErrorCode::VersionConflict,
      StoreError::DefaultWorkflowProtected => ApiErrorCode::DefaultWorkflowProtected,
      StoreError::WorkflowInactive(_) => ApiErrorCode::WorkflowInactive,
      StoreError::UnknownStep(_) => ApiErrorCode::UnknownStep,
      StoreError::DuplicateStepName { .. } => ApiErrorCode::DuplicateStepName,
      StoreError::Database(db) => {
        error!(error = %db, "store_database_error");
        return ApiError {
          code: ApiErrorCode::Internal,
          message: "internal storage error".to_string(),
        };
      }
    };

    ApiError {
      code,
      message: err.to_string(),
    }
  }
}
