use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("workflow not found: {0}")]
  WorkflowNotFound(String),

  #[error("step not found: {0}")]
  StepNotFound(String),

  #[error("transition not found: {0}")]
  TransitionNotFound(String),

  #[error("stale write: expected version {expected}, stored version is {actual}")]
  VersionConflict { expected: i64, actual: i64 },

  #[error("the default workflow cannot be deleted or deactivated")]
  DefaultWorkflowProtected,

  #[error("workflow is inactive and cannot take new services: {0}")]
  WorkflowInactive(String),

  #[error("transition endpoint is not a step of this workflow: {0}")]
  UnknownStep(String),

  #[error("a step named '{name}' already exists in this workflow")]
  DuplicateStepName { name: String },

  #[error(transparent)]
  Database(#[from] sqlx::Error),
}
