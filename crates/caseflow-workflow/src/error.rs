use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("step not found: {0}")]
  StepNotFound(String),

  #[error("transition not found: {0}")]
  TransitionNotFound(String),
}
