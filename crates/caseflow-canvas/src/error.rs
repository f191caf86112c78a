use caseflow_workflow::WorkflowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
  #[error("canvas is read-only")]
  ReadOnly,

  #[error("workflow must be saved before steps can be placed")]
  WorkflowNotPersisted,

  #[error("end step has no outgoing connector: {0}")]
  NoSourceConnector(String),

  #[error("start step has no incoming connector: {0}")]
  NoTargetConnector(String),

  #[error(transparent)]
  Workflow(#[from] WorkflowError),
}
