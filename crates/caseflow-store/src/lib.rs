//! Caseflow Store
//!
//! This crate provides the storage trait and SQLite implementation for
//! workflows, their steps and transitions, and service bindings.
//!
//! The [`Store`] trait defines operations for:
//! - Workflow lifecycle: create, update (version-checked), delete,
//!   duplicate, list
//! - Step and transition editing, including the cascade that removes a
//!   deleted step's transitions
//! - Batch position writes (cosmetic, never version-bumped)
//! - Binding services to active workflows

mod error;
mod sqlite;
mod types;

pub use error::StoreError;
pub use sqlite::SqliteStore;
pub use types::{PositionUpdate, WorkflowSummary, WorkflowUpdate};

use caseflow_workflow::{Step, StepSpec, Transition, TransitionSpec, Workflow};

/// Storage trait for workflows and their graph entities.
pub trait Store {
  /// Error type for storage operations.
  type Error;

  /// List workflows as summaries, optionally restricted to active ones.
  fn list_workflows(
    &self,
    active_only: bool,
  ) -> impl std::future::Future<Output = Result<Vec<WorkflowSummary>, Self::Error>> + Send;

  /// Get a workflow with its steps and transitions expanded.
  fn get_workflow(
    &self,
    workflow_id: &str,
  ) -> impl std::future::Future<Output = Result<Workflow, Self::Error>> + Send;

  /// Create an empty workflow.
  fn create_workflow(
    &self,
    name: &str,
    description: &str,
  ) -> impl std::future::Future<Output = Result<Workflow, Self::Error>> + Send;

  /// Update the workflow document. Rejected when `expected_version` does
  /// not match, and when the update would deactivate the default workflow.
  fn update_workflow(
    &self,
    workflow_id: &str,
    update: &WorkflowUpdate,
  ) -> impl std::future::Future<Output = Result<Workflow, Self::Error>> + Send;

  /// Delete a workflow and everything under it. Rejected for the default
  /// workflow.
  fn delete_workflow(
    &self,
    workflow_id: &str,
  ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

  /// Make a workflow the fallback default, clearing the flag from any
  /// other workflow. At most one workflow is default at a time.
  fn set_default(
    &self,
    workflow_id: &str,
  ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

  /// Deep-copy a workflow under a new name: fresh ids for the workflow and
  /// every step and transition, never the default, version reset.
  fn duplicate_workflow(
    &self,
    workflow_id: &str,
    new_name: &str,
  ) -> impl std::future::Future<Output = Result<Workflow, Self::Error>> + Send;

  /// Add a step. The step name is normalized and must be unique within the
  /// workflow.
  fn insert_step(
    &self,
    workflow_id: &str,
    spec: StepSpec,
  ) -> impl std::future::Future<Output = Result<Step, Self::Error>> + Send;

  /// Update a step's full field set.
  fn update_step(
    &self,
    workflow_id: &str,
    step_id: &str,
    spec: StepSpec,
  ) -> impl std::future::Future<Output = Result<Step, Self::Error>> + Send;

  /// Delete a step and, in the same transaction, every transition that
  /// references it.
  fn delete_step(
    &self,
    workflow_id: &str,
    step_id: &str,
  ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

  /// Persist canvas positions for the given steps.
  fn update_step_positions(
    &self,
    workflow_id: &str,
    updates: &[PositionUpdate],
  ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

  /// Add a transition. Both endpoints must be steps of the workflow.
  fn insert_transition(
    &self,
    workflow_id: &str,
    spec: TransitionSpec,
  ) -> impl std::future::Future<Output = Result<Transition, Self::Error>> + Send;

  /// Update a transition's full field set.
  fn update_transition(
    &self,
    workflow_id: &str,
    transition_id: &str,
    spec: TransitionSpec,
  ) -> impl std::future::Future<Output = Result<Transition, Self::Error>> + Send;

  /// Delete a transition.
  fn delete_transition(
    &self,
    workflow_id: &str,
    transition_id: &str,
  ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

  /// Bind a service to a workflow. Rejected when the workflow is inactive.
  /// Rebinding an already-bound service moves it.
  fn bind_service(
    &self,
    workflow_id: &str,
    service_id: &str,
  ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;

  /// Release a service from whatever workflow it is bound to. Idempotent.
  fn release_service(
    &self,
    service_id: &str,
  ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;
}
