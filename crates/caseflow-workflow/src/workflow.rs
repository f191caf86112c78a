use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::graph::StepGraph;
use crate::step::Step;
use crate::transition::Transition;

/// A named workflow: a set of steps and the transitions between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  pub workflow_id: String,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default = "default_true")]
  pub is_active: bool,
  #[serde(default)]
  pub is_default: bool,
  /// Bumped on every structural mutation; stale writes are rejected.
  #[serde(default = "default_version")]
  pub version: i64,
  /// Number of services currently bound to this workflow. Derived,
  /// read-only.
  #[serde(default)]
  pub service_count: i64,
  #[serde(default)]
  pub steps: Vec<Step>,
  #[serde(default)]
  pub transitions: Vec<Transition>,
}

fn default_true() -> bool {
  true
}

fn default_version() -> i64 {
  1
}

impl Workflow {
  /// Build the graph structure for traversal and analysis.
  pub fn graph(&self) -> StepGraph {
    StepGraph::new(&self.steps, &self.transitions)
  }

  /// Get a step by id.
  pub fn get_step(&self, step_id: &str) -> Option<&Step> {
    self.steps.iter().find(|s| s.step_id == step_id)
  }

  /// Get a transition by id.
  pub fn get_transition(&self, transition_id: &str) -> Option<&Transition> {
    self
      .transitions
      .iter()
      .find(|t| t.transition_id == transition_id)
  }

  /// Get a step by id, or an error naming the missing id.
  pub fn require_step(&self, step_id: &str) -> Result<&Step, WorkflowError> {
    self
      .get_step(step_id)
      .ok_or_else(|| WorkflowError::StepNotFound(step_id.to_string()))
  }

  /// Get a transition by id, or an error naming the missing id.
  pub fn require_transition(&self, transition_id: &str) -> Result<&Transition, WorkflowError> {
    self
      .get_transition(transition_id)
      .ok_or_else(|| WorkflowError::TransitionNotFound(transition_id.to_string()))
  }

  /// Transitions a service in the given step may fire.
  pub fn transitions_from(&self, step_id: &str) -> Vec<&Transition> {
    self
      .transitions
      .iter()
      .filter(|t| t.from_step_id == step_id)
      .collect()
  }
}
