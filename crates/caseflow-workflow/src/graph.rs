use std::collections::{HashMap, HashSet};

use crate::enums::StepType;
use crate::step::Step;
use crate::transition::Transition;

/// Graph structure over a workflow's steps and transitions, for traversal
/// and analysis. Transitions whose endpoints do not both resolve to known
/// steps are excluded; the validator reports them separately.
#[derive(Debug, Clone)]
pub struct StepGraph {
  /// Adjacency list: step_id -> downstream step_ids.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: step_id -> upstream step_ids.
  reverse_adjacency: HashMap<String, Vec<String>>,
  /// Steps with `step_type = START`.
  start_steps: Vec<String>,
  /// Steps with `step_type = END`.
  end_steps: Vec<String>,
}

impl StepGraph {
  /// Build a graph from steps and transitions.
  pub fn new(steps: &[Step], transitions: &[Transition]) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    for step in steps {
      adjacency.entry(step.step_id.clone()).or_default();
      reverse_adjacency.entry(step.step_id.clone()).or_default();
    }

    for transition in transitions {
      let known = adjacency.contains_key(&transition.from_step_id)
        && adjacency.contains_key(&transition.to_step_id);
      if !known {
        continue;
      }
      adjacency
        .entry(transition.from_step_id.clone())
        .or_default()
        .push(transition.to_step_id.clone());
      reverse_adjacency
        .entry(transition.to_step_id.clone())
        .or_default()
        .push(transition.from_step_id.clone());
    }

    let start_steps = steps
      .iter()
      .filter(|s| s.step_type == StepType::Start)
      .map(|s| s.step_id.clone())
      .collect();

    let end_steps = steps
      .iter()
      .filter(|s| s.step_type == StepType::End)
      .map(|s| s.step_id.clone())
      .collect();

    Self {
      adjacency,
      reverse_adjacency,
      start_steps,
      end_steps,
    }
  }

  /// Steps with `step_type = START`.
  pub fn start_steps(&self) -> &[String] {
    &self.start_steps
  }

  /// Steps with `step_type = END`.
  pub fn end_steps(&self) -> &[String] {
    &self.end_steps
  }

  /// Downstream steps of the given step.
  pub fn downstream(&self, step_id: &str) -> &[String] {
    self
      .adjacency
      .get(step_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Upstream steps of the given step.
  pub fn upstream(&self, step_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(step_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// All steps reachable from the START steps, following edges forward.
  /// The START steps themselves are included.
  pub fn reachable_from_start(&self) -> HashSet<String> {
    self.flood(&self.start_steps, &self.adjacency)
  }

  /// All steps from which some END step is reachable. The END steps
  /// themselves are included.
  pub fn reaching_end(&self) -> HashSet<String> {
    self.flood(&self.end_steps, &self.reverse_adjacency)
  }

  fn flood(&self, roots: &[String], edges: &HashMap<String, Vec<String>>) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut to_visit: Vec<&String> = roots.iter().collect();

    while let Some(step_id) = to_visit.pop() {
      if seen.insert(step_id.clone()) {
        if let Some(next) = edges.get(step_id) {
          for n in next {
            if !seen.contains(n) {
              to_visit.push(n);
            }
          }
        }
      }
    }

    seen
  }
}
