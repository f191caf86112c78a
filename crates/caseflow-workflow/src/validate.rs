use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::StepType;
use crate::graph::StepGraph;
use crate::step::Step;
use crate::transition::Transition;

/// A structural problem found in a workflow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
  MissingStartStep,
  MissingEndStep,
  DuplicateStepName { name: String },
  DanglingTransition { transition_id: String },
  UnreachableStep { step_id: String },
  NoPathToEnd { step_id: String },
  StartHasIncoming { step_id: String },
  EndHasOutgoing { step_id: String },
  SelfLoop { transition_id: String },
}

impl fmt::Display for Issue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Issue::MissingStartStep => write!(f, "workflow has no start step"),
      Issue::MissingEndStep => write!(f, "workflow has no end step"),
      Issue::DuplicateStepName { name } => {
        write!(f, "step name '{}' is used by more than one step", name)
      }
      Issue::DanglingTransition { transition_id } => write!(
        f,
        "transition '{}' references a step that does not exist",
        transition_id
      ),
      Issue::UnreachableStep { step_id } => {
        write!(f, "step '{}' is not reachable from any start step", step_id)
      }
      Issue::NoPathToEnd { step_id } => {
        write!(f, "step '{}' has no path to an end step", step_id)
      }
      Issue::StartHasIncoming { step_id } => {
        write!(f, "start step '{}' has incoming transitions", step_id)
      }
      Issue::EndHasOutgoing { step_id } => {
        write!(f, "end step '{}' has outgoing transitions", step_id)
      }
      Issue::SelfLoop { transition_id } => {
        write!(f, "transition '{}' loops a step back to itself", transition_id)
      }
    }
  }
}

/// The outcome of validating a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
  pub issues: Vec<Issue>,
}

impl ValidationReport {
  pub fn is_valid(&self) -> bool {
    self.issues.is_empty()
  }

  /// Issues rendered as the opaque strings of the wire contract.
  pub fn messages(&self) -> Vec<String> {
    self.issues.iter().map(|i| i.to_string()).collect()
  }
}

/// Validate a workflow graph. Pure function; safe to call anywhere the
/// steps and transitions are in hand, with no persistence round-trip.
pub fn validate(steps: &[Step], transitions: &[Transition]) -> ValidationReport {
  let mut issues = Vec::new();

  let mut names: HashMap<&str, u32> = HashMap::new();
  for step in steps {
    *names.entry(step.name.as_str()).or_default() += 1;
  }
  let mut duplicates: Vec<&str> = names
    .into_iter()
    .filter(|(_, count)| *count > 1)
    .map(|(name, _)| name)
    .collect();
  duplicates.sort_unstable();
  for name in duplicates {
    issues.push(Issue::DuplicateStepName {
      name: name.to_string(),
    });
  }

  let step_ids: HashSet<&str> = steps.iter().map(|s| s.step_id.as_str()).collect();
  for transition in transitions {
    let dangling = !step_ids.contains(transition.from_step_id.as_str())
      || !step_ids.contains(transition.to_step_id.as_str());
    if dangling {
      issues.push(Issue::DanglingTransition {
        transition_id: transition.transition_id.clone(),
      });
    } else if transition.is_self_loop() {
      issues.push(Issue::SelfLoop {
        transition_id: transition.transition_id.clone(),
      });
    }
  }

  let graph = StepGraph::new(steps, transitions);

  let has_start = !graph.start_steps().is_empty();
  let has_end = !graph.end_steps().is_empty();
  if !has_start {
    issues.push(Issue::MissingStartStep);
  }
  if !has_end {
    issues.push(Issue::MissingEndStep);
  }

  for step in steps {
    match step.step_type {
      StepType::Start if !graph.upstream(&step.step_id).is_empty() => {
        issues.push(Issue::StartHasIncoming {
          step_id: step.step_id.clone(),
        });
      }
      StepType::End if !graph.downstream(&step.step_id).is_empty() => {
        issues.push(Issue::EndHasOutgoing {
          step_id: step.step_id.clone(),
        });
      }
      _ => {}
    }
  }

  // Reachability is only meaningful once the graph has the endpoints it
  // is measured against; without them every step would be flagged.
  if has_start {
    let reachable = graph.reachable_from_start();
    for step in steps {
      if !reachable.contains(&step.step_id) {
        issues.push(Issue::UnreachableStep {
          step_id: step.step_id.clone(),
        });
      }
    }
  }
  if has_end {
    let reaching = graph.reaching_end();
    for step in steps {
      if step.step_type != StepType::End && !reaching.contains(&step.step_id) {
        issues.push(Issue::NoPathToEnd {
          step_id: step.step_id.clone(),
        });
      }
    }
  }

  ValidationReport { issues }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::enums::{StepColor, StepType};

  fn step(id: &str, name: &str, step_type: StepType) -> Step {
    Step {
      step_id: id.to_string(),
      name: name.to_string(),
      display_name: name.to_string(),
      description: None,
      step_type,
      color: StepColor::Gray,
      allowed_roles: vec![],
      required_fields: vec![],
      auto_assign: false,
      notify_roles: vec![],
      notify_client: false,
      position_x: 0.0,
      position_y: 0.0,
    }
  }

  fn transition(id: &str, from: &str, to: &str) -> Transition {
    Transition {
      transition_id: id.to_string(),
      from_step_id: from.to_string(),
      to_step_id: to.to_string(),
      name: "go".to_string(),
      description: None,
      requires_invoice_raised: false,
      requires_invoice_paid: false,
      requires_assignment: false,
      allowed_roles: vec![],
      send_notification: false,
      notification_template: None,
    }
  }

  #[test]
  fn empty_workflow_is_invalid() {
    let report = validate(&[], &[]);
    assert!(!report.is_valid());
    assert!(report.issues.contains(&Issue::MissingStartStep));
    assert!(report.issues.contains(&Issue::MissingEndStep));
    assert!(!report.messages().is_empty());
  }

  #[test]
  fn linear_workflow_is_valid() {
    let steps = vec![
      step("s1", "received", StepType::Start),
      step("s2", "in_progress", StepType::Normal),
      step("s3", "completed", StepType::End),
    ];
    let transitions = vec![transition("t1", "s1", "s2"), transition("t2", "s2", "s3")];

    let report = validate(&steps, &transitions);
    assert!(report.is_valid(), "unexpected issues: {:?}", report.issues);
  }

  #[test]
  fn orphan_step_is_unreachable_and_dead_ended() {
    let steps = vec![
      step("s1", "received", StepType::Start),
      step("s2", "completed", StepType::End),
      step("s3", "orphan", StepType::Normal),
    ];
    let transitions = vec![transition("t1", "s1", "s2")];

    let report = validate(&steps, &transitions);
    assert!(report.issues.contains(&Issue::UnreachableStep {
      step_id: "s3".to_string()
    }));
    assert!(report.issues.contains(&Issue::NoPathToEnd {
      step_id: "s3".to_string()
    }));
  }

  #[test]
  fn dangling_transition_is_reported_not_traversed() {
    let steps = vec![
      step("s1", "received", StepType::Start),
      step("s2", "completed", StepType::End),
    ];
    let transitions = vec![transition("t1", "s1", "s2"), transition("t2", "s1", "gone")];

    let report = validate(&steps, &transitions);
    assert_eq!(
      report.issues,
      vec![Issue::DanglingTransition {
        transition_id: "t2".to_string()
      }]
    );
  }

  #[test]
  fn duplicate_names_are_reported_once_per_name() {
    let steps = vec![
      step("s1", "review", StepType::Start),
      step("s2", "review", StepType::Normal),
      step("s3", "done", StepType::End),
    ];
    let transitions = vec![transition("t1", "s1", "s2"), transition("t2", "s2", "s3")];

    let report = validate(&steps, &transitions);
    assert_eq!(
      report.issues,
      vec![Issue::DuplicateStepName {
        name: "review".to_string()
      }]
    );
  }

  #[test]
  fn start_incoming_and_end_outgoing_are_flagged() {
    let steps = vec![
      step("s1", "received", StepType::Start),
      step("s2", "completed", StepType::End),
    ];
    let transitions = vec![transition("t1", "s1", "s2"), transition("t2", "s2", "s1")];

    let report = validate(&steps, &transitions);
    assert!(report.issues.contains(&Issue::StartHasIncoming {
      step_id: "s1".to_string()
    }));
    assert!(report.issues.contains(&Issue::EndHasOutgoing {
      step_id: "s2".to_string()
    }));
  }

  #[test]
  fn self_loop_is_reported() {
    let steps = vec![
      step("s1", "received", StepType::Start),
      step("s2", "rework", StepType::Normal),
      step("s3", "completed", StepType::End),
    ];
    let transitions = vec![
      transition("t1", "s1", "s2"),
      transition("t2", "s2", "s3"),
      transition("t3", "s2", "s2"),
    ];

    let report = validate(&steps, &transitions);
    assert_eq!(
      report.issues,
      vec![Issue::SelfLoop {
        transition_id: "t3".to_string()
      }]
    );
  }
}
