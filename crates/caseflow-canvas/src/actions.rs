use caseflow_workflow::Workflow;
use serde::Serialize;

/// Lifecycle operations offered on the workflow list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
  Activate,
  Deactivate,
  Duplicate,
  Delete,
}

/// Why a lifecycle action is withheld in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionBlocked {
  /// The fallback workflow can be neither deleted nor deactivated.
  DefaultWorkflow,
}

/// Guard a lifecycle action before any call leaves the client: the delete
/// button errors out and the active toggle is disabled for the default
/// workflow. The server enforces the same rules; this only saves the
/// round-trip.
pub fn check_action(workflow: &Workflow, action: LifecycleAction) -> Result<(), ActionBlocked> {
  match action {
    LifecycleAction::Delete | LifecycleAction::Deactivate if workflow.is_default => {
      Err(ActionBlocked::DefaultWorkflow)
    }
    _ => Ok(()),
  }
}

/// Default name offered when prompting for a duplicate's name.
pub fn duplicate_name(source_name: &str) -> String {
  format!("{} (Copy)", source_name)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn workflow(is_default: bool) -> Workflow {
    Workflow {
      workflow_id: "wf1".to_string(),
      name: "Standard Intake".to_string(),
      description: String::new(),
      is_active: true,
      is_default,
      version: 1,
      service_count: 0,
      steps: vec![],
      transitions: vec![],
    }
  }

  #[test]
  fn default_workflow_blocks_delete_and_deactivate() {
    let wf = workflow(true);
    assert_eq!(
      check_action(&wf, LifecycleAction::Delete),
      Err(ActionBlocked::DefaultWorkflow)
    );
    assert_eq!(
      check_action(&wf, LifecycleAction::Deactivate),
      Err(ActionBlocked::DefaultWorkflow)
    );
    assert_eq!(check_action(&wf, LifecycleAction::Duplicate), Ok(()));
    assert_eq!(check_action(&wf, LifecycleAction::Activate), Ok(()));
  }

  #[test]
  fn ordinary_workflow_blocks_nothing() {
    let wf = workflow(false);
    for action in [
      LifecycleAction::Activate,
      LifecycleAction::Deactivate,
      LifecycleAction::Duplicate,
      LifecycleAction::Delete,
    ] {
      assert_eq!(check_action(&wf, action), Ok(()));
    }
  }

  #[test]
  fn duplicate_prompt_suggests_a_copy_name() {
    assert_eq!(duplicate_name("Standard Intake"), "Standard Intake (Copy)");
  }
}
