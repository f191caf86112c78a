use std::collections::HashSet;

use caseflow_workflow::{StepType, Workflow, WorkflowError};

use crate::error::CanvasError;
use crate::queue::PositionQueue;
use crate::view::{EdgeView, NEW_TRANSITION_NAME, NodeView, Selection, StepStub, TransitionStub};

const POSITION_RETRY_LIMIT: u32 = 3;

/// Editor state for one workflow canvas: the loaded snapshot, the current
/// selection, optimistic step positions, and the position save-queue.
///
/// The session owns no I/O. Mutations produce stubs or queued writes that
/// the caller persists through the workflow API, then feeds the refreshed
/// aggregate back via [`replace_workflow`](Self::replace_workflow).
#[derive(Debug)]
pub struct EditorSession {
  workflow: Workflow,
  selection: Option<Selection>,
  read_only: bool,
  live_step_id: Option<String>,
  queue: PositionQueue,
  moved: HashSet<String>,
  revision: u64,
}

impl EditorSession {
  pub fn new(workflow: Workflow) -> Self {
    Self {
      workflow,
      selection: None,
      read_only: false,
      live_step_id: None,
      queue: PositionQueue::new(POSITION_RETRY_LIMIT),
      moved: HashSet::new(),
      revision: 0,
    }
  }

  /// Open the canvas for inspection only. All editing affordances are
  /// refused; `live_step_id` highlights the running service's current step.
  pub fn read_only(workflow: Workflow, live_step_id: Option<String>) -> Self {
    let mut session = Self::new(workflow);
    session.read_only = true;
    session.live_step_id = live_step_id;
    session
  }

  pub fn is_read_only(&self) -> bool {
    self.read_only
  }

  pub fn workflow(&self) -> &Workflow {
    &self.workflow
  }

  /// Swap in a freshly fetched aggregate. Bumps the structural revision
  /// when the step or transition count changed, which is the owner's cue
  /// to request a new validation verdict. A selection whose entity is gone
  /// is cleared.
  pub fn replace_workflow(&mut self, workflow: Workflow) {
    let counts_changed = workflow.steps.len() != self.workflow.steps.len()
      || workflow.transitions.len() != self.workflow.transitions.len();

    self.workflow = workflow;
    if counts_changed {
      self.revision += 1;
    }

    let stale = match &self.selection {
      Some(Selection::Step(id)) => self.workflow.get_step(id).is_none(),
      Some(Selection::Transition(id)) => self.workflow.get_transition(id).is_none(),
      None => false,
    };
    if stale {
      self.selection = None;
    }
  }

  /// Token for pairing validation requests with their verdicts; a verdict
  /// fetched at an older revision is stale.
  pub fn structural_revision(&self) -> u64 {
    self.revision
  }

  // ---- rendering ----

  pub fn nodes(&self) -> Vec<NodeView> {
    self
      .workflow
      .steps
      .iter()
      .map(|step| NodeView {
        step_id: step.step_id.clone(),
        display_name: step.display_name.clone(),
        step_type: step.step_type,
        color: step.color,
        position_x: step.position_x,
        position_y: step.position_y,
        has_source_handle: step.step_type.has_source_handle(),
        has_target_handle: step.step_type.has_target_handle(),
        is_selected: self.selection == Some(Selection::Step(step.step_id.clone())),
        is_live: self.live_step_id.as_deref() == Some(step.step_id.as_str()),
      })
      .collect()
  }

  pub fn edges(&self) -> Vec<EdgeView> {
    self
      .workflow
      .transitions
      .iter()
      .map(|transition| EdgeView {
        transition_id: transition.transition_id.clone(),
        from_step_id: transition.from_step_id.clone(),
        to_step_id: transition.to_step_id.clone(),
        label: transition.name.clone(),
        has_conditions: transition.has_conditions(),
        is_selected: self.selection
          == Some(Selection::Transition(transition.transition_id.clone())),
      })
      .collect()
  }

  // ---- selection ----

  pub fn selection(&self) -> Option<&Selection> {
    self.selection.as_ref()
  }

  /// Focus a step, opening its configuration panel. Clears any transition
  /// selection.
  pub fn select_step(&mut self, step_id: &str) -> Result<(), CanvasError> {
    self.ensure_editable()?;
    self.workflow.require_step(step_id)?;
    self.selection = Some(Selection::Step(step_id.to_string()));
    Ok(())
  }

  /// Focus a transition, opening its configuration panel. Clears any step
  /// selection.
  pub fn select_transition(&mut self, transition_id: &str) -> Result<(), CanvasError> {
    self.ensure_editable()?;
    self.workflow.require_transition(transition_id)?;
    self.selection = Some(Selection::Transition(transition_id.to_string()));
    Ok(())
  }

  pub fn clear_selection(&mut self) {
    self.selection = None;
  }

  // ---- editing ----

  /// Drag-connect two steps. The stub's endpoints are the source and
  /// target handles, whatever direction the pointer travelled.
  pub fn connect(&mut self, from_step_id: &str, to_step_id: &str) -> Result<TransitionStub, CanvasError> {
    self.ensure_editable()?;

    let from = self.workflow.require_step(from_step_id)?;
    if !from.step_type.has_source_handle() {
      return Err(CanvasError::NoSourceConnector(from_step_id.to_string()));
    }
    let to = self.workflow.require_step(to_step_id)?;
    if !to.step_type.has_target_handle() {
      return Err(CanvasError::NoTargetConnector(to_step_id.to_string()));
    }

    Ok(TransitionStub {
      from_step_id: from.step_id.clone(),
      to_step_id: to.step_id.clone(),
      name: NEW_TRANSITION_NAME.to_string(),
    })
  }

  /// Drop a palette item on empty canvas space: a step in create mode,
  /// carrying only its type and the drop coordinates. Refused until the
  /// workflow has been persisted.
  pub fn drop_step(&mut self, step_type: StepType, x: f64, y: f64) -> Result<StepStub, CanvasError> {
    self.ensure_editable()?;
    if self.workflow.workflow_id.is_empty() {
      return Err(CanvasError::WorkflowNotPersisted);
    }

    Ok(StepStub {
      step_type,
      position_x: x,
      position_y: y,
      is_new: true,
    })
  }

  /// Move a step on the canvas. The local position updates immediately;
  /// nothing is queued until the drag ends.
  pub fn move_step(&mut self, step_id: &str, x: f64, y: f64) -> Result<(), CanvasError> {
    self.ensure_editable()?;

    let step = self
      .workflow
      .steps
      .iter_mut()
      .find(|s| s.step_id == step_id)
      .ok_or_else(|| WorkflowError::StepNotFound(step_id.to_string()))?;
    step.position_x = x;
    step.position_y = y;
    self.moved.insert(step_id.to_string());
    Ok(())
  }

  /// The drag ended: queue one position write per step moved since the
  /// last drag, at its final position.
  pub fn end_drag(&mut self) {
    for step_id in std::mem::take(&mut self.moved) {
      if let Some(step) = self.workflow.get_step(&step_id) {
        self.queue.enqueue(&step_id, step.position_x, step.position_y);
      }
    }
  }

  /// The position save-queue; the owner drains it toward the store.
  pub fn position_queue(&mut self) -> &mut PositionQueue {
    &mut self.queue
  }

  pub fn has_unsaved_changes(&self) -> bool {
    !self.moved.is_empty() || self.queue.has_unsaved_changes()
  }

  fn ensure_editable(&self) -> Result<(), CanvasError> {
    if self.read_only {
      return Err(CanvasError::ReadOnly);
    }
    Ok(())
  }
}
