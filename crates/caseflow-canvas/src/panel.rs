use caseflow_workflow::{StepSpec, TransitionSpec, normalize_step_name};
use serde::{Deserialize, Serialize};

/// What the persistence layer should do with a submitted form: create a new
/// entity or update an existing one, decided by whether the form carried an
/// id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Write<T> {
  Create { fields: T },
  Update { id: String, fields: T },
}

/// The step configuration panel: edits an existing step (id present) or
/// configures a dropped palette item (no id yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepForm {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub step_id: Option<String>,
  pub fields: StepSpec,
}

impl StepForm {
  /// The delete affordance is absent for a brand-new, unsaved step.
  pub fn offers_delete(&self) -> bool {
    self.step_id.is_some()
  }

  /// Submit the form. The step name is normalized the way the panel does
  /// as the user types; an id decides update, its absence decides create.
  pub fn submit(mut self) -> Write<StepSpec> {
    self.fields.name = normalize_step_name(&self.fields.name);
    match self.step_id {
      Some(id) => Write::Update {
        id,
        fields: self.fields,
      },
      None => Write::Create {
        fields: self.fields,
      },
    }
  }
}

/// The transition configuration panel. Same create/update/delete contract
/// shape as the step panel, keyed off presence of an id. The three
/// precondition toggles and the role set are independent; no combination
/// is rejected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionForm {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub transition_id: Option<String>,
  pub fields: TransitionSpec,
}

impl TransitionForm {
  pub fn offers_delete(&self) -> bool {
    self.transition_id.is_some()
  }

  pub fn submit(self) -> Write<TransitionSpec> {
    match self.transition_id {
      Some(id) => Write::Update {
        id,
        fields: self.fields,
      },
      None => Write::Create {
        fields: self.fields,
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use caseflow_workflow::{StepColor, StepType};

  fn fields(name: &str) -> StepSpec {
    StepSpec {
      name: name.to_string(),
      display_name: name.to_string(),
      description: None,
      step_type: StepType::Normal,
      color: StepColor::Green,
      allowed_roles: vec![],
      required_fields: vec![],
      auto_assign: false,
      notify_roles: vec![],
      notify_client: false,
      position_x: 0.0,
      position_y: 0.0,
    }
  }

  #[test]
  fn existing_step_submits_an_update() {
    let form = StepForm {
      step_id: Some("s1".to_string()),
      fields: fields("In Review"),
    };
    assert!(form.offers_delete());

    match form.submit() {
      Write::Update { id, fields } => {
        assert_eq!(id, "s1");
        assert_eq!(fields.name, "in_review");
      }
      other => panic!("expected update, got {other:?}"),
    }
  }

  #[test]
  fn dropped_palette_item_submits_a_create() {
    let form = StepForm {
      step_id: None,
      fields: fields("New Step"),
    };
    assert!(!form.offers_delete());

    match form.submit() {
      Write::Create { fields } => assert_eq!(fields.name, "new_step"),
      other => panic!("expected create, got {other:?}"),
    }
  }

  #[test]
  fn odd_precondition_combinations_pass_through() {
    let form = TransitionForm {
      transition_id: None,
      fields: TransitionSpec {
        from_step_id: "s1".to_string(),
        to_step_id: "s2".to_string(),
        name: "Lodge".to_string(),
        description: None,
        requires_invoice_raised: false,
        requires_invoice_paid: true,
        requires_assignment: false,
        allowed_roles: vec![],
        send_notification: true,
        notification_template: None,
      },
    };

    match form.submit() {
      Write::Create { fields } => {
        assert!(fields.requires_invoice_paid);
        assert!(!fields.requires_invoice_raised);
      }
      other => panic!("expected create, got {other:?}"),
    }
  }
}
