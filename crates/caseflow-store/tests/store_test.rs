//! Integration tests for SqliteStore against a temporary database file.

use caseflow_workflow::{Role, StepColor, StepSpec, StepType, TransitionSpec};
use caseflow_store::{PositionUpdate, SqliteStore, Store, StoreError, WorkflowUpdate};

async fn create_test_store() -> (SqliteStore, tempfile::TempDir) {
  let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
  let store = SqliteStore::connect(&temp_dir.path().join("caseflow.db"))
    .await
    .expect("failed to open store");
  store.migrate().await.expect("failed to migrate");
  (store, temp_dir)
}

fn step_spec(name: &str, step_type: StepType) -> StepSpec {
  StepSpec {
    name: name.to_string(),
    display_name: name.to_string(),
    description: None,
    step_type,
    color: StepColor::Blue,
    allowed_roles: vec![Role::Admin, Role::Accountant],
    required_fields: vec![],
    auto_assign: false,
    notify_roles: vec![],
    notify_client: false,
    position_x: 0.0,
    position_y: 0.0,
  }
}

fn transition_spec(from: &str, to: &str, name: &str) -> TransitionSpec {
  TransitionSpec {
    from_step_id: from.to_string(),
    to_step_id: to.to_string(),
    name: name.to_string(),
    description: None,
    requires_invoice_raised: false,
    requires_invoice_paid: false,
    requires_assignment: false,
    allowed_roles: vec![],
    send_notification: false,
    notification_template: None,
  }
}

#[tokio::test]
async fn create_and_load_roundtrip() {
  let (store, _dir) = create_test_store().await;

  let workflow = store
    .create_workflow("Standard Intake", "Default intake process")
    .await
    .unwrap();
  assert_eq!(workflow.version, 1);
  assert!(workflow.is_active);
  assert!(!workflow.is_default);

  let start = store
    .insert_step(&workflow.workflow_id, step_spec("Received", StepType::Start))
    .await
    .unwrap();
  assert_eq!(start.name, "received");

  let end = store
    .insert_step(&workflow.workflow_id, step_spec("Completed", StepType::End))
    .await
    .unwrap();

  store
    .insert_transition(
      &workflow.workflow_id,
      transition_spec(&start.step_id, &end.step_id, "Complete"),
    )
    .await
    .unwrap();

  let loaded = store.get_workflow(&workflow.workflow_id).await.unwrap();
  assert_eq!(loaded.steps.len(), 2);
  assert_eq!(loaded.transitions.len(), 1);
  assert_eq!(loaded.steps[0].allowed_roles, vec![Role::Admin, Role::Accountant]);
  // three structural mutations after create
  assert_eq!(loaded.version, 4);
}

#[tokio::test]
async fn duplicate_copies_steps_and_transitions() {
  let (store, _dir) = create_test_store().await;

  let workflow = store.create_workflow("Standard Intake", "").await.unwrap();
  let s1 = store
    .insert_step(&workflow.workflow_id, step_spec("Received", StepType::Start))
    .await
    .unwrap();
  let s2 = store
    .insert_step(&workflow.workflow_id, step_spec("In Progress", StepType::Normal))
    .await
    .unwrap();
  let s3 = store
    .insert_step(&workflow.workflow_id, step_spec("Completed", StepType::End))
    .await
    .unwrap();
  store
    .insert_transition(&workflow.workflow_id, transition_spec(&s1.step_id, &s2.step_id, "Start"))
    .await
    .unwrap();
  store
    .insert_transition(&workflow.workflow_id, transition_spec(&s2.step_id, &s3.step_id, "Finish"))
    .await
    .unwrap();

  let copy = store
    .duplicate_workflow(&workflow.workflow_id, "Standard Intake (Copy)")
    .await
    .unwrap();

  assert_eq!(copy.name, "Standard Intake (Copy)");
  assert_eq!(copy.steps.len(), 3);
  assert_eq!(copy.transitions.len(), 2);
  assert!(!copy.is_default);
  assert_eq!(copy.version, 1);
  assert_ne!(copy.workflow_id, workflow.workflow_id);

  // endpoints are remapped onto the copied steps, not the source's
  let copy_step_ids: Vec<&str> = copy.steps.iter().map(|s| s.step_id.as_str()).collect();
  for transition in &copy.transitions {
    assert!(copy_step_ids.contains(&transition.from_step_id.as_str()));
    assert!(copy_step_ids.contains(&transition.to_step_id.as_str()));
  }
}

#[tokio::test]
async fn deleting_a_step_cascades_to_its_transitions() {
  let (store, _dir) = create_test_store().await;

  let workflow = store.create_workflow("Cascade", "").await.unwrap();
  let s1 = store
    .insert_step(&workflow.workflow_id, step_spec("Received", StepType::Start))
    .await
    .unwrap();
  let s2 = store
    .insert_step(&workflow.workflow_id, step_spec("Review", StepType::Normal))
    .await
    .unwrap();
  let s3 = store
    .insert_step(&workflow.workflow_id, step_spec("Completed", StepType::End))
    .await
    .unwrap();
  store
    .insert_transition(&workflow.workflow_id, transition_spec(&s1.step_id, &s2.step_id, "a"))
    .await
    .unwrap();
  store
    .insert_transition(&workflow.workflow_id, transition_spec(&s2.step_id, &s3.step_id, "b"))
    .await
    .unwrap();
  store
    .insert_transition(&workflow.workflow_id, transition_spec(&s1.step_id, &s3.step_id, "c"))
    .await
    .unwrap();

  store.delete_step(&workflow.workflow_id, &s2.step_id).await.unwrap();

  let loaded = store.get_workflow(&workflow.workflow_id).await.unwrap();
  assert_eq!(loaded.steps.len(), 2);
  // only the transition not touching s2 survives
  assert_eq!(loaded.transitions.len(), 1);
  assert_eq!(loaded.transitions[0].name, "c");
}

#[tokio::test]
async fn stale_document_write_is_rejected() {
  let (store, _dir) = create_test_store().await;

  let workflow = store.create_workflow("Versioned", "").await.unwrap();
  store
    .insert_step(&workflow.workflow_id, step_spec("Received", StepType::Start))
    .await
    .unwrap();

  // the caller still holds version 1, but the step insert bumped it to 2
  let result = store
    .update_workflow(
      &workflow.workflow_id,
      &WorkflowUpdate {
        name: "Renamed".to_string(),
        description: String::new(),
        is_active: true,
        expected_version: 1,
      },
    )
    .await;

  match result {
    Err(StoreError::VersionConflict { expected, actual }) => {
      assert_eq!(expected, 1);
      assert_eq!(actual, 2);
    }
    other => panic!("expected VersionConflict, got {other:?}"),
  }
}

#[tokio::test]
async fn default_workflow_cannot_be_deleted_or_deactivated() {
  let (store, _dir) = create_test_store().await;

  let workflow = store.create_workflow("Fallback", "").await.unwrap();
  store.set_default(&workflow.workflow_id).await.unwrap();

  let deleted = store.delete_workflow(&workflow.workflow_id).await;
  assert!(matches!(deleted, Err(StoreError::DefaultWorkflowProtected)));

  let deactivated = store
    .update_workflow(
      &workflow.workflow_id,
      &WorkflowUpdate {
        name: "Fallback".to_string(),
        description: String::new(),
        is_active: false,
        expected_version: 1,
      },
    )
    .await;
  assert!(matches!(deactivated, Err(StoreError::DefaultWorkflowProtected)));
}

#[tokio::test]
async fn set_default_moves_the_flag() {
  let (store, _dir) = create_test_store().await;

  let first = store.create_workflow("First", "").await.unwrap();
  let second = store.create_workflow("Second", "").await.unwrap();

  store.set_default(&first.workflow_id).await.unwrap();
  store.set_default(&second.workflow_id).await.unwrap();

  assert!(!store.get_workflow(&first.workflow_id).await.unwrap().is_default);
  assert!(store.get_workflow(&second.workflow_id).await.unwrap().is_default);
}

#[tokio::test]
async fn position_writes_do_not_bump_the_version() {
  let (store, _dir) = create_test_store().await;

  let workflow = store.create_workflow("Layout", "").await.unwrap();
  let step = store
    .insert_step(&workflow.workflow_id, step_spec("Received", StepType::Start))
    .await
    .unwrap();

  let before = store.get_workflow(&workflow.workflow_id).await.unwrap().version;

  store
    .update_step_positions(
      &workflow.workflow_id,
      &[PositionUpdate {
        step_id: step.step_id.clone(),
        x: 250.0,
        y: 180.0,
      }],
    )
    .await
    .unwrap();

  let loaded = store.get_workflow(&workflow.workflow_id).await.unwrap();
  assert_eq!(loaded.version, before);
  assert_eq!(loaded.steps[0].position_x, 250.0);
  assert_eq!(loaded.steps[0].position_y, 180.0);
}

#[tokio::test]
async fn transition_endpoints_must_exist() {
  let (store, _dir) = create_test_store().await;

  let workflow = store.create_workflow("Edges", "").await.unwrap();
  let step = store
    .insert_step(&workflow.workflow_id, step_spec("Received", StepType::Start))
    .await
    .unwrap();

  let result = store
    .insert_transition(&workflow.workflow_id, transition_spec(&step.step_id, "missing", "go"))
    .await;

  assert!(matches!(result, Err(StoreError::UnknownStep(id)) if id == "missing"));
}

#[tokio::test]
async fn duplicate_step_names_are_rejected() {
  let (store, _dir) = create_test_store().await;

  let workflow = store.create_workflow("Names", "").await.unwrap();
  store
    .insert_step(&workflow.workflow_id, step_spec("In Review", StepType::Start))
    .await
    .unwrap();

  // normalizes to the same internal key
  let result = store
    .insert_step(&workflow.workflow_id, step_spec("in  review", StepType::Normal))
    .await;

  assert!(matches!(
    result,
    Err(StoreError::DuplicateStepName { name }) if name == "in_review"
  ));
}

#[tokio::test]
async fn services_bind_only_to_active_workflows() {
  let (store, _dir) = create_test_store().await;

  let workflow = store.create_workflow("Bindable", "").await.unwrap();
  store.bind_service(&workflow.workflow_id, "svc-1").await.unwrap();
  store.bind_service(&workflow.workflow_id, "svc-2").await.unwrap();

  let loaded = store.get_workflow(&workflow.workflow_id).await.unwrap();
  assert_eq!(loaded.service_count, 2);

  store
    .update_workflow(
      &workflow.workflow_id,
      &WorkflowUpdate {
        name: "Bindable".to_string(),
        description: String::new(),
        is_active: false,
        expected_version: loaded.version,
      },
    )
    .await
    .unwrap();

  let result = store.bind_service(&workflow.workflow_id, "svc-3").await;
  assert!(matches!(result, Err(StoreError::WorkflowInactive(_))));

  store.release_service("svc-1").await.unwrap();
  let loaded = store.get_workflow(&workflow.workflow_id).await.unwrap();
  assert_eq!(loaded.service_count, 1);
}

#[tokio::test]
async fn inactive_workflows_are_hidden_from_active_listings() {
  let (store, _dir) = create_test_store().await;

  let active = store.create_workflow("Active", "").await.unwrap();
  let dormant = store.create_workflow("Dormant", "").await.unwrap();
  store
    .update_workflow(
      &dormant.workflow_id,
      &WorkflowUpdate {
        name: "Dormant".to_string(),
        description: String::new(),
        is_active: false,
        expected_version: 1,
      },
    )
    .await
    .unwrap();

  let all = store.list_workflows(false).await.unwrap();
  assert_eq!(all.len(), 2);

  let active_only = store.list_workflows(true).await.unwrap();
  assert_eq!(active_only.len(), 1);
  assert_eq!(active_only[0].workflow_id, active.workflow_id);
  assert_eq!(active_only[0].step_count, 0);
}
