use std::collections::HashMap;
use std::path::Path;

use caseflow_workflow::{Step, StepSpec, Transition, TransitionSpec, Workflow, normalize_step_name};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::types::{StepRow, TransitionRow, WorkflowRow};
use crate::{PositionUpdate, Store, StoreError, WorkflowSummary, WorkflowUpdate};

/// SQLite-based store implementation.
#[derive(Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  /// Create a new SQLite store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (creating if missing) a database file and return a store over it.
  pub async fn connect(path: &Path) -> Result<Self, StoreError> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true)
      .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(Self::new(pool))
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await
  }

  async fn workflow_row(&self, workflow_id: &str) -> Result<WorkflowRow, StoreError> {
    sqlx::query_as::<_, WorkflowRow>(
      r#"
            SELECT workflow_id, name, description, is_active, is_default, version
            FROM workflows
            WHERE workflow_id = ?
            "#,
    )
    .bind(workflow_id)
    .fetch_optional(&self.pool)
    .await?
    .ok_or_else(|| StoreError::WorkflowNotFound(workflow_id.to_string()))
  }

  async fn load_aggregate(&self, row: WorkflowRow) -> Result<Workflow, StoreError> {
    let steps: Vec<StepRow> = sqlx::query_as(
      r#"
            SELECT step_id, name, display_name, description, step_type, color,
                   allowed_roles, required_fields, auto_assign, notify_roles,
                   notify_client, position_x, position_y
            FROM workflow_steps
            WHERE workflow_id = ?
            ORDER BY rowid
            "#,
    )
    .bind(&row.workflow_id)
    .fetch_all(&self.pool)
    .await?;

    let transitions: Vec<TransitionRow> = sqlx::query_as(
      r#"
            SELECT transition_id, from_step_id, to_step_id, name, description,
                   requires_invoice_raised, requires_invoice_paid, requires_assignment,
                   allowed_roles, send_notification, notification_template
            FROM workflow_transitions
            WHERE workflow_id = ?
            ORDER BY rowid
            "#,
    )
    .bind(&row.workflow_id)
    .fetch_all(&self.pool)
    .await?;

    let service_count: i64 =
      sqlx::query_scalar("SELECT COUNT(*) FROM service_bindings WHERE workflow_id = ?")
        .bind(&row.workflow_id)
        .fetch_one(&self.pool)
        .await?;

    Ok(Workflow {
      workflow_id: row.workflow_id,
      name: row.name,
      description: row.description,
      is_active: row.is_active,
      is_default: row.is_default,
      version: row.version,
      service_count,
      steps: steps.into_iter().map(Step::from).collect(),
      transitions: transitions.into_iter().map(Transition::from).collect(),
    })
  }
}

async fn workflow_row_tx(
  tx: &mut Transaction<'_, Sqlite>,
  workflow_id: &str,
) -> Result<WorkflowRow, StoreError> {
  sqlx::query_as::<_, WorkflowRow>(
    r#"
        SELECT workflow_id, name, description, is_active, is_default, version
        FROM workflows
        WHERE workflow_id = ?
        "#,
  )
  .bind(workflow_id)
  .fetch_optional(&mut **tx)
  .await?
  .ok_or_else(|| StoreError::WorkflowNotFound(workflow_id.to_string()))
}

/// Bump a workflow's version inside a structural mutation's transaction.
async fn bump_version(
  tx: &mut Transaction<'_, Sqlite>,
  workflow_id: &str,
) -> Result<(), StoreError> {
  let result = sqlx::query(
    r#"
        UPDATE workflows
        SET version = version + 1, updated_at = ?
        WHERE workflow_id = ?
        "#,
  )
  .bind(Utc::now())
  .bind(workflow_id)
  .execute(&mut **tx)
  .await?;

  if result.rows_affected() == 0 {
    return Err(StoreError::WorkflowNotFound(workflow_id.to_string()));
  }
  Ok(())
}

/// Enforce the per-workflow step name uniqueness invariant. `exclude_step_id`
/// is empty when inserting; step ids are uuids so the empty id matches
/// nothing.
async fn ensure_step_name_free(
  tx: &mut Transaction<'_, Sqlite>,
  workflow_id: &str,
  name: &str,
  exclude_step_id: &str,
) -> Result<(), StoreError> {
  let count: i64 = sqlx::query_scalar(
    r#"
        SELECT COUNT(*) FROM workflow_steps
        WHERE workflow_id = ? AND name = ? AND step_id <> ?
        "#,
  )
  .bind(workflow_id)
  .bind(name)
  .bind(exclude_step_id)
  .fetch_one(&mut **tx)
  .await?;

  if count > 0 {
    return Err(StoreError::DuplicateStepName {
      name: name.to_string(),
    });
  }
  Ok(())
}

async fn ensure_step_exists(
  tx: &mut Transaction<'_, Sqlite>,
  workflow_id: &str,
  step_id: &str,
) -> Result<(), StoreError> {
  let count: i64 = sqlx::query_scalar(
    "SELECT COUNT(*) FROM workflow_steps WHERE workflow_id = ? AND step_id = ?",
  )
  .bind(workflow_id)
  .bind(step_id)
  .fetch_one(&mut **tx)
  .await?;

  if count == 0 {
    return Err(StoreError::UnknownStep(step_id.to_string()));
  }
  Ok(())
}

async fn insert_step_record(
  tx: &mut Transaction<'_, Sqlite>,
  workflow_id: &str,
  step: &Step,
) -> Result<(), StoreError> {
  sqlx::query(
        r#"
        INSERT INTO workflow_steps (step_id, workflow_id, name, display_name, description,
                                    step_type, color, allowed_roles, required_fields,
                                    auto_assign, notify_roles, notify_client, position_x, position_y)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&step.step_id)
    .bind(workflow_id)
    .bind(&step.name)
    .bind(&step.display_name)
    .bind(&step.description)
    .bind(Json(step.step_type))
    .bind(Json(step.color))
    .bind(Json(&step.allowed_roles))
    .bind(Json(&step.required_fields))
    .bind(step.auto_assign)
    .bind(Json(&step.notify_roles))
    .bind(step.notify_client)
    .bind(step.position_x)
    .bind(step.position_y)
    .execute(&mut **tx)
    .await?;

  Ok(())
}

async fn insert_transition_record(
  tx: &mut Transaction<'_, Sqlite>,
  workflow_id: &str,
  transition: &Transition,
) -> Result<(), StoreError> {
  sqlx::query(
        r#"
        INSERT INTO workflow_transitions (transition_id, workflow_id, from_step_id, to_step_id,
                                          name, description, requires_invoice_raised,
                                          requires_invoice_paid, requires_assignment,
                                          allowed_roles, send_notification, notification_template)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&transition.transition_id)
    .bind(workflow_id)
    .bind(&transition.from_step_id)
    .bind(&transition.to_step_id)
    .bind(&transition.name)
    .bind(&transition.description)
    .bind(transition.requires_invoice_raised)
    .bind(transition.requires_invoice_paid)
    .bind(transition.requires_assignment)
    .bind(Json(&transition.allowed_roles))
    .bind(transition.send_notification)
    .bind(&transition.notification_template)
    .execute(&mut **tx)
    .await?;

  Ok(())
}

impl Store for SqliteStore {
  type Error = StoreError;

  async fn list_workflows(&self, active_only: bool) -> Result<Vec<WorkflowSummary>, StoreError> {
    let summaries = sqlx::query_as::<_, WorkflowSummary>(
            r#"
            SELECT w.workflow_id, w.name, w.description, w.is_active, w.is_default, w.version,
                   (SELECT COUNT(*) FROM workflow_steps s WHERE s.workflow_id = w.workflow_id) AS step_count,
                   (SELECT COUNT(*) FROM workflow_transitions t WHERE t.workflow_id = w.workflow_id) AS transition_count,
                   (SELECT COUNT(*) FROM service_bindings b WHERE b.workflow_id = w.workflow_id) AS service_count,
                   w.created_at, w.updated_at
            FROM workflows w
            WHERE ? = 0 OR w.is_active = 1
            ORDER BY w.name
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

    Ok(summaries)
  }

  async fn get_workflow(&self, workflow_id: &str) -> Result<Workflow, StoreError> {
    let row = self.workflow_row(workflow_id).await?;
    self.load_aggregate(row).await
  }

  #[instrument(name = "workflow_create", skip(self, description))]
  async fn create_workflow(&self, name: &str, description: &str) -> Result<Workflow, StoreError> {
    let workflow_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
      r#"
            INSERT INTO workflows (workflow_id, name, description, is_active, is_default,
                                   version, created_at, updated_at)
            VALUES (?, ?, ?, 1, 0, 1, ?, ?)
            "#,
    )
    .bind(&workflow_id)
    .bind(name)
    .bind(description)
    .bind(now)
    .bind(now)
    .execute(&self.pool)
    .await?;

    info!(workflow_id = %workflow_id, "workflow_created");

    Ok(Workflow {
      workflow_id,
      name: name.to_string(),
      description: description.to_string(),
      is_active: true,
      is_default: false,
      version: 1,
      service_count: 0,
      steps: Vec::new(),
      transitions: Vec::new(),
    })
  }

  async fn update_workflow(
    &self,
    workflow_id: &str,
    update: &WorkflowUpdate,
  ) -> Result<Workflow, StoreError> {
    let mut tx = self.pool.begin().await?;

    let row = workflow_row_tx(&mut tx, workflow_id).await?;
    if row.version != update.expected_version {
      return Err(StoreError::VersionConflict {
        expected: update.expected_version,
        actual: row.version,
      });
    }
    if row.is_default && !update.is_active {
      return Err(StoreError::DefaultWorkflowProtected);
    }

    sqlx::query(
      r#"
            UPDATE workflows
            SET name = ?, description = ?, is_active = ?, version = version + 1, updated_at = ?
            WHERE workflow_id = ?
            "#,
    )
    .bind(&update.name)
    .bind(&update.description)
    .bind(update.is_active)
    .bind(Utc::now())
    .bind(workflow_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    self.get_workflow(workflow_id).await
  }

  #[instrument(name = "workflow_delete", skip(self))]
  async fn delete_workflow(&self, workflow_id: &str) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await?;

    let row = workflow_row_tx(&mut tx, workflow_id).await?;
    if row.is_default {
      return Err(StoreError::DefaultWorkflowProtected);
    }

    sqlx::query("DELETE FROM service_bindings WHERE workflow_id = ?")
      .bind(workflow_id)
      .execute(&mut *tx)
      .await?;
    sqlx::query("DELETE FROM workflow_transitions WHERE workflow_id = ?")
      .bind(workflow_id)
      .execute(&mut *tx)
      .await?;
    sqlx::query("DELETE FROM workflow_steps WHERE workflow_id = ?")
      .bind(workflow_id)
      .execute(&mut *tx)
      .await?;
    sqlx::query("DELETE FROM workflows WHERE workflow_id = ?")
      .bind(workflow_id)
      .execute(&mut *tx)
      .await?;

    tx.commit().await?;

    info!(workflow_id = %workflow_id, "workflow_deleted");
    Ok(())
  }

  #[instrument(name = "workflow_set_default", skip(self))]
  async fn set_default(&self, workflow_id: &str) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await?;

    workflow_row_tx(&mut tx, workflow_id).await?;

    sqlx::query("UPDATE workflows SET is_default = 0 WHERE is_default = 1")
      .execute(&mut *tx)
      .await?;
    sqlx::query("UPDATE workflows SET is_default = 1, updated_at = ? WHERE workflow_id = ?")
      .bind(Utc::now())
      .bind(workflow_id)
      .execute(&mut *tx)
      .await?;

    tx.commit().await?;

    info!(workflow_id = %workflow_id, "workflow_set_default");
    Ok(())
  }

  #[instrument(name = "workflow_duplicate", skip(self))]
  async fn duplicate_workflow(
    &self,
    workflow_id: &str,
    new_name: &str,
  ) -> Result<Workflow, StoreError> {
    let mut tx = self.pool.begin().await?;

    let source = workflow_row_tx(&mut tx, workflow_id).await?;

    let steps: Vec<StepRow> = sqlx::query_as(
      r#"
            SELECT step_id, name, display_name, description, step_type, color,
                   allowed_roles, required_fields, auto_assign, notify_roles,
                   notify_client, position_x, position_y
            FROM workflow_steps
            WHERE workflow_id = ?
            ORDER BY rowid
            "#,
    )
    .bind(workflow_id)
    .fetch_all(&mut *tx)
    .await?;

    let transitions: Vec<TransitionRow> = sqlx::query_as(
      r#"
            SELECT transition_id, from_step_id, to_step_id, name, description,
                   requires_invoice_raised, requires_invoice_paid, requires_assignment,
                   allowed_roles, send_notification, notification_template
            FROM workflow_transitions
            WHERE workflow_id = ?
            ORDER BY rowid
            "#,
    )
    .bind(workflow_id)
    .fetch_all(&mut *tx)
    .await?;

    let copy_id = Uuid::new_v4().to_string();
    let now = Utc::now();
    sqlx::query(
      r#"
            INSERT INTO workflows (workflow_id, name, description, is_active, is_default,
                                   version, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, 1, ?, ?)
            "#,
    )
    .bind(&copy_id)
    .bind(new_name)
    .bind(&source.description)
    .bind(source.is_active)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let mut id_map = HashMap::with_capacity(steps.len());
    for row in steps {
      let mut step = Step::from(row);
      let new_id = Uuid::new_v4().to_string();
      id_map.insert(step.step_id.clone(), new_id.clone());
      step.step_id = new_id;
      insert_step_record(&mut tx, &copy_id, &step).await?;
    }

    for row in transitions {
      let mut transition = Transition::from(row);
      let (Some(from), Some(to)) = (
        id_map.get(&transition.from_step_id),
        id_map.get(&transition.to_step_id),
      ) else {
        continue;
      };
      transition.from_step_id = from.clone();
      transition.to_step_id = to.clone();
      transition.transition_id = Uuid::new_v4().to_string();
      insert_transition_record(&mut tx, &copy_id, &transition).await?;
    }

    tx.commit().await?;

    info!(source_id = %workflow_id, copy_id = %copy_id, "workflow_duplicated");

    self.get_workflow(&copy_id).await
  }

  async fn insert_step(&self, workflow_id: &str, spec: StepSpec) -> Result<Step, StoreError> {
    let mut tx = self.pool.begin().await?;

    workflow_row_tx(&mut tx, workflow_id).await?;

    let step = Step::from_spec(Uuid::new_v4().to_string(), spec);
    ensure_step_name_free(&mut tx, workflow_id, &step.name, "").await?;
    insert_step_record(&mut tx, workflow_id, &step).await?;
    bump_version(&mut tx, workflow_id).await?;

    tx.commit().await?;

    Ok(step)
  }

  async fn update_step(
    &self,
    workflow_id: &str,
    step_id: &str,
    spec: StepSpec,
  ) -> Result<Step, StoreError> {
    let mut tx = self.pool.begin().await?;

    let count: i64 = sqlx::query_scalar(
      "SELECT COUNT(*) FROM workflow_steps WHERE workflow_id = ? AND step_id = ?",
    )
    .bind(workflow_id)
    .bind(step_id)
    .fetch_one(&mut *tx)
    .await?;
    if count == 0 {
      return Err(StoreError::StepNotFound(step_id.to_string()));
    }

    let name = normalize_step_name(&spec.name);
    ensure_step_name_free(&mut tx, workflow_id, &name, step_id).await?;

    let step = Step::from_spec(step_id.to_string(), spec);
    sqlx::query(
      r#"
            UPDATE workflow_steps
            SET name = ?, display_name = ?, description = ?, step_type = ?, color = ?,
                allowed_roles = ?, required_fields = ?, auto_assign = ?, notify_roles = ?,
                notify_client = ?, position_x = ?, position_y = ?
            WHERE workflow_id = ? AND step_id = ?
            "#,
    )
    .bind(&step.name)
    .bind(&step.display_name)
    .bind(&step.description)
    .bind(Json(step.step_type))
    .bind(Json(step.color))
    .bind(Json(&step.allowed_roles))
    .bind(Json(&step.required_fields))
    .bind(step.auto_assign)
    .bind(Json(&step.notify_roles))
    .bind(step.notify_client)
    .bind(step.position_x)
    .bind(step.position_y)
    .bind(workflow_id)
    .bind(step_id)
    .execute(&mut *tx)
    .await?;

    bump_version(&mut tx, workflow_id).await?;
    tx.commit().await?;

    Ok(step)
  }

  #[instrument(name = "step_delete", skip(self))]
  async fn delete_step(&self, workflow_id: &str, step_id: &str) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await?;

    let cascaded = sqlx::query(
      r#"
            DELETE FROM workflow_transitions
            WHERE workflow_id = ? AND (from_step_id = ? OR to_step_id = ?)
            "#,
    )
    .bind(workflow_id)
    .bind(step_id)
    .bind(step_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let deleted = sqlx::query("DELETE FROM workflow_steps WHERE workflow_id = ? AND step_id = ?")
      .bind(workflow_id)
      .bind(step_id)
      .execute(&mut *tx)
      .await?
      .rows_affected();
    if deleted == 0 {
      return Err(StoreError::StepNotFound(step_id.to_string()));
    }

    bump_version(&mut tx, workflow_id).await?;
    tx.commit().await?;

    info!(
      workflow_id = %workflow_id,
      step_id = %step_id,
      cascaded_transitions = cascaded,
      "step_deleted"
    );
    Ok(())
  }

  async fn update_step_positions(
    &self,
    workflow_id: &str,
    updates: &[PositionUpdate],
  ) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await?;

    for update in updates {
      let result = sqlx::query(
        r#"
                UPDATE workflow_steps
                SET position_x = ?, position_y = ?
                WHERE workflow_id = ? AND step_id = ?
                "#,
      )
      .bind(update.x)
      .bind(update.y)
      .bind(workflow_id)
      .bind(&update.step_id)
      .execute(&mut *tx)
      .await?;

      if result.rows_affected() == 0 {
        return Err(StoreError::StepNotFound(update.step_id.clone()));
      }
    }

    tx.commit().await?;
    Ok(())
  }

  async fn insert_transition(
    &self,
    workflow_id: &str,
    spec: TransitionSpec,
  ) -> Result<Transition, StoreError> {
    let mut tx = self.pool.begin().await?;

    workflow_row_tx(&mut tx, workflow_id).await?;
    ensure_step_exists(&mut tx, workflow_id, &spec.from_step_id).await?;
    ensure_step_exists(&mut tx, workflow_id, &spec.to_step_id).await?;

    let transition = Transition::from_spec(Uuid::new_v4().to_string(), spec);
    insert_transition_record(&mut tx, workflow_id, &transition).await?;
    bump_version(&mut tx, workflow_id).await?;

    tx.commit().await?;

    Ok(transition)
  }

  async fn update_transition(
    &self,
    workflow_id: &str,
    transition_id: &str,
    spec: TransitionSpec,
  ) -> Result<Transition, StoreError> {
    let mut tx = self.pool.begin().await?;

    let count: i64 = sqlx::query_scalar(
      "SELECT COUNT(*) FROM workflow_transitions WHERE workflow_id = ? AND transition_id = ?",
    )
    .bind(workflow_id)
    .bind(transition_id)
    .fetch_one(&mut *tx)
    .await?;
    if count == 0 {
      return Err(StoreError::TransitionNotFound(transition_id.to_string()));
    }

    ensure_step_exists(&mut tx, workflow_id, &spec.from_step_id).await?;
    ensure_step_exists(&mut tx, workflow_id, &spec.to_step_id).await?;

    let transition = Transition::from_spec(transition_id.to_string(), spec);
    sqlx::query(
      r#"
            UPDATE workflow_transitions
            SET from_step_id = ?, to_step_id = ?, name = ?, description = ?,
                requires_invoice_raised = ?, requires_invoice_paid = ?, requires_assignment = ?,
                allowed_roles = ?, send_notification = ?, notification_template = ?
            WHERE workflow_id = ? AND transition_id = ?
            "#,
    )
    .bind(&transition.from_step_id)
    .bind(&transition.to_step_id)
    .bind(&transition.name)
    .bind(&transition.description)
    .bind(transition.requires_invoice_raised)
    .bind(transition.requires_invoice_paid)
    .bind(transition.requires_assignment)
    .bind(Json(&transition.allowed_roles))
    .bind(transition.send_notification)
    .bind(&transition.notification_template)
    .bind(workflow_id)
    .bind(transition_id)
    .execute(&mut *tx)
    .await?;

    bump_version(&mut tx, workflow_id).await?;
    tx.commit().await?;

    Ok(transition)
  }

  async fn delete_transition(
    &self,
    workflow_id: &str,
    transition_id: &str,
  ) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await?;

    let deleted = sqlx::query(
      "DELETE FROM workflow_transitions WHERE workflow_id = ? AND transition_id = ?",
    )
    .bind(workflow_id)
    .bind(transition_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if deleted == 0 {
      return Err(StoreError::TransitionNotFound(transition_id.to_string()));
    }

    bump_version(&mut tx, workflow_id).await?;
    tx.commit().await?;

    Ok(())
  }

  #[instrument(name = "service_bind", skip(self))]
  async fn bind_service(&self, workflow_id: &str, service_id: &str) -> Result<(), StoreError> {
    let mut tx = self.pool.begin().await?;

    let row = workflow_row_tx(&mut tx, workflow_id).await?;
    if !row.is_active {
      return Err(StoreError::WorkflowInactive(workflow_id.to_string()));
    }

    sqlx::query(
      r#"
            INSERT INTO service_bindings (service_id, workflow_id, bound_at)
            VALUES (?, ?, ?)
            ON CONFLICT (service_id) DO UPDATE
            SET workflow_id = excluded.workflow_id, bound_at = excluded.bound_at
            "#,
    )
    .bind(service_id)
    .bind(workflow_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
  }

  async fn release_service(&self, service_id: &str) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM service_bindings WHERE service_id = ?")
      .bind(service_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}
