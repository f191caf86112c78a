//! Caseflow Server
//!
//! The REST surface over the workflow store. Routes mirror what the
//! editor client calls: workflow lifecycle (list, create, update, delete,
//! duplicate, validate) and step/transition editing scoped to a workflow,
//! including the canvas's batch position writes.
//!
//! Role checks belong to the collaborating backend that fronts this
//! service; nothing here inspects the caller.

mod error;
mod payload;
mod steps;
mod transitions;
mod workflows;

pub use error::{ApiError, ApiErrorCode};
pub use payload::ValidateResponse;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{delete, get, post, put};
use caseflow_store::SqliteStore;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
  pub store: SqliteStore,
}

/// Build the API router over a store.
pub fn router(store: SqliteStore) -> Router {
  let state = AppState { store };

  Router::new()
    .route(
      "/api/workflows",
      get(workflows::list_workflows).post(workflows::create_workflow),
    )
    .route(
      "/api/workflows/{id}",
      get(workflows::get_workflow)
        .put(workflows::update_workflow)
        .delete(workflows::delete_workflow),
    )
    .route(
      "/api/workflows/{id}/duplicate",
      post(workflows::duplicate_workflow),
    )
    .route(
      "/api/workflows/{id}/default",
      post(workflows::set_default_workflow),
    )
    .route(
      "/api/workflows/{id}/validate",
      get(workflows::validate_workflow),
    )
    .route("/api/workflows/{id}/steps", post(steps::create_step))
    .route(
      "/api/workflows/{id}/steps/positions",
      put(steps::update_step_positions),
    )
    .route(
      "/api/workflows/{id}/steps/{step_id}",
      put(steps::update_step).delete(steps::delete_step),
    )
    .route(
      "/api/workflows/{id}/transitions",
      post(transitions::create_transition),
    )
    .route(
      "/api/workflows/{id}/transitions/{transition_id}",
      put(transitions::update_transition).delete(transitions::delete_transition),
    )
    .route("/api/workflows/{id}/services", post(workflows::bind_service))
    .route(
      "/api/services/{service_id}",
      delete(workflows::release_service),
    )
    .with_state(state)
}

/// Bind and serve the API until the token is cancelled.
pub async fn serve(
  store: SqliteStore,
  addr: SocketAddr,
  cancel: CancellationToken,
) -> std::io::Result<()> {
  let app = router(store);
  let listener = tokio::net::TcpListener::bind(addr).await?;

  info!(addr = %addr, "listening");

  axum::serve(listener, app)
    .with_graceful_shutdown(async move { cancel.cancelled().await })
    .await
}
