//! Webhook trigger gateway.
//!
//! HTTP entry point that turns provider webhooks into workflow runs. Each
//! endpoint authenticates the caller against the workflow's stored secret,
//! shapes the provider body into a namespaced initial context, then hands the
//! run to a background task and acknowledges immediately with `202 Accepted`.
//! Webhook providers time out quickly and retry on non-2xx, so the request
//! never waits on the run itself; run failures surface through logs and the
//! event channel, not the HTTP response.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use relayflow::executors::ExecutorRegistry;
//! use relayflow::events::StdOutPublisher;
//! use relayflow::gateway::{GatewayState, router};
//! use relayflow::journal::InMemoryJournal;
//! use relayflow::loader::InMemoryGraphLoader;
//! use relayflow::runner::Runner;
//!
//! # async fn serve() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = Arc::new(InMemoryGraphLoader::new());
//! let runner = Arc::new(Runner::new(
//!     Arc::new(ExecutorRegistry::with_defaults()),
//!     loader.clone(),
//!     Arc::new(InMemoryJournal::new()),
//!     Arc::new(StdOutPublisher),
//! ));
//!
//! let app = router(GatewayState::new(runner, loader));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8081").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod payloads;

pub use payloads::{GOOGLE_FORM_KEY, STRIPE_KEY, google_form_context, stripe_context};

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::context::ExecutionContext;
use crate::loader::{GraphLoader, LoaderError};
use crate::model::Workflow;
use crate::runner::{RunRequest, Runner};

/// Shared state behind every gateway route.
#[derive(Clone)]
pub struct GatewayState {
    runner: Arc<Runner>,
    loader: Arc<dyn GraphLoader>,
}

impl GatewayState {
    #[must_use]
    pub fn new(runner: Arc<Runner>, loader: Arc<dyn GraphLoader>) -> Self {
        Self { runner, loader }
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState").finish_non_exhaustive()
    }
}

/// Build the gateway router. Mount it as-is or nest it under a prefix.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhooks/google-form", post(google_form))
        .route("/webhooks/stripe", post(stripe))
        .with_state(state)
}

/// Query parameters common to every trigger endpoint.
///
/// Both are required; they are optional here only so absence maps to a clean
/// 400 instead of axum's built-in rejection.
#[derive(Debug, Deserialize)]
struct TriggerQuery {
    #[serde(rename = "workflowId")]
    workflow_id: Option<String>,
    secret: Option<String>,
}

/// Body of the `202 Accepted` acknowledgement.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accepted {
    pub job_id: String,
    pub workflow_id: String,
    pub status: &'static str,
}

/// Request-phase failures. Everything here happens before the run is
/// dispatched; once a request is accepted, run failures no longer affect the
/// HTTP response.
#[derive(Debug, Error, Diagnostic)]
pub enum GatewayError {
    #[error("missing required query parameter: {name}")]
    #[diagnostic(code(relayflow::gateway::missing_param))]
    MissingParam { name: &'static str },

    #[error("workflow doesn't exist: {workflow_id}")]
    #[diagnostic(code(relayflow::gateway::workflow_not_found))]
    WorkflowNotFound { workflow_id: String },

    /// Deliberately generic: the response must not reveal whether the
    /// workflow exists with a different secret or which check failed.
    #[error("unauthorized")]
    #[diagnostic(code(relayflow::gateway::unauthorized))]
    Unauthorized,

    #[error(transparent)]
    #[diagnostic(code(relayflow::gateway::loader))]
    Loader(#[from] LoaderError),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingParam { .. } => StatusCode::BAD_REQUEST,
            GatewayError::WorkflowNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Loader(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Loader failures stay opaque to the caller.
        let message = match &self {
            GatewayError::Loader(e) => {
                tracing::error!(error = %e, "gateway loader failure");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({"error": message}))).into_response()
    }
}

#[instrument(skip(state, body), fields(workflow_id = query.workflow_id.as_deref().unwrap_or("")))]
async fn google_form(
    State(state): State<GatewayState>,
    Query(query): Query<TriggerQuery>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Accepted>), GatewayError> {
    let workflow = authorize(&state, &query).await?;
    let context = google_form_context(&body);
    Ok(dispatch(&state, workflow, context))
}

#[instrument(skip(state, body), fields(workflow_id = query.workflow_id.as_deref().unwrap_or("")))]
async fn stripe(
    State(state): State<GatewayState>,
    Query(query): Query<TriggerQuery>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Accepted>), GatewayError> {
    let workflow = authorize(&state, &query).await?;
    let context = stripe_context(&body);
    Ok(dispatch(&state, workflow, context))
}

/// Validate query parameters and the shared secret, returning the workflow
/// the run will execute against.
async fn authorize(
    state: &GatewayState,
    query: &TriggerQuery,
) -> Result<Workflow, GatewayError> {
    let workflow_id = query
        .workflow_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(GatewayError::MissingParam { name: "workflowId" })?;
    let secret = query
        .secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(GatewayError::MissingParam { name: "secret" })?;

    let workflow = state
        .loader
        .load_workflow_with_graph(workflow_id)
        .await?
        .ok_or_else(|| GatewayError::WorkflowNotFound {
            workflow_id: workflow_id.to_string(),
        })?;

    if workflow.secret != secret {
        tracing::warn!(workflow_id = %workflow_id, "webhook secret mismatch");
        return Err(GatewayError::Unauthorized);
    }
    Ok(workflow)
}

/// Fire-and-forget: start the run on a background task and acknowledge.
fn dispatch(
    state: &GatewayState,
    workflow: Workflow,
    initial_context: ExecutionContext,
) -> (StatusCode, Json<Accepted>) {
    let job_id = Uuid::new_v4().to_string();
    let workflow_id = workflow.id;

    let runner = state.runner.clone();
    let request = RunRequest::new(workflow_id.clone())
        .with_job_id(job_id.clone())
        .with_initial_context(initial_context);
    tokio::spawn(async move {
        match runner.run(request).await {
            Ok(outcome) => tracing::info!(
                workflow_id = %outcome.workflow_id,
                "webhook-triggered run completed"
            ),
            Err(e) => tracing::error!(
                error = %e,
                retriable = e.is_retriable(),
                "webhook-triggered run failed"
            ),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(Accepted {
            job_id,
            workflow_id,
            status: "accepted",
        }),
    )
}
