use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use common::{
    JobInfo, TaskAssignmentRequest, TaskAssignmentResponse, TaskCompleteRequest,
    TaskCompleteResponse,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/job", get(get_job))
        .route("/api/v1/tasks/next", post(assign_task))
        .route("/api/v1/tasks/complete", post(complete_task))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/* ---------------- handlers HTTP ---------------- */

async fn health() -> &'static str {
    "ok"
}

// Estado agregado del job
async fn get_job(State(state): State<AppState>) -> Json<JobInfo> {
    Json(state.coordinator.job_info())
}

// Query: el worker pide trabajo
async fn assign_task(
    State(state): State<AppState>,
    Json(req): Json<TaskAssignmentRequest>,
) -> Json<TaskAssignmentResponse> {
    let assignment = state.coordinator.assign_task(&req.worker_id);
    Json(TaskAssignmentResponse { assignment })
}

// Report: el worker avisa que terminó (y commiteó) una tarea
async fn complete_task(
    State(state): State<AppState>,
    Json(req): Json<TaskCompleteRequest>,
) -> Json<TaskCompleteResponse> {
    let outcome = state
        .coordinator
        .report_task(&req.worker_id, req.kind, req.index, req.epoch);

    Json(TaskCompleteResponse {
        accepted: outcome.is_accepted(),
    })
}
