//! Route definitions for the `/approvals` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::approval;
use crate::state::AppState;

/// Routes mounted at `/approvals`.
///
/// ```text
/// POST /               -> create
/// GET  /types          -> types
/// GET  /my             -> list_submitted (?status, approval_type, keyword)
/// GET  /pending        -> list_awaiting
/// GET  /processed      -> list_handled
/// GET  /stats          -> stats
/// GET  /{id}           -> get_by_id
/// POST /{id}/approve   -> approve
/// POST /{id}/reject    -> reject (comment required)
/// POST /{id}/cancel    -> cancel (applicant only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(approval::create))
        .route("/types", get(approval::types))
        .route("/my", get(approval::list_submitted))
        .route("/pending", get(approval::list_awaiting))
        .route("/processed", get(approval::list_handled))
        .route("/stats", get(approval::stats))
        .route("/{id}", get(approval::get_by_id))
        .route("/{id}/approve", post(approval::approve))
        .route("/{id}/reject", post(approval::reject))
        .route("/{id}/cancel", post(approval::cancel))
}
