//! Route definitions for the `/resources` views.

use axum::routing::get;
use axum::Router;

use crate::handlers::resource;
use crate::state::AppState;

/// Routes mounted at `/resources`.
///
/// ```text
/// GET /               -> list (?role, is_active, limit, offset)
/// GET /{id}           -> get_by_id
/// GET /{id}/workload  -> workload
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(resource::list))
        .route("/{id}", get(resource::get_by_id))
        .route("/{id}/workload", get(resource::workload))
}
