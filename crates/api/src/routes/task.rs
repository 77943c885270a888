//! Route definitions for the `/tasks` resource.
//!
//! Tasks are created and listed under their project; everything keyed
//! by task ID lives here.

use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /{id}                            -> get_by_id
/// PUT    /{id}                            -> update
/// DELETE /{id}                            -> delete (whole subtree)
/// PUT    /{id}/progress                   -> update_progress
/// PUT    /{id}/dates                      -> update_dates
/// GET    /{id}/subtasks                   -> list_subtasks
///
/// GET    /{id}/dependencies               -> list_dependencies
/// POST   /{id}/dependencies               -> add_dependency
/// DELETE /{id}/dependencies/{dependency_id} -> remove_dependency
/// GET    /{id}/dependents                 -> list_dependents
///
/// GET    /{id}/comments                   -> list_comments
/// POST   /{id}/comments                   -> add_comment
/// DELETE /{id}/comments/{comment_id}      -> delete_comment
///
/// GET    /{id}/labels                     -> list_labels
/// PUT    /{id}/labels/{label_id}          -> attach_label
/// DELETE /{id}/labels/{label_id}          -> detach_label
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(task::get_by_id).put(task::update).delete(task::delete),
        )
        .route("/{id}/progress", put(task::update_progress))
        .route("/{id}/dates", put(task::update_dates))
        .route("/{id}/subtasks", get(task::list_subtasks))
        .route(
            "/{id}/dependencies",
            get(task::list_dependencies).post(task::add_dependency),
        )
        .route(
            "/{id}/dependencies/{dependency_id}",
            delete(task::remove_dependency),
        )
        .route("/{id}/dependents", get(task::list_dependents))
        .route(
            "/{id}/comments",
            get(task::list_comments).post(task::add_comment),
        )
        .route("/{id}/comments/{comment_id}", delete(task::delete_comment))
        .route("/{id}/labels", get(task::list_labels))
        .route(
            "/{id}/labels/{label_id}",
            put(task::attach_label).delete(task::detach_label),
        )
}
