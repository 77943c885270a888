//! Route definitions for plans, WBS tasks, and plan milestones.
//!
//! Plans are created and listed under their project; plan-keyed and
//! WBS-keyed routes live here.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::plan;
use crate::state::AppState;

/// Routes mounted at `/plans`.
///
/// ```text
/// GET    /{id}                       -> get_by_id
/// PUT    /{id}                       -> update
/// DELETE /{id}                       -> delete
///
/// GET    /{plan_id}/wbs              -> list_wbs_tasks
/// POST   /{plan_id}/wbs              -> create_wbs_task
///
/// GET    /{plan_id}/milestones       -> list_milestones
/// POST   /{plan_id}/milestones       -> create_milestone
/// PUT    /{plan_id}/milestones/{id}  -> update_milestone
/// DELETE /{plan_id}/milestones/{id}  -> delete_milestone
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(plan::get_by_id).put(plan::update).delete(plan::delete),
        )
        .route(
            "/{plan_id}/wbs",
            get(plan::list_wbs_tasks).post(plan::create_wbs_task),
        )
        .route(
            "/{plan_id}/milestones",
            get(plan::list_milestones).post(plan::create_milestone),
        )
        .route(
            "/{plan_id}/milestones/{id}",
            put(plan::update_milestone).delete(plan::delete_milestone),
        )
}

/// Routes mounted at `/wbs`.
///
/// ```text
/// PUT    /{id}  -> update_wbs_task
/// DELETE /{id}  -> delete_wbs_task (whole subtree)
/// ```
pub fn wbs_router() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        put(plan::update_wbs_task).delete(plan::delete_wbs_task),
    )
}
