//! Route definitions for the `/projects` resource.
//!
//! Also nests member, milestone, label, risk, issue, and plan routes
//! under `/projects/{project_id}/...`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{issue, label, plan, project, resource, risk, task};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                   -> list
/// POST   /                                   -> create
/// GET    /{id}                               -> get_by_id
/// PUT    /{id}                               -> update
/// DELETE /{id}                               -> delete
///
/// GET    /{project_id}/members               -> list_members
/// POST   /{project_id}/members               -> add_member
/// PUT    /{project_id}/members/{user_id}     -> update_member_role
/// DELETE /{project_id}/members/{user_id}     -> remove_member
///
/// GET    /{project_id}/milestones            -> list_milestones
/// POST   /{project_id}/milestones            -> create_milestone
/// PUT    /{project_id}/milestones/{id}       -> update_milestone
/// DELETE /{project_id}/milestones/{id}       -> delete_milestone
///
/// GET    /{project_id}/labels                -> list
/// POST   /{project_id}/labels                -> create
/// PUT    /{project_id}/labels/{id}           -> update
/// DELETE /{project_id}/labels/{id}           -> delete
///
/// GET    /{project_id}/risks                 -> list
/// POST   /{project_id}/risks                 -> create
/// GET    /{project_id}/risks/stats           -> stats
/// GET    /{project_id}/risks/{id}            -> get_by_id
/// PUT    /{project_id}/risks/{id}            -> update
/// DELETE /{project_id}/risks/{id}            -> delete
/// GET    /{project_id}/risks/{id}/responses  -> list_responses
/// POST   /{project_id}/risks/{id}/responses  -> add_response
///
/// GET    /{project_id}/issues                -> list
/// POST   /{project_id}/issues                -> create
/// GET    /{project_id}/issues/stats          -> stats
/// GET    /{project_id}/issues/{id}           -> get_by_id
/// PUT    /{project_id}/issues/{id}           -> update
/// DELETE /{project_id}/issues/{id}           -> delete
/// GET    /{project_id}/issues/{id}/comments  -> list_comments
/// POST   /{project_id}/issues/{id}/comments  -> add_comment
///
/// GET    /{project_id}/tasks                 -> list
/// POST   /{project_id}/tasks                 -> create
///
/// GET    /{project_id}/plans                 -> list
/// POST   /{project_id}/plans                 -> create
///
/// GET    /{project_id}/utilization           -> project_utilization
/// ```
pub fn router() -> Router<AppState> {
    let member_routes = Router::new()
        .route("/", get(project::list_members).post(project::add_member))
        .route(
            "/{user_id}",
            axum::routing::put(project::update_member_role).delete(project::remove_member),
        );

    let milestone_routes = Router::new()
        .route(
            "/",
            get(project::list_milestones).post(project::create_milestone),
        )
        .route(
            "/{id}",
            axum::routing::put(project::update_milestone).delete(project::delete_milestone),
        );

    let label_routes = Router::new()
        .route("/", get(label::list).post(label::create))
        .route(
            "/{id}",
            axum::routing::put(label::update).delete(label::delete),
        );

    let risk_routes = Router::new()
        .route("/", get(risk::list).post(risk::create))
        .route("/stats", get(risk::stats))
        .route(
            "/{id}",
            get(risk::get_by_id).put(risk::update).delete(risk::delete),
        )
        .route(
            "/{id}/responses",
            get(risk::list_responses).post(risk::add_response),
        );

    let issue_routes = Router::new()
        .route("/", get(issue::list).post(issue::create))
        .route("/stats", get(issue::stats))
        .route(
            "/{id}",
            get(issue::get_by_id)
                .put(issue::update)
                .delete(issue::delete),
        )
        .route(
            "/{id}/comments",
            get(issue::list_comments).post(issue::add_comment),
        );

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/{project_id}/members", member_routes)
        .nest("/{project_id}/milestones", milestone_routes)
        .nest("/{project_id}/labels", label_routes)
        .nest("/{project_id}/risks", risk_routes)
        .nest("/{project_id}/issues", issue_routes)
        .route("/{project_id}/tasks", get(task::list).post(task::create))
        .route("/{project_id}/plans", get(plan::list).post(plan::create))
        .route(
            "/{project_id}/utilization",
            get(resource::project_utilization),
        )
}
