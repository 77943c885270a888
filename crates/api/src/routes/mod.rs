pub mod approval;
pub mod auth;
pub mod health;
pub mod plan;
pub mod project;
pub mod resource;
pub mod task;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                 login (public)
/// /auth/register                              register (public)
/// /auth/refresh                               refresh (public)
/// /auth/logout                                logout
/// /auth/me                                    profile (GET, PUT)
/// /auth/change-password                       change password (POST)
///
/// /projects                                   list, create
/// /projects/{id}                              get, update, delete
/// /projects/{project_id}/members              list, add
/// /projects/{project_id}/members/{user_id}    change role, remove
/// /projects/{project_id}/milestones           list, create
/// /projects/{project_id}/milestones/{id}      update, delete
/// /projects/{project_id}/labels               list, create
/// /projects/{project_id}/labels/{id}          update, delete
/// /projects/{project_id}/tasks                list, create
/// /projects/{project_id}/risks                list, create
/// /projects/{project_id}/risks/stats          per-level counts
/// /projects/{project_id}/risks/{id}           get, update, delete
/// /projects/{project_id}/risks/{id}/responses list, add
/// /projects/{project_id}/issues               list, create
/// /projects/{project_id}/issues/stats         per-status counts
/// /projects/{project_id}/issues/{id}          get, update, delete
/// /projects/{project_id}/issues/{id}/comments list, add
/// /projects/{project_id}/plans                list, create
/// /projects/{project_id}/utilization          member workloads
///
/// /tasks/{id}                                 get, update, delete (subtree)
/// /tasks/{id}/progress                        set progress (strict range)
/// /tasks/{id}/dates                           move date range
/// /tasks/{id}/subtasks                        list
/// /tasks/{id}/dependencies                    list, add
/// /tasks/{id}/dependencies/{dependency_id}    remove
/// /tasks/{id}/dependents                      list
/// /tasks/{id}/comments                        list, add
/// /tasks/{id}/comments/{comment_id}           delete (author only)
/// /tasks/{id}/labels                          list
/// /tasks/{id}/labels/{label_id}               attach (PUT), detach (DELETE)
///
/// /plans/{id}                                 get, update, delete
/// /plans/{plan_id}/wbs                        list, create
/// /plans/{plan_id}/milestones                 list, create
/// /plans/{plan_id}/milestones/{id}            update, delete
/// /wbs/{id}                                   update, delete (subtree)
///
/// /approvals                                  submit
/// /approvals/types                            valid approval types
/// /approvals/my                               submitted by me
/// /approvals/pending                          awaiting my decision
/// /approvals/processed                        decided by me
/// /approvals/stats                            per-status counts
/// /approvals/{id}                             detail with flow nodes
/// /approvals/{id}/approve                     approve current node
/// /approvals/{id}/reject                      reject (comment required)
/// /approvals/{id}/cancel                      cancel (applicant only)
///
/// /resources                                  user directory
/// /resources/{id}                             projects and task summary
/// /resources/{id}/workload                    workload score
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/plans", plan::router())
        .nest("/wbs", plan::wbs_router())
        .nest("/approvals", approval::router())
        .nest("/resources", resource::router())
}
