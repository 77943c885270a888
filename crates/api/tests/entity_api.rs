//! End-to-end tests for project, membership, task, and approval flows.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, create_project, register_and_login, send};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn project_creator_becomes_admin_member(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (user_id, token, _) = register_and_login(&app, "alice", "member").await;

    let project_id = create_project(&app, &token, "core", "Core Platform").await;

    let response = send(
        &app,
        Method::GET,
        &format!("/api/v1/projects/{project_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;

    // Keys are stored upper-case; the caller sees their own role.
    assert_eq!(detail["key"], "CORE");
    assert_eq!(detail["my_role"], "admin");
    assert_eq!(detail["stats"]["member_count"], 1);

    let response = send(
        &app,
        Method::GET,
        &format!("/api/v1/projects/{project_id}/members"),
        Some(&token),
        None,
    )
    .await;
    let members = body_json(response).await;
    assert_eq!(members.as_array().unwrap().len(), 1);
    assert_eq!(members[0]["user_id"], user_id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_member_cannot_access_a_project(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner_token, _) = register_and_login(&app, "alice", "member").await;
    let (_, outsider_token, _) = register_and_login(&app, "mallory", "member").await;

    let project_id = create_project(&app, &owner_token, "sec", "Secret").await;

    let response = send(
        &app,
        Method::GET,
        &format!("/api/v1/projects/{project_id}"),
        Some(&outsider_token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn viewer_cannot_update_the_project(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, owner_token, _) = register_and_login(&app, "alice", "member").await;
    let (viewer_id, viewer_token, _) = register_and_login(&app, "victor", "member").await;

    let project_id = create_project(&app, &owner_token, "ops", "Operations").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/projects/{project_id}/members"),
        Some(&owner_token),
        Some(json!({ "user_id": viewer_id, "role": "viewer" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/v1/projects/{project_id}"),
        Some(&viewer_token),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn last_admin_cannot_be_removed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin_id, token, _) = register_and_login(&app, "alice", "member").await;
    let project_id = create_project(&app, &token, "solo", "Solo").await;

    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/projects/{project_id}/members/{admin_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_project_key_returns_conflict(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token, _) = register_and_login(&app, "alice", "member").await;
    create_project(&app, &token, "dup", "First").await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/projects",
        Some(&token),
        Some(json!({ "key": "DUP", "name": "Second" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn task_reaching_full_progress_is_marked_done(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token, _) = register_and_login(&app, "alice", "member").await;
    let project_id = create_project(&app, &token, "dev", "Development").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/projects/{project_id}/tasks"),
        Some(&token),
        Some(json!({ "title": "Write the parser" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let task = body_json(response).await;
    let task_id = task["id"].as_i64().unwrap();
    assert_eq!(task["status"], "todo");
    assert_eq!(task["progress"], 0);

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/v1/tasks/{task_id}"),
        Some(&token),
        Some(json!({ "progress": 100 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await;
    assert_eq!(task["status"], "done");
    assert_eq!(task["progress"], 100);
    assert!(task["completed_at"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn completed_task_can_be_archived(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token, _) = register_and_login(&app, "alice", "member").await;
    let project_id = create_project(&app, &token, "arc", "Archive").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/projects/{project_id}/tasks"),
        Some(&token),
        Some(json!({ "title": "Ship it", "progress": 100 })),
    )
    .await;
    let task_id = body_json(response).await["id"].as_i64().unwrap();

    // A status-only update must not be overridden by the stored progress.
    let response = send(
        &app,
        Method::PUT,
        &format!("/api/v1/tasks/{task_id}"),
        Some(&token),
        Some(json!({ "status": "archived" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let task = body_json(response).await;
    assert_eq!(task["status"], "archived");
    assert_eq!(task["progress"], 100);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn self_referential_dependency_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, token, _) = register_and_login(&app, "alice", "member").await;
    let project_id = create_project(&app, &token, "dep", "Dependencies").await;

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/projects/{project_id}/tasks"),
        Some(&token),
        Some(json!({ "title": "Lone task" })),
    )
    .await;
    let task_id = body_json(response).await["id"].as_i64().unwrap();

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/tasks/{task_id}/dependencies"),
        Some(&token),
        Some(json!({ "predecessor_id": task_id })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approval_flow_advances_and_completes(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, applicant_token, _) = register_and_login(&app, "alice", "member").await;
    let (first_id, first_token, _) = register_and_login(&app, "frank", "member").await;
    let (second_id, second_token, _) = register_and_login(&app, "grace", "member").await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/approvals",
        Some(&applicant_token),
        Some(json!({
            "approval_type": "leave",
            "title": "Two days off",
            "nodes": [
                { "name": "Team lead", "approver_id": first_id },
                { "name": "Department head", "approver_id": second_id },
            ],
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let approval = body_json(response).await;
    let approval_id = approval["id"].as_i64().unwrap();
    assert_eq!(approval["status"], "pending");
    assert_eq!(approval["current_node"], "Team lead");

    // The second approver cannot jump the queue.
    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/approvals/{approval_id}/approve"),
        Some(&second_token),
        Some(json!({ "comment": "fine by me" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // First node approval moves the chain to the second node.
    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/approvals/{approval_id}/approve"),
        Some(&first_token),
        Some(json!({ "comment": "ok" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["status"], "processing");
    assert_eq!(detail["current_node"], "Department head");

    // Second node approval completes the whole request.
    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/approvals/{approval_id}/approve"),
        Some(&second_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["status"], "approved");
    assert!(detail["current_node"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn concurrent_decisions_cannot_both_succeed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, applicant_token, _) = register_and_login(&app, "alice", "member").await;
    let (approver_id, approver_token, _) = register_and_login(&app, "frank", "member").await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/approvals",
        Some(&applicant_token),
        Some(json!({
            "approval_type": "purchase",
            "title": "Second monitor",
            "nodes": [{ "name": "Manager", "approver_id": approver_id }],
        })),
    )
    .await;
    let approval_id = body_json(response).await["id"].as_i64().unwrap();

    // Fire the same decision twice at once; the row lock serializes them,
    // so exactly one approves and the other sees a closed approval.
    let uri = format!("/api/v1/approvals/{approval_id}/approve");
    let (first, second) = tokio::join!(
        send(&app, Method::POST, &uri, Some(&approver_token), Some(json!({}))),
        send(&app, Method::POST, &uri, Some(&approver_token), Some(json!({}))),
    );

    let mut statuses = [first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rejection_requires_a_comment(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_, applicant_token, _) = register_and_login(&app, "alice", "member").await;
    let (approver_id, approver_token, _) = register_and_login(&app, "frank", "member").await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/approvals",
        Some(&applicant_token),
        Some(json!({
            "approval_type": "expense",
            "title": "New laptop",
            "nodes": [{ "name": "Manager", "approver_id": approver_id }],
        })),
    )
    .await;
    let approval_id = body_json(response).await["id"].as_i64().unwrap();

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/approvals/{approval_id}/reject"),
        Some(&approver_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        Method::POST,
        &format!("/api/v1/approvals/{approval_id}/reject"),
        Some(&approver_token),
        Some(json!({ "comment": "over budget" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["status"], "rejected");
    assert_eq!(detail["nodes"][0]["comment"], "over budget");
}
