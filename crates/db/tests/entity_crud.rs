//! Integration tests for the core entity repositories.
//!
//! Exercises the repository layer against a real database:
//! - Project creation, key normalization, and unique-key conflicts
//! - Membership add/remove and admin counting
//! - Task CRUD, subtask cascade, and dependency edges
//! - Soft-delete visibility

use epm_db::models::project::{CreateProject, UpdateProject};
use epm_db::models::task::CreateTask;
use epm_db::repositories::{DependencyRepo, MemberRepo, ProjectRepo, TaskRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_user(pool: &PgPool, username: &str) -> i64 {
    UserRepo::create(
        pool,
        username,
        &format!("{username}@example.com"),
        "$argon2id$fake",
        None,
        "member",
    )
    .await
    .unwrap()
    .id
}

fn new_project(key: &str, name: &str) -> CreateProject {
    CreateProject {
        key: key.to_string(),
        name: name.to_string(),
        description: None,
        status: None,
        start_date: None,
        end_date: None,
    }
}

fn new_task(title: &str) -> CreateTask {
    CreateTask {
        parent_id: None,
        title: title.to_string(),
        description: None,
        status: None,
        priority: None,
        assignee_id: None,
        start_date: None,
        end_date: None,
        estimated_hours: None,
        progress: None,
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_project_key_stored_upper_case(pool: PgPool) {
    let owner = new_user(&pool, "alice").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("apollo", "Apollo"))
        .await
        .unwrap();

    assert_eq!(project.key, "APOLLO");
    assert_eq!(project.status, "active");

    let found = ProjectRepo::find_by_key(&pool, "apollo").await.unwrap();
    assert_eq!(found.unwrap().id, project.id);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_project_key_conflicts(pool: PgPool) {
    let owner = new_user(&pool, "alice").await;
    ProjectRepo::create(&pool, owner, &new_project("APOLLO", "Apollo"))
        .await
        .unwrap();

    let result = ProjectRepo::create(&pool, owner, &new_project("apollo", "Apollo Two")).await;
    let err = result.unwrap_err();
    let db_err = err.as_database_error().expect("expected database error");
    assert_eq!(db_err.constraint(), Some("uq_projects_key"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_update_is_partial(pool: PgPool) {
    let owner = new_user(&pool, "alice").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("APOLLO", "Apollo"))
        .await
        .unwrap();

    let updated = ProjectRepo::update(
        &pool,
        project.id,
        &UpdateProject {
            name: Some("Apollo Renamed".to_string()),
            description: None,
            status: None,
            start_date: None,
            end_date: None,
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.name, "Apollo Renamed");
    assert_eq!(updated.status, "active");
    assert_eq!(updated.key, "APOLLO");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_soft_deleted_project_invisible(pool: PgPool) {
    let owner = new_user(&pool, "alice").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("APOLLO", "Apollo"))
        .await
        .unwrap();

    assert!(ProjectRepo::soft_delete(&pool, project.id).await.unwrap());
    assert!(ProjectRepo::find_by_id(&pool, project.id)
        .await
        .unwrap()
        .is_none());
    // A second delete is a no-op.
    assert!(!ProjectRepo::soft_delete(&pool, project.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_membership_lifecycle(pool: PgPool) {
    let owner = new_user(&pool, "alice").await;
    let other = new_user(&pool, "bob").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("APOLLO", "Apollo"))
        .await
        .unwrap();

    // Creating the project seeds the owner's admin membership in the
    // same transaction.
    let members = MemberRepo::list(&pool, project.id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].user_id, owner);
    assert_eq!(members[0].role, "admin");

    MemberRepo::add(&pool, project.id, other, "member").await.unwrap();

    let members = MemberRepo::list(&pool, project.id).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(MemberRepo::count_admins(&pool, project.id).await.unwrap(), 1);

    // Duplicate membership hits the unique constraint.
    let err = MemberRepo::add(&pool, project.id, other, "member")
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("expected database error");
    assert_eq!(db_err.constraint(), Some("uq_project_members_project_user"));

    assert!(MemberRepo::remove(&pool, project.id, other).await.unwrap());
    assert!(!MemberRepo::remove(&pool, project.id, other).await.unwrap());
}

// ---------------------------------------------------------------------------
// Tasks and dependencies
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_task_defaults_applied(pool: PgPool) {
    let owner = new_user(&pool, "alice").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("APOLLO", "Apollo"))
        .await
        .unwrap();

    let task = TaskRepo::create(&pool, project.id, owner, &new_task("Design"), None)
        .await
        .unwrap();

    assert_eq!(task.status, "todo");
    assert_eq!(task.priority, "medium");
    assert_eq!(task.progress, 0);
    assert!(task.completed_at.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_task_delete_cascades_subtasks_and_edges(pool: PgPool) {
    let owner = new_user(&pool, "alice").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("APOLLO", "Apollo"))
        .await
        .unwrap();

    let root = TaskRepo::create(&pool, project.id, owner, &new_task("Root"), None)
        .await
        .unwrap();
    let mut child_input = new_task("Child");
    child_input.parent_id = Some(root.id);
    let child = TaskRepo::create(&pool, project.id, owner, &child_input, None)
        .await
        .unwrap();
    let other = TaskRepo::create(&pool, project.id, owner, &new_task("Other"), None)
        .await
        .unwrap();

    DependencyRepo::create(&pool, child.id, other.id, None).await.unwrap();

    let deleted = TaskRepo::soft_delete_tree(&pool, root.id).await.unwrap();
    assert_eq!(deleted, 2);

    assert!(TaskRepo::find_by_id(&pool, child.id).await.unwrap().is_none());
    assert!(TaskRepo::find_by_id(&pool, other.id).await.unwrap().is_some());
    assert!(!DependencyRepo::exists(&pool, child.id, other.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_dependency_edges_queryable_both_ways(pool: PgPool) {
    let owner = new_user(&pool, "alice").await;
    let project = ProjectRepo::create(&pool, owner, &new_project("APOLLO", "Apollo"))
        .await
        .unwrap();

    let a = TaskRepo::create(&pool, project.id, owner, &new_task("A"), None)
        .await
        .unwrap();
    let b = TaskRepo::create(&pool, project.id, owner, &new_task("B"), None)
        .await
        .unwrap();

    let edge = DependencyRepo::create(&pool, a.id, b.id, Some("ss")).await.unwrap();
    assert_eq!(edge.dependency_type, "ss");

    let predecessors = DependencyRepo::predecessors_of(&pool, b.id).await.unwrap();
    assert_eq!(predecessors.len(), 1);
    assert_eq!(predecessors[0].id, a.id);

    let dependents = DependencyRepo::dependents_of(&pool, a.id).await.unwrap();
    assert_eq!(dependents.len(), 1);
    assert_eq!(dependents[0].id, b.id);

    // Duplicate pair hits the unique constraint.
    let err = DependencyRepo::create(&pool, a.id, b.id, None).await.unwrap_err();
    let db_err = err.as_database_error().expect("expected database error");
    assert_eq!(db_err.constraint(), Some("uq_task_dependencies_pair"));
}
