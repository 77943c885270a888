//! Integration tests for the approval workflow repository.

use epm_db::models::approval::{CreateApproval, CreateApprovalNode};
use epm_db::repositories::{ApprovalRepo, UserRepo};
use sqlx::PgPool;

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

fn two_node_flow(first: i64, second: i64) -> CreateApproval {
    CreateApproval {
        approval_type: "expense".to_string(),
        title: "Team offsite".to_string(),
        content: Some("Travel and lodging".to_string()),
        project_id: None,
        nodes: vec![
            CreateApprovalNode {
                name: "Manager review".to_string(),
                approver_id: first,
            },
            CreateApprovalNode {
                name: "Finance review".to_string(),
                approver_id: second,
            },
        ],
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_sets_current_node_to_first(pool: PgPool) {
    let applicant = new_user(&pool, "applicant").await;
    let manager = new_user(&pool, "manager").await;
    let finance = new_user(&pool, "finance").await;

    let approval = ApprovalRepo::create(&pool, applicant, &two_node_flow(manager, finance))
        .await
        .unwrap();

    assert_eq!(approval.status, "pending");
    assert_eq!(approval.current_node.as_deref(), Some("Manager review"));

    let nodes = ApprovalRepo::nodes(&pool, approval.id).await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].sort_order, 1);
    assert_eq!(nodes[1].sort_order, 2);
    assert!(nodes.iter().all(|n| n.status == "pending"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_node_approval_advances_the_chain(pool: PgPool) {
    let applicant = new_user(&pool, "applicant").await;
    let manager = new_user(&pool, "manager").await;
    let finance = new_user(&pool, "finance").await;

    let approval = ApprovalRepo::create(&pool, applicant, &two_node_flow(manager, finance))
        .await
        .unwrap();

    // First decision: approve the manager node, chain moves to finance.
    let node = ApprovalRepo::first_pending_node(&pool, approval.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(node.approver_id, manager);

    ApprovalRepo::set_node_decision(&pool, node.id, "approved", Some("ok"))
        .await
        .unwrap();
    let next = ApprovalRepo::first_pending_node(&pool, approval.id)
        .await
        .unwrap()
        .unwrap();
    ApprovalRepo::set_status(&pool, approval.id, "processing", Some(&next.name))
        .await
        .unwrap();

    let reloaded = ApprovalRepo::find_by_id(&pool, approval.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.status, "processing");
    assert_eq!(reloaded.current_node.as_deref(), Some("Finance review"));

    // Second decision: approve the finance node, chain completes.
    ApprovalRepo::set_node_decision(&pool, next.id, "approved", None)
        .await
        .unwrap();
    assert!(ApprovalRepo::first_pending_node(&pool, approval.id)
        .await
        .unwrap()
        .is_none());
    ApprovalRepo::set_status(&pool, approval.id, "approved", None)
        .await
        .unwrap();

    let done = ApprovalRepo::find_by_id(&pool, approval.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status, "approved");
    assert!(done.current_node.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_awaiting_list_follows_the_current_node(pool: PgPool) {
    let applicant = new_user(&pool, "applicant").await;
    let manager = new_user(&pool, "manager").await;
    let finance = new_user(&pool, "finance").await;

    let approval = ApprovalRepo::create(&pool, applicant, &two_node_flow(manager, finance))
        .await
        .unwrap();

    let manager_inbox = ApprovalRepo::list_awaiting(&pool, manager, 50, 0).await.unwrap();
    assert_eq!(manager_inbox.len(), 1);
    let finance_inbox = ApprovalRepo::list_awaiting(&pool, finance, 50, 0).await.unwrap();
    assert!(finance_inbox.is_empty());

    let node = ApprovalRepo::first_pending_node(&pool, approval.id)
        .await
        .unwrap()
        .unwrap();
    ApprovalRepo::set_node_decision(&pool, node.id, "approved", None)
        .await
        .unwrap();
    ApprovalRepo::set_status(&pool, approval.id, "processing", Some("Finance review"))
        .await
        .unwrap();

    assert!(ApprovalRepo::list_awaiting(&pool, manager, 50, 0)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        ApprovalRepo::list_awaiting(&pool, finance, 50, 0)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stats_count_per_status(pool: PgPool) {
    let applicant = new_user(&pool, "applicant").await;
    let manager = new_user(&pool, "manager").await;
    let finance = new_user(&pool, "finance").await;

    let first = ApprovalRepo::create(&pool, applicant, &two_node_flow(manager, finance))
        .await
        .unwrap();
    ApprovalRepo::create(&pool, applicant, &two_node_flow(manager, finance))
        .await
        .unwrap();
    ApprovalRepo::set_status(&pool, first.id, "cancelled", None)
        .await
        .unwrap();

    let stats = ApprovalRepo::stats_for_user(&pool, applicant).await.unwrap();
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.approved, 0);
}
