//! Integration tests for plans, WBS tasks, and the progress roll-up.

use epm_db::models::plan::{CreatePlan, CreateWbsTask, UpdateWbsTask};
use epm_db::models::project::CreateProject;
use epm_db::repositories::{PlanRepo, ProjectRepo, UserRepo, WbsTaskRepo};
use sqlx::PgPool;

async fn seed_plan(pool: &PgPool) -> (i64, i64) {
    let owner = UserRepo::create(pool, "planner", "planner@example.com", "$argon2id$fake", None, "member")
        .await
        .unwrap()
        .id;
    let project = ProjectRepo::create(
        pool,
        owner,
        &CreateProject {
            key: "APOLLO".to_string(),
            name: "Apollo".to_string(),
            description: None,
            status: None,
            start_date: None,
            end_date: None,
        },
    )
    .await
    .unwrap();
    let plan = PlanRepo::create(
        pool,
        project.id,
        owner,
        &CreatePlan {
            name: "Phase 1".to_string(),
            description: None,
            status: None,
            start_date: None,
            end_date: None,
        },
    )
    .await
    .unwrap();
    (plan.id, owner)
}

fn new_wbs(name: &str, parent_id: Option<i64>) -> CreateWbsTask {
    CreateWbsTask {
        parent_id,
        name: name.to_string(),
        status: None,
        is_milestone: None,
        owner_id: None,
        start_date: None,
        end_date: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_levels_and_sort_order_derived(pool: PgPool) {
    let (plan_id, _) = seed_plan(&pool).await;

    let root_a = WbsTaskRepo::create(&pool, plan_id, &new_wbs("Design", None), None)
        .await
        .unwrap();
    let root_b = WbsTaskRepo::create(&pool, plan_id, &new_wbs("Build", None), None)
        .await
        .unwrap();
    let child = WbsTaskRepo::create(&pool, plan_id, &new_wbs("Schema", Some(root_a.id)), None)
        .await
        .unwrap();

    assert_eq!(root_a.level, 1);
    assert_eq!(root_a.sort_order, 1);
    assert_eq!(root_b.sort_order, 2);
    assert_eq!(child.level, 2);
    assert_eq!(child.sort_order, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_progress_rolls_up_from_completed_tasks(pool: PgPool) {
    let (plan_id, _) = seed_plan(&pool).await;

    let a = WbsTaskRepo::create(&pool, plan_id, &new_wbs("A", None), None)
        .await
        .unwrap();
    WbsTaskRepo::create(&pool, plan_id, &new_wbs("B", None), None)
        .await
        .unwrap();

    assert_eq!(PlanRepo::refresh_progress(&pool, plan_id).await.unwrap(), 0);

    WbsTaskRepo::update(
        &pool,
        a.id,
        &UpdateWbsTask {
            name: None,
            status: None,
            progress: None,
            is_milestone: None,
            owner_id: None,
            start_date: None,
            end_date: None,
        },
        "completed",
        100,
        None,
    )
    .await
    .unwrap();

    assert_eq!(PlanRepo::refresh_progress(&pool, plan_id).await.unwrap(), 50);

    let plan = PlanRepo::find_by_id(&pool, plan_id).await.unwrap().unwrap();
    assert_eq!(plan.progress, 50);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_subtree_delete_cascades(pool: PgPool) {
    let (plan_id, _) = seed_plan(&pool).await;

    let root = WbsTaskRepo::create(&pool, plan_id, &new_wbs("Root", None), None)
        .await
        .unwrap();
    WbsTaskRepo::create(&pool, plan_id, &new_wbs("Child", Some(root.id)), None)
        .await
        .unwrap();

    WbsTaskRepo::delete_tree(&pool, root.id).await.unwrap();
    assert!(WbsTaskRepo::list(&pool, plan_id).await.unwrap().is_empty());
}
