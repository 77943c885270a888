//! Repository for the `approvals` and `approval_nodes` tables.

use epm_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::approval::{Approval, ApprovalNode, ApprovalStats, CreateApproval};

const COLUMNS: &str = "id, approval_type, title, content, status, current_node, applicant_id, \
                       project_id, created_at, updated_at";

const NODE_COLUMNS: &str = "id, approval_id, name, approver_id, status, comment, approved_at, \
                            sort_order, created_at, updated_at";

/// Provides operations for the approval workflow.
pub struct ApprovalRepo;

impl ApprovalRepo {
    /// Insert an approval with its flow nodes in one transaction.
    ///
    /// The current node is set to the first node in the flow.
    pub async fn create(
        pool: &PgPool,
        applicant_id: DbId,
        input: &CreateApproval,
    ) -> Result<Approval, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let first_node = input.nodes.first().map(|n| n.name.as_str());
        let query = format!(
            "INSERT INTO approvals (approval_type, title, content, current_node, applicant_id, project_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let approval = sqlx::query_as::<_, Approval>(&query)
            .bind(&input.approval_type)
            .bind(&input.title)
            .bind(&input.content)
            .bind(first_node)
            .bind(applicant_id)
            .bind(input.project_id)
            .fetch_one(&mut *tx)
            .await?;

        for (index, node) in input.nodes.iter().enumerate() {
            sqlx::query(
                "INSERT INTO approval_nodes (approval_id, name, approver_id, sort_order)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(approval.id)
            .bind(&node.name)
            .bind(node.approver_id)
            .bind(index as i32 + 1)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(approval)
    }

    /// Find an approval by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Approval>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approvals WHERE id = $1");
        sqlx::query_as::<_, Approval>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an approval and lock its row for the rest of the transaction.
    ///
    /// A decision reads the status, records the node decision, and
    /// advances the chain in separate statements; the lock keeps two
    /// approvers from racing past the status check on the same row.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Approval>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approvals WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Approval>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// An approval's flow nodes in decision order.
    pub async fn nodes(pool: &PgPool, approval_id: DbId) -> Result<Vec<ApprovalNode>, sqlx::Error> {
        let query = format!(
            "SELECT {NODE_COLUMNS} FROM approval_nodes WHERE approval_id = $1 ORDER BY sort_order"
        );
        sqlx::query_as::<_, ApprovalNode>(&query)
            .bind(approval_id)
            .fetch_all(pool)
            .await
    }

    /// The first node still waiting for a decision, if any.
    pub async fn first_pending_node(
        executor: impl PgExecutor<'_>,
        approval_id: DbId,
    ) -> Result<Option<ApprovalNode>, sqlx::Error> {
        let query = format!(
            "SELECT {NODE_COLUMNS} FROM approval_nodes
             WHERE approval_id = $1 AND status = 'pending'
             ORDER BY sort_order
             LIMIT 1"
        );
        sqlx::query_as::<_, ApprovalNode>(&query)
            .bind(approval_id)
            .fetch_optional(executor)
            .await
    }

    /// Approvals submitted by a user, newest first.
    ///
    /// Optional filters: status, approval type, and a keyword matched
    /// against the title.
    pub async fn list_submitted(
        pool: &PgPool,
        applicant_id: DbId,
        status: Option<&str>,
        approval_type: Option<&str>,
        keyword: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Approval>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approvals
             WHERE applicant_id = $1
               AND ($2::text IS NULL OR status = $2)
               AND ($3::text IS NULL OR approval_type = $3)
               AND ($4::text IS NULL OR title ILIKE '%' || $4 || '%')
             ORDER BY created_at DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, Approval>(&query)
            .bind(applicant_id)
            .bind(status)
            .bind(approval_type)
            .bind(keyword)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Open approvals whose next pending node belongs to the given approver.
    pub async fn list_awaiting(
        pool: &PgPool,
        approver_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Approval>, sqlx::Error> {
        let query = format!(
            "SELECT a.{} FROM approvals a
             WHERE a.status IN ('pending', 'processing')
               AND (SELECT n.approver_id FROM approval_nodes n
                    WHERE n.approval_id = a.id AND n.status = 'pending'
                    ORDER BY n.sort_order LIMIT 1) = $1
             ORDER BY a.created_at
             LIMIT $2 OFFSET $3",
            COLUMNS.replace(", ", ", a.")
        );
        sqlx::query_as::<_, Approval>(&query)
            .bind(approver_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Completed approvals the given approver took part in, newest first.
    pub async fn list_handled(
        pool: &PgPool,
        approver_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Approval>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT a.{} FROM approvals a
             JOIN approval_nodes n ON n.approval_id = a.id
             WHERE n.approver_id = $1 AND n.status IN ('approved', 'rejected')
             ORDER BY a.created_at DESC
             LIMIT $2 OFFSET $3",
            COLUMNS.replace(", ", ", a.")
        );
        sqlx::query_as::<_, Approval>(&query)
            .bind(approver_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record a decision on a node.
    pub async fn set_node_decision(
        executor: impl PgExecutor<'_>,
        node_id: DbId,
        status: &str,
        comment: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE approval_nodes
             SET status = $2, comment = $3, approved_at = NOW(), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(node_id)
        .bind(status)
        .bind(comment)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Move the approval to a new status and current node.
    pub async fn set_status(
        executor: impl PgExecutor<'_>,
        id: DbId,
        status: &str,
        current_node: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE approvals SET status = $2, current_node = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(current_node)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Per-status counts across a user's submitted approvals.
    pub async fn stats_for_user(
        pool: &PgPool,
        applicant_id: DbId,
    ) -> Result<ApprovalStats, sqlx::Error> {
        let row: (i64, i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = 'pending'),
                    COUNT(*) FILTER (WHERE status = 'processing'),
                    COUNT(*) FILTER (WHERE status = 'approved'),
                    COUNT(*) FILTER (WHERE status = 'rejected'),
                    COUNT(*) FILTER (WHERE status = 'cancelled')
             FROM approvals WHERE applicant_id = $1",
        )
        .bind(applicant_id)
        .fetch_one(pool)
        .await?;
        Ok(ApprovalStats {
            pending: row.0,
            processing: row.1,
            approved: row.2,
            rejected: row.3,
            cancelled: row.4,
        })
    }
}
