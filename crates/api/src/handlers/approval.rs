//! Handlers for the `/approvals` resource.
//!
//! An approval moves through its flow nodes in order. Each decision is
//! taken by the approver of the first pending node; approving the last
//! node approves the whole request, rejecting any node rejects it.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use epm_core::approval as approval_rules;
use epm_core::error::CoreError;
use epm_core::types::DbId;
use epm_db::models::approval::{
    Approval, ApprovalDecision, ApprovalDetail, ApprovalStats, CreateApproval,
};
use epm_db::repositories::ApprovalRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApprovalListParams {
    pub status: Option<String>,
    pub approval_type: Option<String>,
    pub keyword: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ApprovalListParams {
    fn limit(&self) -> i64 {
        epm_core::pagination::clamp_limit(self.limit)
    }

    fn offset(&self) -> i64 {
        epm_core::pagination::clamp_offset(self.offset)
    }
}

/// POST /api/v1/approvals
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateApproval>,
) -> AppResult<(StatusCode, Json<Approval>)> {
    approval_rules::validate_approval_type(&input.approval_type)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Approval title must not be empty".into(),
        )));
    }
    if input.nodes.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "An approval flow needs at least one node".into(),
        )));
    }

    let approval = ApprovalRepo::create(&state.pool, user.user_id, &input).await?;
    tracing::info!(
        approval_id = approval.id,
        approval_type = %approval.approval_type,
        "Approval submitted"
    );
    Ok((StatusCode::CREATED, Json(approval)))
}

/// GET /api/v1/approvals/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApprovalDetail>> {
    let approval = ApprovalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Approval",
            id,
        }))?;
    let nodes = ApprovalRepo::nodes(&state.pool, id).await?;
    Ok(Json(ApprovalDetail { approval, nodes }))
}

/// GET /api/v1/approvals/types
///
/// The approval types a request may be submitted under.
pub async fn types(_user: AuthUser) -> Json<&'static [&'static str]> {
    Json(approval_rules::VALID_TYPES)
}

/// GET /api/v1/approvals/my
pub async fn list_submitted(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ApprovalListParams>,
) -> AppResult<Json<Vec<Approval>>> {
    if let Some(status) = params.status.as_deref() {
        approval_rules::validate_status(status)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    if let Some(approval_type) = params.approval_type.as_deref() {
        approval_rules::validate_approval_type(approval_type)
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    }
    let approvals = ApprovalRepo::list_submitted(
        &state.pool,
        user.user_id,
        params.status.as_deref(),
        params.approval_type.as_deref(),
        params.keyword.as_deref(),
        params.limit(),
        params.offset(),
    )
    .await?;
    Ok(Json(approvals))
}

/// GET /api/v1/approvals/pending
///
/// Approvals waiting on the caller's decision, oldest first.
pub async fn list_awaiting(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ApprovalListParams>,
) -> AppResult<Json<Vec<Approval>>> {
    let approvals =
        ApprovalRepo::list_awaiting(&state.pool, user.user_id, params.limit(), params.offset())
            .await?;
    Ok(Json(approvals))
}

/// GET /api/v1/approvals/processed
pub async fn list_handled(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ApprovalListParams>,
) -> AppResult<Json<Vec<Approval>>> {
    let approvals =
        ApprovalRepo::list_handled(&state.pool, user.user_id, params.limit(), params.offset())
            .await?;
    Ok(Json(approvals))
}

/// GET /api/v1/approvals/stats
pub async fn stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApprovalStats>> {
    let stats = ApprovalRepo::stats_for_user(&state.pool, user.user_id).await?;
    Ok(Json(stats))
}

/// POST /api/v1/approvals/{id}/approve
///
/// The check-decide-advance sequence runs in one transaction with the
/// approval row locked, so concurrent decisions serialize.
pub async fn approve(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ApprovalDecision>,
) -> AppResult<Json<ApprovalDetail>> {
    let mut tx = state.pool.begin().await?;
    let (approval, node) = load_for_decision(&mut tx, &user, id).await?;

    ApprovalRepo::set_node_decision(
        &mut *tx,
        node.id,
        approval_rules::NODE_APPROVED,
        input.comment.as_deref(),
    )
    .await?;

    let next = ApprovalRepo::first_pending_node(&mut *tx, id).await?;
    let status = approval_rules::status_after_node_approval(next.is_some());
    ApprovalRepo::set_status(&mut *tx, id, status, next.map(|n| n.name).as_deref()).await?;
    tx.commit().await?;

    tracing::info!(approval_id = id, node = %node.name, "Approval node approved");
    detail(&state, id, approval).await
}

/// POST /api/v1/approvals/{id}/reject
///
/// A rejection comment is required; rejecting any node rejects the
/// whole approval.
pub async fn reject(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ApprovalDecision>,
) -> AppResult<Json<ApprovalDetail>> {
    let comment = input
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "A comment is required when rejecting".into(),
            ))
        })?;

    let mut tx = state.pool.begin().await?;
    let (approval, node) = load_for_decision(&mut tx, &user, id).await?;

    ApprovalRepo::set_node_decision(&mut *tx, node.id, approval_rules::NODE_REJECTED, Some(comment))
        .await?;
    ApprovalRepo::set_status(&mut *tx, id, approval_rules::STATUS_REJECTED, None).await?;
    tx.commit().await?;

    tracing::info!(approval_id = id, node = %node.name, "Approval rejected");
    detail(&state, id, approval).await
}

/// POST /api/v1/approvals/{id}/cancel
///
/// Only the applicant may cancel, and only while the approval is still
/// open.
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApprovalDetail>> {
    let mut tx = state.pool.begin().await?;
    let approval = ApprovalRepo::find_by_id_for_update(&mut tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Approval",
            id,
        }))?;

    if approval.applicant_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the applicant can cancel an approval".into(),
        )));
    }
    if !approval_rules::can_cancel(&approval.status) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Approval in status '{}' cannot be cancelled",
            approval.status
        ))));
    }

    ApprovalRepo::set_status(&mut *tx, id, approval_rules::STATUS_CANCELLED, None).await?;
    tx.commit().await?;
    detail(&state, id, approval).await
}

/// Lock the approval row and resolve its current node, checking the
/// caller may decide. Runs inside the caller's transaction; dropping the
/// transaction on an error path releases the lock and rolls back.
async fn load_for_decision(
    conn: &mut sqlx::PgConnection,
    user: &AuthUser,
    id: DbId,
) -> Result<(Approval, epm_db::models::approval::ApprovalNode), AppError> {
    let approval = ApprovalRepo::find_by_id_for_update(&mut *conn, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Approval",
            id,
        }))?;

    if !approval_rules::can_decide(&approval.status) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Approval in status '{}' is not awaiting a decision",
            approval.status
        ))));
    }

    let node = ApprovalRepo::first_pending_node(&mut *conn, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Approval has no pending node left".into(),
            ))
        })?;

    if node.approver_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "The current node is assigned to a different approver".into(),
        )));
    }

    Ok((approval, node))
}

/// Re-read the approval and return it with its nodes.
async fn detail(state: &AppState, id: DbId, fallback: Approval) -> AppResult<Json<ApprovalDetail>> {
    let approval = ApprovalRepo::find_by_id(&state.pool, id)
        .await?
        .unwrap_or(fallback);
    let nodes = ApprovalRepo::nodes(&state.pool, id).await?;
    Ok(Json(ApprovalDetail { approval, nodes }))
}
