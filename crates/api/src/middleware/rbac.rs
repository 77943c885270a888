//! Project-scoped access checks.
//!
//! A user's permissions within a project come from their membership row,
//! not their global role. Handlers call these helpers before any write.

use epm_core::error::CoreError;
use epm_core::roles;
use epm_core::types::DbId;
use epm_db::models::member::ProjectMember;
use epm_db::repositories::MemberRepo;
use sqlx::PgPool;

use crate::error::AppError;

/// Require that the user is a member of the project, returning the membership.
pub async fn require_member(
    pool: &PgPool,
    project_id: DbId,
    user_id: DbId,
) -> Result<ProjectMember, AppError> {
    MemberRepo::find(pool, project_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "You are not a member of this project".into(),
            ))
        })
}

/// Require a membership role that can manage the project (admin or manager).
pub async fn require_manager(
    pool: &PgPool,
    project_id: DbId,
    user_id: DbId,
) -> Result<ProjectMember, AppError> {
    let member = require_member(pool, project_id, user_id).await?;
    if roles::can_manage_project(&member.role) {
        Ok(member)
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "This action requires the admin or manager role".into(),
        )))
    }
}

/// Require the project admin role.
pub async fn require_admin(
    pool: &PgPool,
    project_id: DbId,
    user_id: DbId,
) -> Result<ProjectMember, AppError> {
    let member = require_member(pool, project_id, user_id).await?;
    if member.role == roles::ROLE_ADMIN {
        Ok(member)
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "This action requires the admin role".into(),
        )))
    }
}
