//! Refresh token model.

use epm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A refresh token row. Only the SHA-256 hash of the token is stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RefreshToken {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
