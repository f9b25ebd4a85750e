//! Project membership models.

use serde::Serialize;
use sqlx::FromRow;
use terraforge_core::types::{new_id, DbId, Timestamp, UserId};

use crate::models::enums::MemberRole;

/// A row from the `project_members` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub created_at: Timestamp,
}

impl ProjectMember {
    /// The owner membership created alongside a new project.
    pub fn owner(project_id: DbId, user_id: &str, now: Timestamp) -> Self {
        Self {
            id: new_id(),
            project_id,
            user_id: user_id.to_string(),
            role: MemberRole::Owner,
            created_at: now,
        }
    }

    pub fn is_owner(&self) -> bool {
        self.role == MemberRole::Owner
    }
}

/// A membership joined with the member's public user fields, for listings.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberWithUser {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: UserId,
    pub role: MemberRole,
    pub created_at: Timestamp,
    pub username: String,
    pub image: Option<String>,
}
