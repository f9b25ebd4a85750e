//! Repository for the `projects` and `project_members` tables.
//!
//! An identifier is either a project id (UUID text) or a slug. Lookups that
//! take a `requester` apply the visibility rule: a live project is visible
//! when it is `approved` or when the requester is one of its members.

use sqlx::PgExecutor;
use terraforge_core::types::{DbId, Timestamp};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::project::Project;
use crate::models::project_member::{ProjectMember, ProjectMemberWithUser};

/// Name of the partial unique index guarding `(project_type, slug)` among
/// non-deleted projects.
pub const PROJECT_SLUG_UNIQUE: &str = "uq_projects_type_slug";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, slug, summary, description, icon_url, downloads, \
     project_type, status, created_at, updated_at, deleted_at, user_id";

/// Same columns qualified with the `p` alias.
const P_COLUMNS: &str = "p.id, p.name, p.slug, p.summary, p.description, p.icon_url, \
     p.downloads, p.project_type, p.status, p.created_at, p.updated_at, p.deleted_at, p.user_id";

/// `$1` = id (nullable), `$2` = slug, `$3` = requester (nullable).
const VISIBLE_BY_IDENTIFIER: &str = "(p.id = $1 OR p.slug = $2)
     AND p.deleted_at IS NULL
     AND (
         p.status = 'approved'
         OR EXISTS (
             SELECT 1 FROM project_members vm
             WHERE vm.project_id = p.id AND vm.user_id = $3
         )
     )";

/// An exact id match takes precedence over a slug that happens to look like one.
const PREFER_ID_MATCH: &str = "ORDER BY (p.id = $1) DESC NULLS LAST, p.created_at LIMIT 1";

fn parse_id(identifier: &str) -> Option<Uuid> {
    Uuid::try_parse(identifier).ok()
}

/// Provides the project lifecycle queries.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project row.
    ///
    /// Fails with [`DbError::UniqueViolation`] on [`PROJECT_SLUG_UNIQUE`] when
    /// a live project of the same type already uses the slug. The index, not
    /// an application-level lookup, decides races between concurrent inserts.
    pub async fn insert(executor: impl PgExecutor<'_>, project: &Project) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO projects
                (id, name, slug, summary, description, icon_url, downloads,
                 project_type, status, created_at, updated_at, user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.slug)
        .bind(&project.summary)
        .bind(&project.description)
        .bind(&project.icon_url)
        .bind(project.downloads)
        .bind(project.project_type)
        .bind(project.status)
        .bind(project.created_at)
        .bind(project.updated_at)
        .bind(&project.user_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Insert a membership row.
    pub async fn insert_member(
        executor: impl PgExecutor<'_>,
        member: &ProjectMember,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO project_members (id, project_id, user_id, role, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(member.id)
        .bind(member.project_id)
        .bind(&member.user_id)
        .bind(member.role)
        .bind(member.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Find a live project visible to `requester` by id or slug.
    ///
    /// Returns `None` both when nothing matches and when the project exists
    /// but is hidden from the requester.
    pub async fn find_by_identifier(
        executor: impl PgExecutor<'_>,
        identifier: &str,
        requester: Option<&str>,
    ) -> Result<Option<Project>, DbError> {
        let query = format!(
            "SELECT {P_COLUMNS} FROM projects p
             WHERE {VISIBLE_BY_IDENTIFIER}
             {PREFER_ID_MATCH}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(parse_id(identifier))
            .bind(identifier)
            .bind(requester)
            .fetch_optional(executor)
            .await?;
        Ok(project)
    }

    /// Find a project by id or slug ignoring visibility and soft deletion.
    ///
    /// Internal use only; never expose the result to an arbitrary requester.
    pub async fn find_by_identifier_include_deleted(
        executor: impl PgExecutor<'_>,
        identifier: &str,
    ) -> Result<Option<Project>, DbError> {
        let query = format!(
            "SELECT {P_COLUMNS} FROM projects p
             WHERE (p.id = $1 OR p.slug = $2)
             {PREFER_ID_MATCH}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(parse_id(identifier))
            .bind(identifier)
            .fetch_optional(executor)
            .await?;
        Ok(project)
    }

    /// List the members of a visible project, oldest membership first.
    ///
    /// An empty result does not distinguish a missing or hidden project from
    /// one without members.
    pub async fn find_members_by_project_identifier(
        executor: impl PgExecutor<'_>,
        identifier: &str,
        requester: Option<&str>,
    ) -> Result<Vec<ProjectMemberWithUser>, DbError> {
        let query = format!(
            "SELECT pm.id, pm.project_id, pm.user_id, pm.role, pm.created_at,
                    u.username, u.image
             FROM project_members pm
             JOIN users u ON u.id = pm.user_id
             WHERE pm.project_id = (
                 SELECT p.id FROM projects p
                 WHERE {VISIBLE_BY_IDENTIFIER}
                 {PREFER_ID_MATCH}
             )
             ORDER BY pm.created_at, pm.id"
        );
        let members = sqlx::query_as::<_, ProjectMemberWithUser>(&query)
            .bind(parse_id(identifier))
            .bind(identifier)
            .bind(requester)
            .fetch_all(executor)
            .await?;
        Ok(members)
    }

    /// Find the membership `user_id` holds on `project_id`, if any.
    pub async fn find_member_by_project_and_user(
        executor: impl PgExecutor<'_>,
        project_id: DbId,
        user_id: &str,
    ) -> Result<Option<ProjectMember>, DbError> {
        let member = sqlx::query_as::<_, ProjectMember>(
            "SELECT id, project_id, user_id, role, created_at
             FROM project_members
             WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
        Ok(member)
    }

    /// Write the mutable field set of `project` and bump `updated_at`.
    ///
    /// Returns the refreshed row, or `None` if the project is soft-deleted
    /// (or gone), in which case nothing was written.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        project: &Project,
    ) -> Result<Option<Project>, DbError> {
        let query = format!(
            "UPDATE projects SET
                name = $2,
                slug = $3,
                summary = $4,
                description = $5,
                icon_url = $6,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Project>(&query)
            .bind(project.id)
            .bind(&project.name)
            .bind(&project.slug)
            .bind(&project.summary)
            .bind(&project.description)
            .bind(&project.icon_url)
            .fetch_optional(executor)
            .await?;
        Ok(updated)
    }

    /// Soft-delete the project with exactly this id. Returns `true` if a row
    /// was stamped.
    pub async fn delete_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
        deleted_at: Timestamp,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = $2
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(deleted_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a project by id or slug. Returns `true` if a row was stamped.
    ///
    /// Resolves to a single row the same way [`ProjectRepo::find_by_identifier`]
    /// does, so an id never also stamps a project whose slug is that id's text.
    pub async fn delete_by_identifier(
        executor: impl PgExecutor<'_>,
        identifier: &str,
        deleted_at: Timestamp,
    ) -> Result<bool, DbError> {
        let query = format!(
            "UPDATE projects SET deleted_at = $3
             WHERE id = (
                 SELECT p.id FROM projects p
                 WHERE (p.id = $1 OR p.slug = $2) AND p.deleted_at IS NULL
                 {PREFER_ID_MATCH}
             )"
        );
        let result = sqlx::query(&query)
            .bind(parse_id(identifier))
            .bind(identifier)
            .bind(deleted_at)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
