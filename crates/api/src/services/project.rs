//! Project lifecycle orchestration.
//!
//! Every write runs inside one transaction that also performs the
//! authorization reads, so the check and the mutation see the same snapshot.
//! Dropping the transaction without committing (early return, error, or the
//! request future being cancelled) rolls it back. Search propagation happens
//! only after commit, through [`IndexSync`].

use chrono::{SubsecRound, Utc};
use sqlx::{PgConnection, PgPool};
use terraforge_core::types::{DbId, Timestamp};
use terraforge_db::models::project::{CreateProject, Project, UpdateProject};
use terraforge_db::models::project_member::{ProjectMember, ProjectMemberWithUser};
use terraforge_db::repositories::project_repo::PROJECT_SLUG_UNIQUE;
use terraforge_db::repositories::ProjectRepo;
use terraforge_db::DbError;

use crate::services::index_sync::IndexSync;

/// Outcomes of a project operation other than success.
///
/// `NotFound`, `UnauthorisedAction` and `SlugUnavailable` are expected
/// results the caller can act on. `Fatal` means the request must be aborted.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// No visible project matches the identifier, or the caller holds no
    /// membership on it.
    #[error("Project '{0}' not found")]
    NotFound(String),

    /// The caller is a member but not the owner.
    #[error("You are not authorised to perform this action")]
    UnauthorisedAction,

    /// A live project of the same type already uses the slug.
    #[error("Slug '{0}' is unavailable")]
    SlugUnavailable(String),

    #[error(transparent)]
    Fatal(#[from] DbError),
}

impl From<sqlx::Error> for ProjectError {
    fn from(err: sqlx::Error) -> Self {
        ProjectError::Fatal(DbError::from(err))
    }
}

/// Map a slug-index violation to [`ProjectError::SlugUnavailable`]; any other
/// store error stays fatal.
fn slug_conflict(err: DbError, slug: &str) -> ProjectError {
    if err.is_unique_violation_on(PROJECT_SLUG_UNIQUE) {
        ProjectError::SlugUnavailable(slug.to_string())
    } else {
        ProjectError::Fatal(err)
    }
}

/// Postgres stores microseconds; truncate so returned values equal stored ones.
fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

#[derive(Clone)]
pub struct ProjectService {
    pool: PgPool,
    index_sync: IndexSync,
}

impl ProjectService {
    pub fn new(pool: PgPool, index_sync: IndexSync) -> Self {
        Self { pool, index_sync }
    }

    /// Create a `draft` project owned by `user_id`, together with its owner
    /// membership.
    ///
    /// Slug collisions are decided by the store's unique index, so of two
    /// concurrent creates with the same slug exactly one succeeds.
    pub async fn create_user_project(
        &self,
        input: &CreateProject,
        user_id: &str,
    ) -> Result<Project, ProjectError> {
        let now = now();
        let project = Project::new_draft(input, user_id, now);
        let owner = ProjectMember::owner(project.id, user_id, now);

        let mut tx = self.pool.begin().await?;
        ProjectRepo::insert(&mut *tx, &project)
            .await
            .map_err(|e| slug_conflict(e, &project.slug))?;
        ProjectRepo::insert_member(&mut *tx, &owner).await?;
        tx.commit().await?;

        tracing::info!(project_id = %project.id, slug = %project.slug, user_id, "Project created");
        self.index_sync.index(project.clone());
        Ok(project)
    }

    /// Look up a project visible to `requester`.
    ///
    /// A hidden project and a missing one both yield `NotFound`.
    pub async fn get_project_by_identifier(
        &self,
        identifier: &str,
        requester: Option<&str>,
    ) -> Result<Project, ProjectError> {
        ProjectRepo::find_by_identifier(&self.pool, identifier, requester)
            .await?
            .ok_or_else(|| ProjectError::NotFound(identifier.to_string()))
    }

    /// List the members of a project visible to `requester`.
    ///
    /// An empty listing is reported as `NotFound`: the repository cannot tell
    /// a project without members from a missing or hidden one.
    pub async fn get_project_members(
        &self,
        identifier: &str,
        requester: Option<&str>,
    ) -> Result<Vec<ProjectMemberWithUser>, ProjectError> {
        let members =
            ProjectRepo::find_members_by_project_identifier(&self.pool, identifier, requester)
                .await?;
        if members.is_empty() {
            return Err(ProjectError::NotFound(identifier.to_string()));
        }
        Ok(members)
    }

    /// Apply `input` to the project. Owner only.
    pub async fn update_project(
        &self,
        identifier: &str,
        input: &UpdateProject,
        user_id: &str,
    ) -> Result<Project, ProjectError> {
        let mut tx = self.pool.begin().await?;

        let mut project = ProjectRepo::find_by_identifier(&mut *tx, identifier, Some(user_id))
            .await?
            .ok_or_else(|| ProjectError::NotFound(identifier.to_string()))?;
        require_owner(&mut tx, project.id, user_id, identifier).await?;

        project.apply_update(input);
        let updated = ProjectRepo::update(&mut *tx, &project)
            .await
            .map_err(|e| slug_conflict(e, &project.slug))?
            .ok_or_else(|| ProjectError::NotFound(identifier.to_string()))?;
        tx.commit().await?;

        tracing::info!(project_id = %updated.id, user_id, "Project updated");
        self.index_sync.update(updated.clone());
        Ok(updated)
    }

    /// Soft-delete the project. Owner only.
    pub async fn delete_project(&self, identifier: &str, user_id: &str) -> Result<(), ProjectError> {
        let mut tx = self.pool.begin().await?;

        let project = ProjectRepo::find_by_identifier(&mut *tx, identifier, Some(user_id))
            .await?
            .ok_or_else(|| ProjectError::NotFound(identifier.to_string()))?;
        require_owner(&mut tx, project.id, user_id, identifier).await?;

        let deleted = ProjectRepo::delete_by_id(&mut *tx, project.id, now()).await?;
        if !deleted {
            return Err(ProjectError::NotFound(identifier.to_string()));
        }
        tx.commit().await?;

        tracing::info!(project_id = %project.id, user_id, "Project deleted");
        self.index_sync.delete(project.id);
        Ok(())
    }

    /// Look up a project by id or slug, including soft-deleted ones.
    ///
    /// Bypasses visibility; not exposed over HTTP.
    pub async fn find_including_deleted(
        &self,
        identifier: &str,
    ) -> Result<Option<Project>, ProjectError> {
        Ok(ProjectRepo::find_by_identifier_include_deleted(&self.pool, identifier).await?)
    }
}

/// Non-members get `NotFound`; members with any role but `owner` get
/// `UnauthorisedAction`.
async fn require_owner(
    conn: &mut PgConnection,
    project_id: DbId,
    user_id: &str,
    identifier: &str,
) -> Result<(), ProjectError> {
    let member = ProjectRepo::find_member_by_project_and_user(conn, project_id, user_id)
        .await?
        .ok_or_else(|| ProjectError::NotFound(identifier.to_string()))?;
    if !member.is_owner() {
        tracing::debug!(%project_id, user_id, role = %member.role, "Non-owner write rejected");
        return Err(ProjectError::UnauthorisedAction);
    }
    Ok(())
}
