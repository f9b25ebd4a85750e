//! Integration tests for the project repository.
//!
//! Exercises the repository layer against a real database:
//! - Insert + lookup by id and slug
//! - Visibility rules for draft/approved projects
//! - Slug uniqueness among live projects
//! - Soft delete and the include-deleted lookup
//! - Transaction rollback of project + membership writes

use assert_matches::assert_matches;
use chrono::{SubsecRound, Utc};
use sqlx::PgPool;
use terraforge_db::models::enums::{MemberRole, ProjectStatus, ProjectType};
use terraforge_db::models::project::{CreateProject, Project};
use terraforge_db::models::project_member::ProjectMember;
use terraforge_db::repositories::project_repo::PROJECT_SLUG_UNIQUE;
use terraforge_db::repositories::ProjectRepo;
use terraforge_db::DbError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, id: &str) {
    sqlx::query("INSERT INTO users (id, name, username, email) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(format!("{id} name"))
        .bind(id)
        .bind(format!("{id}@test.com"))
        .execute(pool)
        .await
        .expect("user insert should succeed");
}

fn draft(slug: &str, user_id: &str) -> Project {
    let input = CreateProject {
        name: format!("Project {slug}"),
        slug: slug.to_string(),
        summary: Some("summary".to_string()),
        project_type: ProjectType::Mod,
    };
    Project::new_draft(&input, user_id, Utc::now().trunc_subsecs(6))
}

/// Insert a project and its owner membership in one transaction.
async fn create_owned(pool: &PgPool, slug: &str, user_id: &str) -> Project {
    let project = draft(slug, user_id);
    let member = ProjectMember::owner(project.id, user_id, project.created_at);

    let mut tx = pool.begin().await.unwrap();
    ProjectRepo::insert(&mut *tx, &project).await.unwrap();
    ProjectRepo::insert_member(&mut *tx, &member).await.unwrap();
    tx.commit().await.unwrap();
    project
}

async fn set_status(pool: &PgPool, project: &Project, status: ProjectStatus) {
    sqlx::query("UPDATE projects SET status = $2 WHERE id = $1")
        .bind(project.id)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}

// ---------------------------------------------------------------------------
// Insert + lookup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_insert_then_find_by_id_and_slug(pool: PgPool) {
    create_user(&pool, "owner").await;
    let project = create_owned(&pool, "calamity", "owner").await;

    let by_id = ProjectRepo::find_by_identifier(&pool, &project.id.to_string(), Some("owner"))
        .await
        .unwrap()
        .expect("owner should see draft by id");
    assert_eq!(by_id, project);

    let by_slug = ProjectRepo::find_by_identifier(&pool, "calamity", Some("owner"))
        .await
        .unwrap()
        .expect("owner should see draft by slug");
    assert_eq!(by_slug.id, project.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_identifier_is_none_not_error(pool: PgPool) {
    let found = ProjectRepo::find_by_identifier(&pool, "does-not-exist", None)
        .await
        .unwrap();
    assert!(found.is_none());

    let found = ProjectRepo::find_by_identifier(&pool, &uuid::Uuid::now_v7().to_string(), None)
        .await
        .unwrap();
    assert!(found.is_none());
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_draft_hidden_from_anonymous_and_other_users(pool: PgPool) {
    create_user(&pool, "owner").await;
    create_user(&pool, "stranger").await;
    create_owned(&pool, "secret-mod", "owner").await;

    let anonymous = ProjectRepo::find_by_identifier(&pool, "secret-mod", None)
        .await
        .unwrap();
    assert!(anonymous.is_none());

    let stranger = ProjectRepo::find_by_identifier(&pool, "secret-mod", Some("stranger"))
        .await
        .unwrap();
    assert!(stranger.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_approved_visible_to_everyone(pool: PgPool) {
    create_user(&pool, "owner").await;
    let project = create_owned(&pool, "public-mod", "owner").await;
    set_status(&pool, &project, ProjectStatus::Approved).await;

    for requester in [None, Some("stranger"), Some("owner")] {
        let found = ProjectRepo::find_by_identifier(&pool, "public-mod", requester)
            .await
            .unwrap()
            .expect("approved project should be visible");
        assert_eq!(found.status, ProjectStatus::Approved);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_banned_project_visible_only_to_members(pool: PgPool) {
    create_user(&pool, "owner").await;
    let project = create_owned(&pool, "banned-mod", "owner").await;
    set_status(&pool, &project, ProjectStatus::Banned).await;

    assert!(ProjectRepo::find_by_identifier(&pool, "banned-mod", None)
        .await
        .unwrap()
        .is_none());
    assert!(ProjectRepo::find_by_identifier(&pool, "banned-mod", Some("owner"))
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Slug uniqueness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_slug_is_unique_violation(pool: PgPool) {
    create_user(&pool, "owner").await;
    create_owned(&pool, "taken", "owner").await;

    let result = ProjectRepo::insert(&pool, &draft("taken", "owner")).await;
    assert_matches!(
        result,
        Err(DbError::UniqueViolation { ref constraint }) if constraint == PROJECT_SLUG_UNIQUE
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_slug_reusable_after_soft_delete(pool: PgPool) {
    create_user(&pool, "owner").await;
    create_owned(&pool, "recycled", "owner").await;

    let deleted = ProjectRepo::delete_by_identifier(&pool, "recycled", Utc::now())
        .await
        .unwrap();
    assert!(deleted);

    ProjectRepo::insert(&pool, &draft("recycled", "owner"))
        .await
        .expect("slug of a soft-deleted project should be free");
}

// ---------------------------------------------------------------------------
// Soft delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_deleted_project_only_found_with_include_deleted(pool: PgPool) {
    create_user(&pool, "owner").await;
    let project = create_owned(&pool, "gone", "owner").await;
    set_status(&pool, &project, ProjectStatus::Approved).await;

    let deleted_at = Utc::now().trunc_subsecs(6);
    ProjectRepo::delete_by_identifier(&pool, &project.id.to_string(), deleted_at)
        .await
        .unwrap();

    let visible = ProjectRepo::find_by_identifier(&pool, "gone", Some("owner"))
        .await
        .unwrap();
    assert!(visible.is_none());

    let raw = ProjectRepo::find_by_identifier_include_deleted(&pool, "gone")
        .await
        .unwrap()
        .expect("row persists after soft delete");
    assert_eq!(raw.deleted_at, Some(deleted_at));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_twice_reports_no_rows(pool: PgPool) {
    create_user(&pool, "owner").await;
    create_owned(&pool, "once", "owner").await;

    assert!(ProjectRepo::delete_by_identifier(&pool, "once", Utc::now())
        .await
        .unwrap());
    assert!(!ProjectRepo::delete_by_identifier(&pool, "once", Utc::now())
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_by_id_ignores_slug_equal_to_id_text(pool: PgPool) {
    create_user(&pool, "alice").await;
    create_user(&pool, "bob").await;
    let alice = create_owned(&pool, "alice-mod", "alice").await;
    let bob = create_owned(&pool, &alice.id.to_string(), "bob").await;

    assert!(ProjectRepo::delete_by_id(&pool, alice.id, Utc::now())
        .await
        .unwrap());

    let bob_row = ProjectRepo::find_by_identifier_include_deleted(&pool, &bob.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert!(bob_row.deleted_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_by_identifier_stamps_a_single_row(pool: PgPool) {
    create_user(&pool, "alice").await;
    create_user(&pool, "bob").await;
    let alice = create_owned(&pool, "alice-mod", "alice").await;
    let bob = create_owned(&pool, &alice.id.to_string(), "bob").await;

    assert!(
        ProjectRepo::delete_by_identifier(&pool, &alice.id.to_string(), Utc::now())
            .await
            .unwrap()
    );

    let alice_row = ProjectRepo::find_by_identifier_include_deleted(&pool, "alice-mod")
        .await
        .unwrap()
        .unwrap();
    assert!(alice_row.deleted_at.is_some());
    let bob_row = ProjectRepo::find_by_identifier_include_deleted(&pool, &bob.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert!(bob_row.deleted_at.is_none());
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_writes_fields_and_bumps_updated_at(pool: PgPool) {
    create_user(&pool, "owner").await;
    let mut project = create_owned(&pool, "before", "owner").await;

    project.name = "After".to_string();
    project.slug = "after".to_string();
    project.summary = None;
    project.description = Some("Described".to_string());

    let updated = ProjectRepo::update(&pool, &project)
        .await
        .unwrap()
        .expect("live project should update");
    assert_eq!(updated.name, "After");
    assert_eq!(updated.slug, "after");
    assert_eq!(updated.summary, None);
    assert_eq!(updated.description.as_deref(), Some("Described"));
    assert!(updated.updated_at >= project.updated_at);
    assert_eq!(updated.created_at, project.created_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_soft_deleted_project_affects_nothing(pool: PgPool) {
    create_user(&pool, "owner").await;
    let mut project = create_owned(&pool, "deleted-first", "owner").await;
    ProjectRepo::delete_by_identifier(&pool, "deleted-first", Utc::now())
        .await
        .unwrap();

    project.name = "Should Not Land".to_string();
    let updated = ProjectRepo::update(&pool, &project).await.unwrap();
    assert!(updated.is_none());

    let raw = ProjectRepo::find_by_identifier_include_deleted(&pool, "deleted-first")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw.name, "Project deleted-first");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_into_taken_slug_is_unique_violation(pool: PgPool) {
    create_user(&pool, "owner").await;
    create_owned(&pool, "first", "owner").await;
    let mut second = create_owned(&pool, "second", "owner").await;

    second.slug = "first".to_string();
    let result = ProjectRepo::update(&pool, &second).await;
    assert_matches!(result, Err(DbError::UniqueViolation { .. }));
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_members_listing_includes_user_fields(pool: PgPool) {
    create_user(&pool, "owner").await;
    create_user(&pool, "helper").await;
    let project = create_owned(&pool, "team-mod", "owner").await;

    let mut helper = ProjectMember::owner(project.id, "helper", Utc::now());
    helper.role = MemberRole::Developer;
    ProjectRepo::insert_member(&pool, &helper).await.unwrap();

    let members = ProjectRepo::find_members_by_project_identifier(&pool, "team-mod", Some("helper"))
        .await
        .unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].user_id, "owner");
    assert_eq!(members[0].role, MemberRole::Owner);
    assert_eq!(members[0].username, "owner");
    assert_eq!(members[1].role, MemberRole::Developer);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_members_of_hidden_project_are_empty(pool: PgPool) {
    create_user(&pool, "owner").await;
    create_owned(&pool, "hidden-team", "owner").await;

    let members = ProjectRepo::find_members_by_project_identifier(&pool, "hidden-team", None)
        .await
        .unwrap();
    assert!(members.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_member_by_project_and_user(pool: PgPool) {
    create_user(&pool, "owner").await;
    let project = create_owned(&pool, "lookup", "owner").await;

    let owner = ProjectRepo::find_member_by_project_and_user(&pool, project.id, "owner")
        .await
        .unwrap()
        .expect("owner membership exists");
    assert!(owner.is_owner());

    let stranger = ProjectRepo::find_member_by_project_and_user(&pool, project.id, "stranger")
        .await
        .unwrap();
    assert!(stranger.is_none());
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dropped_transaction_discards_project_and_member(pool: PgPool) {
    create_user(&pool, "owner").await;
    let project = draft("uncommitted", "owner");
    let member = ProjectMember::owner(project.id, "owner", project.created_at);

    {
        let mut tx = pool.begin().await.unwrap();
        ProjectRepo::insert(&mut *tx, &project).await.unwrap();
        ProjectRepo::insert_member(&mut *tx, &member).await.unwrap();
        // Dropped without commit.
    }

    assert_eq!(count(&pool, "projects").await, 0);
    assert_eq!(count(&pool, "project_members").await, 0);
}
