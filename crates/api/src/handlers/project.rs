//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use terraforge_core::error::CoreError;
use terraforge_core::search::{clamp_limit, clamp_offset, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use terraforge_core::types::UserId;
use terraforge_db::models::enums::{MemberRole, ProjectType};
use terraforge_db::models::project::{CreateProject, Project, UpdateProject};
use terraforge_db::models::project_member::ProjectMemberWithUser;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

/// A project member as listed by `GET /projects/{identifier}/members`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMemberResponse {
    pub username: String,
    pub user_id: UserId,
    pub image: Option<String>,
    pub role: MemberRole,
}

impl From<ProjectMemberWithUser> for ProjectMemberResponse {
    fn from(member: ProjectMemberWithUser) -> Self {
        Self {
            username: member.username,
            user_id: member.user_id,
            image: member.image,
            role: member.role,
        }
    }
}

/// Query parameters of `GET /projects`.
///
/// All fields are taken as raw text: unparsable `limit` and `offset` fall
/// back to the defaults, and an unknown `type` matches nothing, instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Response body of `GET /projects`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub data: Vec<Project>,
    pub total_hits: i64,
    pub limit: i64,
    pub offset: i64,
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn reject_invalid(errors: Vec<String>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(errors.join("; "))))
    }
}

/// POST /v1/projects
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    reject_invalid(input.validate())?;
    let project = state
        .projects
        .create_user_project(&input, &user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /v1/projects
pub async fn search(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let limit = parse_number(params.limit.as_deref());
    let offset = parse_number(params.offset.as_deref());

    let project_type = match params.project_type.as_deref() {
        None => ProjectType::Mod,
        Some(text) => match text.parse::<ProjectType>() {
            Ok(project_type) => project_type,
            Err(e) => {
                tracing::debug!(error = %e, "Search for unknown project type");
                return Ok(Json(SearchResponse {
                    data: Vec::new(),
                    total_hits: 0,
                    limit: clamp_limit(limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT),
                    offset: clamp_offset(offset),
                }));
            }
        },
    };

    let page = state
        .search
        .search_projects(
            params.query.as_deref().unwrap_or_default(),
            project_type,
            limit,
            offset,
        )
        .await?;

    Ok(Json(SearchResponse {
        data: page.projects,
        total_hits: page.total_hits,
        limit: page.limit,
        offset: page.offset,
    }))
}

/// GET /v1/projects/{identifier}
pub async fn get_by_identifier(
    State(state): State<AppState>,
    requester: MaybeAuthUser,
    Path(identifier): Path<String>,
) -> AppResult<Json<Project>> {
    let project = state
        .projects
        .get_project_by_identifier(&identifier, requester.user_id())
        .await?;
    Ok(Json(project))
}

/// GET /v1/projects/{identifier}/members
pub async fn list_members(
    State(state): State<AppState>,
    requester: MaybeAuthUser,
    Path(identifier): Path<String>,
) -> AppResult<Json<Vec<ProjectMemberResponse>>> {
    let members = state
        .projects
        .get_project_members(&identifier, requester.user_id())
        .await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// PATCH /v1/projects/{identifier}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(identifier): Path<String>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<Json<Project>> {
    reject_invalid(input.validate())?;
    let project = state
        .projects
        .update_project(&identifier, &input, &user.user_id)
        .await?;
    Ok(Json(project))
}

/// DELETE /v1/projects/{identifier}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(identifier): Path<String>,
) -> AppResult<StatusCode> {
    state
        .projects
        .delete_project(&identifier, &user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
