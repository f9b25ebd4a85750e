//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use terraforge_core::types::{new_id, DbId, Timestamp, UserId};
use terraforge_core::validation;

use crate::models::enums::{ProjectStatus, ProjectType};

/// A project row from the `projects` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub downloads: i64,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Set when the project has been soft-deleted. Never exposed over the API.
    #[serde(skip_serializing)]
    pub deleted_at: Option<Timestamp>,
    pub user_id: UserId,
}

impl Project {
    /// Build a fresh `draft` project owned by `user_id`.
    pub fn new_draft(input: &CreateProject, user_id: &str, now: Timestamp) -> Self {
        Self {
            id: new_id(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            summary: input.summary.clone(),
            description: None,
            icon_url: None,
            downloads: 0,
            project_type: input.project_type,
            status: ProjectStatus::Draft,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            user_id: user_id.to_string(),
        }
    }

    /// Apply the non-`None` fields of `input`.
    ///
    /// For the nullable text fields an empty string clears the value.
    pub fn apply_update(&mut self, input: &UpdateProject) {
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(slug) = &input.slug {
            self.slug = slug.clone();
        }
        apply_clearable(&mut self.summary, input.summary.as_deref());
        apply_clearable(&mut self.description, input.description.as_deref());
        apply_clearable(&mut self.icon_url, input.icon_url.as_deref());
    }
}

fn apply_clearable(target: &mut Option<String>, value: Option<&str>) {
    match value {
        None => {}
        Some("") => *target = None,
        Some(value) => *target = Some(value.to_string()),
    }
}

/// DTO for creating a new project. New projects always start as `draft`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub slug: String,
    pub summary: Option<String>,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
}

impl CreateProject {
    /// Check every field, returning one message per violated rule.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Err(e) = validation::validate_name(&self.name) {
            errors.push(e);
        }
        if let Err(e) = validation::validate_slug(&self.slug) {
            errors.push(e);
        }
        if let Some(Err(e)) = self.summary.as_deref().map(validation::validate_summary) {
            errors.push(e);
        }
        errors
    }
}

/// DTO for updating an existing project. All fields are optional.
///
/// `summary`, `description` and `icon_url` treat `""` as "clear this field".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
}

impl UpdateProject {
    /// Check every present field, returning one message per violated rule.
    pub fn validate(&self) -> Vec<String> {
        let checks = [
            self.name.as_deref().map(validation::validate_name),
            self.slug.as_deref().map(validation::validate_slug),
            self.summary.as_deref().map(validation::validate_summary),
            self.icon_url.as_deref().map(validation::validate_icon_url),
        ];
        checks
            .into_iter()
            .flatten()
            .filter_map(Result::err)
            .collect()
    }
}
