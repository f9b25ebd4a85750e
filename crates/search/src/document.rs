//! The search-index projection of a project.

use serde::{Deserialize, Serialize};
use terraforge_core::types::{DbId, Timestamp, UserId};
use terraforge_db::models::project::Project;

use crate::error::SearchError;

/// A project as stored in the `projects` index. Enums are flattened to text
/// and the id is stored in its hyphenated string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub downloads: i64,
    #[serde(rename = "type")]
    pub project_type: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub user_id: UserId,
}

impl From<&Project> for ProjectDocument {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.to_string(),
            name: project.name.clone(),
            slug: project.slug.clone(),
            summary: project.summary.clone(),
            description: project.description.clone(),
            icon_url: project.icon_url.clone(),
            downloads: project.downloads,
            project_type: project.project_type.to_string(),
            status: project.status.to_string(),
            created_at: project.created_at,
            updated_at: project.updated_at,
            user_id: project.user_id.clone(),
        }
    }
}

impl TryFrom<ProjectDocument> for Project {
    type Error = SearchError;

    fn try_from(doc: ProjectDocument) -> Result<Self, Self::Error> {
        let id: DbId = doc
            .id
            .parse()
            .map_err(|e| SearchError::InvalidDocument(format!("id '{}': {e}", doc.id)))?;
        let project_type = doc
            .project_type
            .parse()
            .map_err(|e| SearchError::InvalidDocument(format!("{e}")))?;
        let status = doc
            .status
            .parse()
            .map_err(|e| SearchError::InvalidDocument(format!("{e}")))?;

        Ok(Project {
            id,
            name: doc.name,
            slug: doc.slug,
            summary: doc.summary,
            description: doc.description,
            icon_url: doc.icon_url,
            downloads: doc.downloads,
            project_type,
            status,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            deleted_at: None,
            user_id: doc.user_id,
        })
    }
}
