//! The project search repository seam and its Meilisearch implementation.

use async_trait::async_trait;
use terraforge_core::types::DbId;
use terraforge_db::models::enums::ProjectType;
use terraforge_db::models::project::Project;

use crate::client::{IndexSettings, MeiliSearchClient, SearchRequest};
use crate::document::ProjectDocument;
use crate::error::SearchError;

/// Index uid holding project documents.
pub const PROJECTS_INDEX: &str = "projects";

/// Primary key field of [`ProjectDocument`].
pub const PRIMARY_KEY: &str = "id";

/// Fields matched by full-text queries.
pub const SEARCHABLE_ATTRIBUTES: [&str; 4] = ["name", "slug", "summary", "description"];

/// Fields usable in filter expressions.
pub const FILTERABLE_ATTRIBUTES: [&str; 3] = ["type", "downloads", "updatedAt"];

/// One page of matching documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSearchResult {
    pub projects: Vec<ProjectDocument>,
    /// Approximate number of matches across all pages.
    pub total_hits: i64,
}

/// Document-store operations on the projects index.
///
/// Writes are add-or-replace keyed by project id. Callers treat every write
/// as best effort: the relational store stays the source of truth.
#[async_trait]
pub trait SearchRepository: Send + Sync {
    /// Add a newly created project.
    async fn index_project(&self, project: &Project) -> Result<(), SearchError>;

    /// Add or replace the document for an existing project.
    async fn update_project(&self, project: &Project) -> Result<(), SearchError>;

    /// Remove the document for `project_id`. Removing an absent document is not an error.
    async fn delete_project(&self, project_id: DbId) -> Result<(), SearchError>;

    /// Full-text search restricted to one project type.
    async fn find_projects(
        &self,
        query: &str,
        project_type: ProjectType,
        limit: i64,
        offset: i64,
    ) -> Result<ProjectSearchResult, SearchError>;

    /// Check that the engine is reachable.
    async fn health(&self) -> Result<(), SearchError>;

    /// Create the projects index if absent and (re)apply its settings.
    async fn ensure_project_index_exists(&self) -> Result<(), SearchError>;
}

/// [`SearchRepository`] backed by a Meilisearch instance.
#[derive(Clone)]
pub struct MeiliSearchRepo {
    client: MeiliSearchClient,
}

impl MeiliSearchRepo {
    pub fn new(client: MeiliSearchClient) -> Self {
        Self { client }
    }

    fn type_filter(project_type: ProjectType) -> String {
        format!("type = '{project_type}'")
    }
}

#[async_trait]
impl SearchRepository for MeiliSearchRepo {
    async fn index_project(&self, project: &Project) -> Result<(), SearchError> {
        let doc = ProjectDocument::from(project);
        self.client
            .add_documents(PROJECTS_INDEX, &[doc], PRIMARY_KEY)
            .await?;
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> Result<(), SearchError> {
        let doc = ProjectDocument::from(project);
        self.client
            .update_documents(PROJECTS_INDEX, &[doc], PRIMARY_KEY)
            .await?;
        Ok(())
    }

    async fn delete_project(&self, project_id: DbId) -> Result<(), SearchError> {
        self.client
            .delete_document(PROJECTS_INDEX, &project_id.to_string())
            .await?;
        Ok(())
    }

    async fn find_projects(
        &self,
        query: &str,
        project_type: ProjectType,
        limit: i64,
        offset: i64,
    ) -> Result<ProjectSearchResult, SearchError> {
        let request = SearchRequest {
            q: query.to_string(),
            limit,
            offset,
            filter: Some(Self::type_filter(project_type)),
        };
        let response = self
            .client
            .search::<ProjectDocument>(PROJECTS_INDEX, &request)
            .await?;

        Ok(ProjectSearchResult {
            projects: response.hits,
            total_hits: response.estimated_total_hits,
        })
    }

    async fn health(&self) -> Result<(), SearchError> {
        self.client.health().await
    }

    async fn ensure_project_index_exists(&self) -> Result<(), SearchError> {
        if self.client.get_index(PROJECTS_INDEX).await?.is_none() {
            self.client.create_index(PROJECTS_INDEX, PRIMARY_KEY).await?;
            tracing::info!(index = PROJECTS_INDEX, "Search index created");
        }

        let settings = IndexSettings {
            searchable_attributes: Some(SEARCHABLE_ATTRIBUTES.map(String::from).to_vec()),
            filterable_attributes: Some(FILTERABLE_ATTRIBUTES.map(String::from).to_vec()),
        };
        self.client
            .update_settings(PROJECTS_INDEX, &settings)
            .await?;
        tracing::info!(index = PROJECTS_INDEX, "Search index settings applied");
        Ok(())
    }
}
