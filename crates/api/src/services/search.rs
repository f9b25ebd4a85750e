//! Read-side project search over the index.

use std::sync::Arc;

use terraforge_core::search::{clamp_limit, clamp_offset, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use terraforge_db::models::enums::ProjectType;
use terraforge_db::models::project::Project;
use terraforge_search::{SearchError, SearchRepository};

/// One page of search results with the bounds actually applied.
#[derive(Debug, Clone)]
pub struct ProjectSearchPage {
    pub projects: Vec<Project>,
    /// Approximate, as reported by the engine.
    pub total_hits: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Clone)]
pub struct SearchService {
    repo: Arc<dyn SearchRepository>,
}

impl SearchService {
    pub fn new(repo: Arc<dyn SearchRepository>) -> Self {
        Self { repo }
    }

    /// Search projects of `project_type`.
    ///
    /// `limit` falls back to the default when missing or below 1 and is capped
    /// at the maximum; `offset` falls back to 0 when missing or negative.
    pub async fn search_projects(
        &self,
        query: &str,
        project_type: ProjectType,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<ProjectSearchPage, SearchError> {
        let limit = clamp_limit(limit, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT);
        let offset = clamp_offset(offset);

        let result = self
            .repo
            .find_projects(query, project_type, limit, offset)
            .await?;
        let projects = result
            .projects
            .into_iter()
            .map(Project::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProjectSearchPage {
            projects,
            total_hits: result.total_hits,
            limit,
            offset,
        })
    }

    /// Whether the search engine is reachable.
    pub async fn health(&self) -> Result<(), SearchError> {
        self.repo.health().await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use terraforge_db::models::project::CreateProject;
    use terraforge_search::InMemorySearchRepo;

    use super::*;

    async fn seeded(count: usize) -> SearchService {
        let repo = InMemorySearchRepo::new();
        for i in 0..count {
            let input = CreateProject {
                name: format!("Mod {i}"),
                slug: format!("mod-{i}"),
                summary: None,
                project_type: ProjectType::Mod,
            };
            let project = Project::new_draft(&input, "user-1", Utc::now());
            repo.index_project(&project).await.unwrap();
        }
        SearchService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn oversized_limit_is_capped() {
        let service = seeded(120).await;
        let page = service
            .search_projects("", ProjectType::Mod, Some(500), None)
            .await
            .unwrap();
        assert_eq!(page.limit, MAX_SEARCH_LIMIT);
        assert_eq!(page.projects.len(), 100);
        assert_eq!(page.total_hits, 120);
    }

    #[tokio::test]
    async fn zero_or_negative_limit_uses_default() {
        let service = seeded(15).await;
        for limit in [Some(0), Some(-3), None] {
            let page = service
                .search_projects("", ProjectType::Mod, limit, None)
                .await
                .unwrap();
            assert_eq!(page.limit, DEFAULT_SEARCH_LIMIT);
            assert_eq!(page.projects.len(), 10);
        }
    }

    #[tokio::test]
    async fn negative_offset_is_zero() {
        let service = seeded(3).await;
        let page = service
            .search_projects("", ProjectType::Mod, None, Some(-5))
            .await
            .unwrap();
        assert_eq!(page.offset, 0);
        assert_eq!(page.projects.len(), 3);
    }

    #[tokio::test]
    async fn documents_map_back_to_projects() {
        let service = seeded(1).await;
        let page = service
            .search_projects("mod-0", ProjectType::Mod, None, None)
            .await
            .unwrap();
        assert_eq!(page.projects[0].slug, "mod-0");
        assert!(page.projects[0].deleted_at.is_none());
    }
}
