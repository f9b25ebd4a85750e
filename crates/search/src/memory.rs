//! In-process [`SearchRepository`] for tests and local development without
//! a Meilisearch instance.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use terraforge_core::types::DbId;
use terraforge_db::models::enums::ProjectType;
use terraforge_db::models::project::Project;
use tokio::sync::RwLock;

use crate::document::ProjectDocument;
use crate::error::SearchError;
use crate::repository::{ProjectSearchResult, SearchRepository};

/// Documents held in an ordered map keyed by id string. Ids are UUIDv7, so
/// iteration order is creation order.
///
/// Clone-friendly: clones share the same storage and availability switch.
#[derive(Clone, Default)]
pub struct InMemorySearchRepo {
    documents: Arc<RwLock<BTreeMap<String, ProjectDocument>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemorySearchRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with [`SearchError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The stored document for `id`, if any.
    pub async fn document(&self, id: DbId) -> Option<ProjectDocument> {
        self.documents.read().await.get(&id.to_string()).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), SearchError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SearchError::Unavailable);
        }
        Ok(())
    }

    async fn put(&self, project: &Project) -> Result<(), SearchError> {
        self.check_available()?;
        let doc = ProjectDocument::from(project);
        self.documents.write().await.insert(doc.id.clone(), doc);
        Ok(())
    }
}

fn matches_query(doc: &ProjectDocument, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let fields = [
        Some(doc.name.as_str()),
        Some(doc.slug.as_str()),
        doc.summary.as_deref(),
        doc.description.as_deref(),
    ];
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle))
}

#[async_trait]
impl SearchRepository for InMemorySearchRepo {
    async fn index_project(&self, project: &Project) -> Result<(), SearchError> {
        self.put(project).await
    }

    async fn update_project(&self, project: &Project) -> Result<(), SearchError> {
        self.put(project).await
    }

    async fn delete_project(&self, project_id: DbId) -> Result<(), SearchError> {
        self.check_available()?;
        self.documents.write().await.remove(&project_id.to_string());
        Ok(())
    }

    async fn find_projects(
        &self,
        query: &str,
        project_type: ProjectType,
        limit: i64,
        offset: i64,
    ) -> Result<ProjectSearchResult, SearchError> {
        self.check_available()?;
        let needle = query.trim().to_lowercase();
        let documents = self.documents.read().await;

        let matching: Vec<&ProjectDocument> = documents
            .values()
            .filter(|doc| doc.project_type == project_type.as_str())
            .filter(|doc| matches_query(doc, &needle))
            .collect();

        let total_hits = matching.len() as i64;
        let projects = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok(ProjectSearchResult {
            projects,
            total_hits,
        })
    }

    async fn health(&self) -> Result<(), SearchError> {
        self.check_available()
    }

    async fn ensure_project_index_exists(&self) -> Result<(), SearchError> {
        self.check_available()
    }
}
