//! Best-effort propagation of committed project changes to the search index.
//!
//! Each propagation runs on its own detached task so the request that
//! triggered it never waits for the index. Failures are logged and dropped;
//! nothing is retried, so the index can lag behind or miss a change until the
//! project is written again. Two propagations for the same project are not
//! ordered relative to each other: the last index write wins, which is not
//! necessarily the last commit.

use std::sync::Arc;

use terraforge_core::types::DbId;
use terraforge_db::models::project::Project;
use terraforge_search::SearchRepository;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;

enum IndexOp {
    Index(Project),
    Update(Project),
    Delete(DbId),
}

impl IndexOp {
    fn name(&self) -> &'static str {
        match self {
            IndexOp::Index(_) => "index",
            IndexOp::Update(_) => "update",
            IndexOp::Delete(_) => "delete",
        }
    }

    fn project_id(&self) -> DbId {
        match self {
            IndexOp::Index(project) | IndexOp::Update(project) => project.id,
            IndexOp::Delete(id) => *id,
        }
    }
}

/// Dispatches index writes onto tracked background tasks.
///
/// Cheaply cloneable; clones share the repository and the task tracker.
#[derive(Clone)]
pub struct IndexSync {
    repo: Arc<dyn SearchRepository>,
    tracker: TaskTracker,
    /// Held across close/wait/reopen so one drain cannot reopen the tracker
    /// under another.
    draining: Arc<Mutex<()>>,
}

impl IndexSync {
    pub fn new(repo: Arc<dyn SearchRepository>) -> Self {
        Self {
            repo,
            tracker: TaskTracker::new(),
            draining: Arc::new(Mutex::new(())),
        }
    }

    /// Add a newly created project to the index.
    pub fn index(&self, project: Project) {
        self.dispatch(IndexOp::Index(project));
    }

    /// Replace the indexed document of an updated project.
    pub fn update(&self, project: Project) {
        self.dispatch(IndexOp::Update(project));
    }

    /// Remove a deleted project from the index.
    pub fn delete(&self, project_id: DbId) {
        self.dispatch(IndexOp::Delete(project_id));
    }

    /// Number of propagations still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every propagation dispatched so far has finished.
    ///
    /// Used at shutdown to drain pending writes, and by tests to observe the
    /// settled index. Dispatching keeps working afterwards. Concurrent
    /// callers drain one after another.
    pub async fn wait_idle(&self) {
        let _guard = self.draining.lock().await;
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    fn dispatch(&self, op: IndexOp) {
        let repo = Arc::clone(&self.repo);
        self.tracker.spawn(async move {
            let action = op.name();
            let project_id = op.project_id();
            let result = match &op {
                IndexOp::Index(project) => repo.index_project(project).await,
                IndexOp::Update(project) => repo.update_project(project).await,
                IndexOp::Delete(id) => repo.delete_project(*id).await,
            };
            match result {
                Ok(()) => tracing::debug!(%project_id, action, "Search index updated"),
                Err(e) => tracing::error!(
                    error = %e,
                    %project_id,
                    action,
                    "Search index propagation failed"
                ),
            }
        });
    }
}
