#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::PgPool;
use tower::ServiceExt;

use terraforge_api::auth::jwt::{AuthConfig, Authenticator, Claims};
use terraforge_api::config::{MeiliSearchConfig, ServerConfig};
use terraforge_api::router::build_app_router;
use terraforge_api::services::index_sync::IndexSync;
use terraforge_api::services::project::ProjectService;
use terraforge_api::services::search::SearchService;
use terraforge_api::state::AppState;
use terraforge_core::types::{new_id, DbId};
use terraforge_db::models::enums::{MemberRole, ProjectStatus};
use terraforge_search::InMemorySearchRepo;

/// Shared HS256 secret for test tokens.
pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        env: "test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        meilisearch: MeiliSearchConfig {
            host_url: "http://localhost:7700".to_string(),
            master_key: None,
        },
        auth: AuthConfig {
            auth_url: "http://localhost:3001".to_string(),
            jwt_secret: Some(TEST_SECRET.to_string()),
        },
    }
}

/// Application wired against a test database and an in-memory search index.
pub struct TestApp {
    pub state: AppState,
    pub search_index: InMemorySearchRepo,
    config: ServerConfig,
}

impl TestApp {
    /// A fresh router sharing this app's state.
    ///
    /// Mirrors the router construction in `main.rs` so integration tests
    /// exercise the same middleware stack production uses.
    pub fn router(&self) -> Router {
        build_app_router(self.state.clone(), &self.config)
    }

    pub fn projects(&self) -> &ProjectService {
        &self.state.projects
    }

    pub fn search(&self) -> &SearchService {
        &self.state.search
    }

    /// Wait for every dispatched search propagation to finish.
    pub async fn settle(&self) {
        self.state.index_sync.wait_idle().await;
    }
}

pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let search_index = InMemorySearchRepo::new();
    let repo = Arc::new(search_index.clone());
    let index_sync = IndexSync::new(repo.clone());

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        authenticator: Arc::new(Authenticator::from_secret(TEST_SECRET)),
        projects: ProjectService::new(pool, index_sync.clone()),
        search: SearchService::new(repo),
        index_sync,
    };

    TestApp {
        state,
        search_index,
        config,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user row the way the authentication service would.
pub async fn create_user(pool: &PgPool, id: &str) {
    sqlx::query("INSERT INTO users (id, name, username, email) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(format!("{id} name"))
        .bind(id)
        .bind(format!("{id}@test.com"))
        .execute(pool)
        .await
        .expect("user insert should succeed");
}

/// Give `user_id` a membership with `role` on the project.
pub async fn add_member(pool: &PgPool, project_id: DbId, user_id: &str, role: MemberRole) {
    sqlx::query(
        "INSERT INTO project_members (id, project_id, user_id, role)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(new_id())
    .bind(project_id)
    .bind(user_id)
    .bind(role)
    .execute(pool)
    .await
    .expect("member insert should succeed");
}

/// Move a project to `'approved'` (moderation is not part of the API).
pub async fn approve(pool: &PgPool, project_id: DbId) {
    set_status(pool, project_id, ProjectStatus::Approved).await;
}

pub async fn set_status(pool: &PgPool, project_id: DbId, status: ProjectStatus) {
    sqlx::query("UPDATE projects SET status = $2 WHERE id = $1")
        .bind(project_id)
        .bind(status)
        .execute(pool)
        .await
        .expect("status update should succeed");
}

pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count should succeed");
    row.0
}

/// An HS256 token for `user_id` valid for five minutes.
pub fn token_for(user_id: &str) -> String {
    let claims = Claims {
        id: user_id.to_string(),
        exp: chrono::Utc::now().timestamp() + 300,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("encoding should succeed")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

/// POST a raw, possibly malformed, JSON body.
pub async fn post_raw_auth(app: Router, uri: &str, token: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
