use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terraforge_api::auth::jwt::Authenticator;
use terraforge_api::config::ServerConfig;
use terraforge_api::router::build_app_router;
use terraforge_api::services::index_sync::IndexSync;
use terraforge_api::services::project::ProjectService;
use terraforge_api::services::search::SearchService;
use terraforge_api::state::AppState;
use terraforge_search::{MeiliSearchClient, MeiliSearchRepo, SearchRepository};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terraforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(env = %config.env, host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = terraforge_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    terraforge_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    terraforge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Search ---
    let meili = MeiliSearchClient::new(
        config.meilisearch.host_url.clone(),
        config.meilisearch.master_key.clone(),
    );
    let search_repo: Arc<dyn SearchRepository> = Arc::new(MeiliSearchRepo::new(meili));

    // The index is a best-effort mirror; an unreachable engine must not stop startup.
    match search_repo.ensure_project_index_exists().await {
        Ok(()) => tracing::info!("Search index ready"),
        Err(e) => tracing::error!(error = %e, "Failed to prepare search index"),
    }

    // --- Auth ---
    let authenticator = Authenticator::from_config(&config.auth)
        .await
        .expect("Failed to initialise token verification");
    tracing::info!(
        shared_secret = config.auth.jwt_secret.is_some(),
        "Token verification initialised"
    );

    // --- Services ---
    let index_sync = IndexSync::new(Arc::clone(&search_repo));
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        authenticator: Arc::new(authenticator),
        projects: ProjectService::new(pool.clone(), index_sync.clone()),
        search: SearchService::new(search_repo),
        index_sync: index_sync.clone(),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!(
        pending = index_sync.in_flight(),
        "Server stopped accepting connections, draining search propagations"
    );

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, index_sync.wait_idle()).await.is_err() {
        tracing::warn!(
            pending = index_sync.in_flight(),
            "Search propagations still running at shutdown timeout"
        );
    }

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
