use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use incollege_shared::clients::db::DbPool;
use incollege_shared::middleware::metrics_middleware;
use incollege_shared::types::auth::AuthConfig;

pub mod config;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;

use config::AppConfig;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AuthConfig for AppState {
    fn jwt_secret(&self) -> &str {
        &self.config.jwt_secret
    }
}

/// Bring the schema up to date. Safe to call on every start.
pub fn run_migrations(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("failed to run migrations: {e}"))?;
    if !applied.is_empty() {
        tracing::info!(count = applied.len(), "applied database migrations");
    }
    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        // Directory and account
        .route("/list-users", get(routes::users::list_users))
        .route("/lookup-user", post(routes::users::lookup_user))
        .route("/login", post(routes::users::login))
        .route("/add-user", post(routes::users::add_user))
        // Profile and job history
        .route("/profile", get(routes::profile::get_profile))
        .route("/edit-profile", post(routes::profile::edit_profile))
        .route("/friend-profile", post(routes::profile::friend_profile))
        .route("/job-history", get(routes::profile::job_history))
        .route("/add-job-history", post(routes::profile::add_job_history))
        .route("/edit-job-history", post(routes::profile::edit_job_history))
        .route("/remove-job-history", post(routes::profile::remove_job_history))
        // Connections
        .route("/make-connection-request", post(routes::connections::make_request))
        .route("/pending-requests", get(routes::connections::pending_requests))
        .route("/accept-requests", post(routes::connections::consider_requests))
        .route("/connections", get(routes::connections::list_connections))
        .route("/disconnect", post(routes::connections::disconnect))
        // Jobs
        .route("/post-job", post(routes::jobs::post_job))
        .route("/job-postings", get(routes::jobs::list_postings))
        .route("/jobs-posted", get(routes::jobs::list_own_postings))
        .route("/delete-job", post(routes::jobs::delete_job))
        .route("/apply", post(routes::jobs::apply))
        .route("/applications", get(routes::jobs::list_applied))
        .route("/unapplied", get(routes::jobs::list_unapplied))
        .route("/expired-applications", get(routes::jobs::expired_applications))
        .route("/mark", post(routes::jobs::mark))
        .route("/unmark", post(routes::jobs::unmark))
        .route("/marked", get(routes::jobs::list_marked))
        // Messaging
        .route("/unread-messages", get(routes::messages::unread_messages))
        .route("/messages", post(routes::messages::fetch_messages))
        .route("/message", post(routes::messages::send_message))
        .route("/start-conversation", post(routes::messages::start_conversation))
        .route("/delete-conversation", post(routes::messages::delete_conversation))
        // Preferences and notifications
        .route("/user-preferences", get(routes::preferences::get_preferences))
        .route("/set-user-preferences", post(routes::preferences::set_preferences))
        .route("/notifications", post(routes::notifications::fetch_notifications))
        .route_layer(axum::middleware::from_fn(metrics_middleware))
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
