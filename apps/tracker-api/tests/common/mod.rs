#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;

use tracker_api::config::{with_test_db_suffix, Config};
use tracker_api::db::memory::MemoryMarkerStore;
use tracker_api::db::postgres::PgMarkerStore;
use tracker_api::AppState;

pub const IDENTITY_HEADER: &str = "x-user-id";

/// Config for router tests. The database URL is never dialled.
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/viewtracker_test".to_string(),
        port: 0,
        fallback_redirect: "/inbox".to_string(),
        identity_header: IDENTITY_HEADER.to_string(),
        db_pool_size: 2,
    }
}

/// Build a test AppState over an in-memory marker store.
pub fn test_state() -> (AppState, Arc<MemoryMarkerStore>) {
    let store = Arc::new(MemoryMarkerStore::new());
    let state = AppState {
        markers: store.clone(),
        config: Arc::new(test_config()),
    };
    (state, store)
}

/// Build the full application router wired to the test state.
pub fn test_app() -> (Router, AppState, Arc<MemoryMarkerStore>) {
    let (state, store) = test_state();
    let app = tracker_api::routes::router().with_state(state.clone());
    (app, state, store)
}

/// Connect a PostgreSQL marker store to the `_test` database.
///
/// Requires DATABASE_URL and a migrated test database
/// (`cargo run -p tracker-api --bin tracker-migrate -- --test`).
pub async fn pg_store() -> PgMarkerStore {
    let env_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(env_path);

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL env var is required");
    let db = tracker_api::db::pool::connect(&with_test_db_suffix(&database_url), 2).await;
    PgMarkerStore::new(db)
}

/// A user id unlikely to collide with other test runs.
pub fn unique_user(tag: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("usr_{tag}_{nanos}")
}

/// Remove every marker for a user.
pub async fn cleanup_user(store: &PgMarkerStore, user_id: &str) {
    use diesel::prelude::*;
    use diesel_async::RunQueryDsl;
    use tracker_api::db::schema::{global_markers, instance_markers, model_markers};

    let mut conn = store.pool().get().await.expect("pool");
    diesel::delete(global_markers::table.filter(global_markers::user_id.eq(user_id)))
        .execute(&mut conn)
        .await
        .ok();
    diesel::delete(model_markers::table.filter(model_markers::user_id.eq(user_id)))
        .execute(&mut conn)
        .await
        .ok();
    diesel::delete(instance_markers::table.filter(instance_markers::user_id.eq(user_id)))
        .execute(&mut conn)
        .await
        .ok();
}
