pub mod health;
pub mod viewed;

use axum::Router;
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1", viewed::router())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Viewed
        viewed::mark_all_viewed,
        viewed::mark_model_viewed,
        viewed::mark_instance_viewed,
        viewed::has_viewed,
        viewed::last_activity,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            // Route request/response types
            health::HealthResponse,
            viewed::HasViewedResponse,
            viewed::LastActivityResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Viewed", description = "View tracking"),
    )
)]
pub struct ApiDoc;
