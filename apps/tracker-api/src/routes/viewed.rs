//! View-tracking endpoints: mark-as-viewed and has-viewed queries.
//!
//! Mark endpoints only accept POST and redirect back to the referring page
//! (or the configured fallback) when done.

use axum::extract::{Path, Query, State};
use axum::http::header::{HOST, REFERER};
use axum::http::HeaderMap;
use axum::response::Redirect;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use viewtracker_common::{InputError, InstanceId, LastUpdate, Trackable};

use crate::auth::middleware::Viewer;
use crate::error::{ApiError, ApiErrorBody};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/viewed", post(mark_all_viewed))
        .route("/viewed/last-activity", get(last_activity))
        .route("/viewed/models/{model}", post(mark_model_viewed))
        .route(
            "/viewed/models/{model}/instances/{instance_id}",
            post(mark_instance_viewed).get(has_viewed),
        )
}

/// An item addressed by URL. It carries no fields, so `last_update` must
/// come from the query string.
struct ItemRef {
    model: String,
    instance_id: InstanceId,
}

impl ItemRef {
    fn from_path(path: ItemPath) -> Result<Self, InputError> {
        Ok(Self {
            instance_id: InstanceId::new(path.instance_id)?,
            model: path.model,
        })
    }
}

impl Trackable for ItemRef {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn instance_id(&self) -> InstanceId {
        self.instance_id.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemPath {
    pub model: String,
    pub instance_id: String,
}

fn redirect_back(headers: &HeaderMap, state: &AppState) -> Redirect {
    let host = headers.get(HOST).and_then(|v| v.to_str().ok());
    let target = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|referer| is_local_referer(referer, host))
        .unwrap_or(state.config.fallback_redirect.as_str());
    Redirect::to(target)
}

/// Only relative paths and absolute URLs on the request's own host may be
/// redirected back to.
fn is_local_referer(referer: &str, host: Option<&str>) -> bool {
    if referer.starts_with('/') {
        return !referer.starts_with("//") && !referer.starts_with("/\\");
    }

    let Some(rest) = referer
        .strip_prefix("https://")
        .or_else(|| referer.strip_prefix("http://"))
    else {
        return false;
    };
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();

    host.is_some_and(|host| !authority.is_empty() && authority.eq_ignore_ascii_case(host))
}

// ---------------------------------------------------------------------------
// POST /api/v1/viewed
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/viewed",
    tag = "Viewed",
    responses(
        (status = 303, description = "Everything marked as viewed; redirects to the referer"),
        (status = 401, description = "Malformed identity header", body = ApiErrorBody),
    ),
)]
pub async fn mark_all_viewed(
    Viewer(identity): Viewer,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Redirect, ApiError> {
    state.tracker(identity).mark_all_viewed().await?;
    Ok(redirect_back(&headers, &state))
}

// ---------------------------------------------------------------------------
// POST /api/v1/viewed/models/:model
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/viewed/models/{model}",
    tag = "Viewed",
    params(
        ("model" = String, Path, description = "Model name"),
    ),
    responses(
        (status = 303, description = "Model marked as viewed; redirects to the referer"),
        (status = 400, description = "Invalid model name", body = ApiErrorBody),
    ),
)]
pub async fn mark_model_viewed(
    Viewer(identity): Viewer,
    State(state): State<AppState>,
    Path(model): Path<String>,
    headers: HeaderMap,
) -> Result<Redirect, ApiError> {
    state
        .tracker(identity)
        .mark_model_viewed(model.as_str())
        .await?;
    Ok(redirect_back(&headers, &state))
}

// ---------------------------------------------------------------------------
// POST /api/v1/viewed/models/:model/instances/:instance_id
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/viewed/models/{model}/instances/{instance_id}",
    tag = "Viewed",
    params(
        ("model" = String, Path, description = "Model name"),
        ("instance_id" = String, Path, description = "Instance ID"),
    ),
    responses(
        (status = 303, description = "Instance marked as viewed; redirects to the referer"),
        (status = 400, description = "Invalid model name or instance ID", body = ApiErrorBody),
    ),
)]
pub async fn mark_instance_viewed(
    Viewer(identity): Viewer,
    State(state): State<AppState>,
    Path(path): Path<ItemPath>,
    headers: HeaderMap,
) -> Result<Redirect, ApiError> {
    let item = ItemRef::from_path(path)?;
    state.tracker(identity).mark_instance_viewed(&item).await?;
    Ok(redirect_back(&headers, &state))
}

// ---------------------------------------------------------------------------
// GET /api/v1/viewed/models/:model/instances/:instance_id
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HasViewedQuery {
    /// When the item was last modified (RFC 3339).
    pub last_update: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HasViewedResponse {
    pub viewed: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/viewed/models/{model}/instances/{instance_id}",
    tag = "Viewed",
    params(
        ("model" = String, Path, description = "Model name"),
        ("instance_id" = String, Path, description = "Instance ID"),
        HasViewedQuery,
    ),
    responses(
        (status = 200, description = "Whether the viewer has seen the item since it last changed", body = HasViewedResponse),
        (status = 400, description = "Missing or invalid last_update", body = ApiErrorBody),
    ),
)]
pub async fn has_viewed(
    Viewer(identity): Viewer,
    State(state): State<AppState>,
    Path(path): Path<ItemPath>,
    Query(query): Query<HasViewedQuery>,
) -> Result<Json<HasViewedResponse>, ApiError> {
    // Anonymous viewers have seen everything, whatever the input.
    if identity.is_anonymous() {
        return Ok(Json(HasViewedResponse { viewed: true }));
    }

    let last_update = match query.last_update.as_deref() {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|_| ApiError::bad_request("last_update must be an RFC 3339 timestamp"))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    let item = ItemRef::from_path(path)?;
    let viewed = state
        .tracker(identity)
        .has_viewed(&item, LastUpdate::from(last_update))
        .await?;

    Ok(Json(HasViewedResponse { viewed }))
}

// ---------------------------------------------------------------------------
// GET /api/v1/viewed/last-activity
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct LastActivityResponse {
    pub last_activity: Option<DateTime<Utc>>,
}

#[utoipa::path(
    get,
    path = "/api/v1/viewed/last-activity",
    tag = "Viewed",
    responses(
        (status = 200, description = "Most recent view across all tiers", body = LastActivityResponse),
    ),
)]
pub async fn last_activity(
    Viewer(identity): Viewer,
    State(state): State<AppState>,
) -> Result<Json<LastActivityResponse>, ApiError> {
    let last_activity = state.tracker(identity).last_activity().await?;
    Ok(Json(LastActivityResponse { last_activity }))
}
