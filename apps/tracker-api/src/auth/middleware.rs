//! Viewer identity extraction.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use viewtracker_common::Identity;

use crate::AppState;

/// Identity of the caller, read from the header the upstream identity
/// provider sets. A missing or blank header means anonymous.
#[derive(Debug, Clone)]
pub struct Viewer(pub Identity);

/// Rejection returned when the identity header is present but unreadable.
pub struct IdentityError {
    message: &'static str,
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": "UNAUTHORIZED",
                "message": self.message
            }
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = IdentityError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let value = match parts.headers.get(state.config.identity_header.as_str()) {
            Some(v) => Some(v.to_str().map_err(|_| IdentityError {
                message: "Malformed identity header",
            })?),
            None => None,
        };

        Ok(Viewer(Identity::from_header(value)))
    }
}
