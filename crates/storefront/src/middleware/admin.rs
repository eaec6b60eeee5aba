//! Admin token extractor.
//!
//! Guards maintenance endpoints (claim reset) that a scheduler calls. When
//! no `SPACEGOODS_ADMIN_TOKEN` is configured the guard lets every request
//! through; startup logs a warning in that case.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires `Authorization: Bearer <admin token>`.
///
/// # Example
///
/// ```rust,ignore
/// async fn reset(_admin: RequireAdmin, State(state): State<AppState>) -> impl IntoResponse {
///     // ...
/// }
/// ```
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config().admin_token.as_ref() else {
            return Ok(Self);
        };

        let provided = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        match provided {
            Some(token) if constant_time_compare(token, expected.expose_secret()) => Ok(Self),
            _ => {
                tracing::warn!(path = %parts.uri.path(), "Rejected admin request");
                Err(AppError::Unauthorized(
                    "Missing or invalid admin token".to_string(),
                ))
            }
        }
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
