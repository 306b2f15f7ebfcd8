//! Request principal extraction.
//!
//! Authentication happens upstream; the proxy forwards the verified
//! identity in headers, and every handler consumes it through this
//! extractor. Requests without the headers are rejected before any
//! handler runs.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use scorecast_core::{AppError, Principal, UserId};
use uuid::Uuid;

use crate::error::ApiError;

const USER_ID_HEADER: &str = "x-user-id";
const USER_NAME_HEADER: &str = "x-user-name";

/// The authenticated principal attached to the current request.
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                ApiError(AppError::Unauthorized(format!(
                    "missing {USER_ID_HEADER} header"
                )))
            })?;
        let user_id = Uuid::parse_str(user_id).map_err(|error| {
            ApiError(AppError::Unauthorized(format!(
                "invalid {USER_ID_HEADER} header: {error}"
            )))
        })?;

        let display_name = parts
            .headers
            .get(USER_NAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown");

        Ok(Self(Principal::new(
            UserId::from_uuid(user_id),
            display_name,
        )))
    }
}
