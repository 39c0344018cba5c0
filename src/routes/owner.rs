use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the id of the calling user.
pub const OWNER_HEADER: &str = "x-user-id";

/// Caller identity, taken from the [`OWNER_HEADER`] header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerId(pub Uuid);

impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(OWNER_HEADER) else {
            return Err(AppError::Unauthorized(format!("missing {OWNER_HEADER} header")));
        };

        value
            .to_str()
            .ok()
            .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
            .map(OwnerId)
            .ok_or_else(|| AppError::Unauthorized(format!("invalid {OWNER_HEADER} header")))
    }
}
