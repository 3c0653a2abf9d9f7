use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use lifeboard_core::models::UserId;
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;

pub const USER_HEADER: &str = "x-user-id";

/// The user a request acts for: the `X-User-Id` header, or the configured
/// default user when the header is absent.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_HEADER) else {
            return Ok(CurrentUser(state.default_user.clone()));
        };

        let id = value
            .to_str()
            .map_err(|_| ApiError::bad_request("X-User-Id header must be visible ASCII"))?
            .trim();
        if id.is_empty() {
            return Err(ApiError::bad_request("X-User-Id header must not be empty"));
        }
        Ok(CurrentUser(UserId::new(id)))
    }
}

/// Parses a record id from a path segment.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id '{}'", raw)))
}
