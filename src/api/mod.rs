//! API handlers for Bookshelf REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::CurrentUser, AppState};

/// Plain confirmation body
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Extractor for the user behind the session token.
///
/// Requests without a valid token are rejected with 403 before the handler runs.
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| AppError::Authorization("Authorization failed".to_string()))?;

        let user = state.services.users.authenticate(token).await?;
        Ok(AuthenticatedUser(user))
    }
}

/// Session token from the Authorization header, bare or with a `Bearer ` prefix
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}
