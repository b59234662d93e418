//! Registration and login endpoints

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{LoginRequest, LoginResponse, RegisterRequest},
    AppState,
};

use super::MessageResponse;

/// Register a new user
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = MessageResponse),
        (status = 400, description = "Missing fields or username/mobile/email already taken", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    request.validate()?;

    state.services.users.register(&request).await?;
    Ok(Json(MessageResponse::new("Register user success")))
}

/// Log in and receive a session token
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "User does not exist", body = crate::error::ErrorResponse),
        (status = 401, description = "Wrong password", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<Json<LoginResponse>> {
    request.validate()?;

    let token = state.services.users.login(&request).await?;
    Ok(Json(LoginResponse { token }))
}
