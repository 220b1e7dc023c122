use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::info;

use cms_types::api::{ChangePasswordRequest, SignupRequest, UserListResponse};
use cms_types::commands::{Credentials, validate_password};
use cms_types::models::AuthUser;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/signup: creates a regular (non-admin) user.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    let creds = Credentials::try_from(req)?;

    state
        .credentials
        .create_user(&creds.handle, &creds.password, false)
        .await?;

    info!("Signed up {}", creds.handle);
    Ok(StatusCode::OK)
}

/// POST /api/login: the auth layer has already checked the credentials.
pub async fn login(Extension(user): Extension<AuthUser>) -> StatusCode {
    info!("Login ok for {}", user.handle);
    StatusCode::OK
}

/// POST /api/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    validate_password(&req.password)?;

    state
        .credentials
        .change_password(&user.handle, &req.password)
        .await?;

    Ok(StatusCode::OK)
}

/// GET /api/admin/users: admins only.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserListResponse>, ApiError> {
    if !user.is_admin {
        return Err(ApiError::Forbidden);
    }

    let handles = state.credentials.list_handles().await?;
    Ok(Json(UserListResponse { handles }))
}
