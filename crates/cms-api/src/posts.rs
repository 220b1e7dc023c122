use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use cms_types::api::{
    BodyResponse, ModifyRequest, PostIdRequest, PostListResponse, UploadRequest, UploadResponse,
};
use cms_types::commands::{ModifyPost, NewPost};
use cms_types::models::{AuthUser, PostSummary, PublicPost};

use crate::error::ApiError;
use crate::state::AppState;
use crate::visibility::public_posts;

// -- Authenticated ("work") routes --

/// POST /api/work/upload
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let Json(req) = payload?;
    let post = NewPost::try_from(req)?;

    let id = state.documents.upload(user.id, post).await?;
    Ok(Json(UploadResponse { id }))
}

/// POST /api/work/modify
pub async fn modify(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    payload: Result<Json<ModifyRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;
    let cmd = ModifyPost::try_from(req)?;

    state.documents.modify(cmd).await?;
    Ok(StatusCode::OK)
}

/// POST /api/work/delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    payload: Result<Json<PostIdRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = payload?;

    state.documents.delete(req.id).await?;
    Ok(StatusCode::OK)
}

/// POST /api/work/get-body: drafts and archived posts included.
pub async fn get_body(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
    payload: Result<Json<PostIdRequest>, JsonRejection>,
) -> Result<Json<BodyResponse>, ApiError> {
    let Json(req) = payload?;

    let (body, _) = state.documents.get_body(req.id).await?;
    Ok(Json(BodyResponse { body }))
}

/// GET /api/work/posts: every post with full metadata.
pub async fn list_all(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<PostListResponse<PostSummary>>, ApiError> {
    let posts = state.documents.list_all().await?;
    Ok(Json(PostListResponse { posts }))
}

// -- Public routes --

/// GET /api/posts: published posts only.
pub async fn public_list(
    State(state): State<AppState>,
) -> Result<Json<PostListResponse<PublicPost>>, ApiError> {
    let posts = state.documents.list_all().await?;
    Ok(Json(PostListResponse {
        posts: public_posts(posts),
    }))
}

/// POST /api/posts/get-body: a hidden post answers exactly like a missing one.
pub async fn public_get_body(
    State(state): State<AppState>,
    payload: Result<Json<PostIdRequest>, JsonRejection>,
) -> Result<Json<BodyResponse>, ApiError> {
    let Json(req) = payload?;

    let (body, hidden) = state.documents.get_body(req.id).await?;
    if hidden {
        return Err(ApiError::NotFound);
    }
    Ok(Json(BodyResponse { body }))
}
