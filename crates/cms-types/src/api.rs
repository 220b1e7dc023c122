use serde::{Deserialize, Serialize};

// -- Auth --

/// No `Debug`: carries a plaintext password.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub handle: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub handles: Vec<String>,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadRequest {
    pub title: String,
    pub tags: Vec<String>,
    pub draft: bool,
    pub archived: bool,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: i64,
}

/// Partial update: every field except `id` may be omitted (or null).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModifyRequest {
    pub id: i64,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub draft: Option<bool>,
    pub archived: Option<bool>,
    pub body: Option<String>,
}

/// Body of delete and get-body calls.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostIdRequest {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BodyResponse {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponse<T> {
    pub posts: Vec<T>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
