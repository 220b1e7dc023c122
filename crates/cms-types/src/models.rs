use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The caller attached to a request after the auth gate accepted it.
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub handle: String,
    pub is_admin: bool,
}

/// Full post metadata, as seen by authenticated callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub author_handle: String,
    pub title: String,
    pub tags: Vec<String>,
    pub upload_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
    pub draft: bool,
    pub archived: bool,
}

/// The subset of a post exposed to anonymous callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPost {
    pub id: i64,
    pub title: String,
    pub tags: Vec<String>,
}

impl From<PostSummary> for PublicPost {
    fn from(post: PostSummary) -> Self {
        Self {
            id: post.id,
            title: post.title,
            tags: post.tags,
        }
    }
}
