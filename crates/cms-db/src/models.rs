//! Database row types. These map directly to SQLite rows and stay separate
//! from the cms-types API models.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub handle: String,
    pub is_admin: bool,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub upload_timestamp: DateTime<Utc>,
    pub modified_timestamp: DateTime<Utc>,
    pub draft: bool,
    pub archived: bool,
    pub content_ref: String,
}
