use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use cms_db::Database;
use cms_types::commands::{ModifyPost, NewPost};
use cms_types::models::PostSummary;

use crate::blobs::ContentBlobs;
use crate::error::StoreError;
use crate::run_blocking;
use crate::visibility::needs_auth;

/// Posts: metadata and tags in the database, bodies in [`ContentBlobs`].
///
/// Relational writes are transactional. Body writes are not part of the
/// transaction and are never compensated: a body written for an upload whose
/// transaction then fails stays on disk, and deleting a post leaves its body
/// file in place.
pub struct DocumentStore {
    db: Arc<Database>,
    blobs: ContentBlobs,
}

impl DocumentStore {
    pub fn new(db: Arc<Database>, blobs: ContentBlobs) -> Self {
        Self { db, blobs }
    }

    /// Stores the body under a fresh key, then inserts the post. Returns the post id.
    pub async fn upload(&self, author_id: i64, post: NewPost) -> Result<i64, StoreError> {
        let key = ContentBlobs::new_key();
        self.blobs.write(&key, &post.body).await?;

        let db = self.db.clone();
        let content_ref = key.clone();
        let id = run_blocking(move || {
            Ok(db.insert_post(author_id, &post, &content_ref, Utc::now())?)
        })
        .await
        .inspect_err(|e| warn!("Body {} left without a post: {}", key, e))?;

        info!("Post {} uploaded by user {}", id, author_id);
        Ok(id)
    }

    /// Applies a partial update. With no fields present it only checks that
    /// the post exists.
    pub async fn modify(&self, cmd: ModifyPost) -> Result<(), StoreError> {
        let ModifyPost { id, mut changes } = cmd;
        let db = self.db.clone();

        if changes.is_empty() {
            return run_blocking(move || db.get_post(id)?.map(|_| ()).ok_or(StoreError::NotFound))
                .await;
        }

        let body = changes.body.take();
        let content_ref =
            run_blocking(move || Ok(db.update_post(id, &changes, Utc::now())?)).await?;

        if let Some(body) = body {
            self.blobs.write(&content_ref, &body).await?;
        }

        info!("Post {} modified", id);
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let db = self.db.clone();
        run_blocking(move || Ok(db.delete_post(id)?)).await?;
        info!("Post {} deleted", id);
        Ok(())
    }

    /// The post body, plus whether the post is hidden from anonymous callers.
    pub async fn get_body(&self, id: i64) -> Result<(String, bool), StoreError> {
        let db = self.db.clone();
        let row = run_blocking(move || db.get_post(id)?.ok_or(StoreError::NotFound)).await?;

        let body = self.blobs.read(&row.content_ref).await?;
        Ok((body, needs_auth(row.draft, row.archived)))
    }

    pub async fn list_all(&self) -> Result<Vec<PostSummary>, StoreError> {
        let db = self.db.clone();
        run_blocking(move || Ok(db.list_posts()?)).await
    }
}
