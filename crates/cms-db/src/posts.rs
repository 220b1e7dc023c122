use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use cms_types::commands::{NewPost, PostChanges};
use cms_types::models::PostSummary;

use crate::models::PostRow;
use crate::{Database, DbError, Result};

impl Database {
    /// Inserts a post, its missing tags and its tag links in one transaction.
    /// The body itself lives outside the database under `content_ref`.
    pub fn insert_post(
        &self,
        author_id: i64,
        post: &NewPost,
        content_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        self.with_tx(|tx| {
            let tag_ids = resolve_tag_ids(tx, &post.tags)?;

            tx.execute(
                "INSERT INTO posts (author_id, title, upload_timestamp, modified_timestamp,
                                    draft, archived, content_ref)
                 VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6)",
                params![author_id, post.title, now, post.draft, post.archived, content_ref],
            )?;
            let post_id = tx.last_insert_rowid();

            link_tags(tx, post_id, &tag_ids)?;

            debug!("Inserted post {} with {} tags", post_id, tag_ids.len());
            Ok(post_id)
        })
    }

    /// Applies the present fields of `changes` and refreshes the modified
    /// timestamp. A new tag list replaces every existing link for the post.
    /// Returns the post's content ref so the caller can rewrite the body.
    pub fn update_post(
        &self,
        id: i64,
        changes: &PostChanges,
        now: DateTime<Utc>,
    ) -> Result<String> {
        self.with_tx(|tx| {
            let current = query_post(tx, id)?.ok_or(DbError::NotFound)?;

            let title = changes.title.as_deref().unwrap_or(&current.title);
            let draft = changes.draft.unwrap_or(current.draft);
            let archived = changes.archived.unwrap_or(current.archived);

            tx.execute(
                "UPDATE posts SET title = ?1, draft = ?2, archived = ?3, modified_timestamp = ?4
                 WHERE id = ?5",
                params![title, draft, archived, now, id],
            )?;

            if let Some(tags) = &changes.tags {
                tx.execute("DELETE FROM tags_to_posts WHERE post_id = ?1", [id])?;
                let tag_ids = resolve_tag_ids(tx, tags)?;
                link_tags(tx, id, &tag_ids)?;
            }

            Ok(current.content_ref)
        })
    }

    /// Removes a post and its tag links. Tags themselves are kept.
    pub fn delete_post(&self, id: i64) -> Result<()> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM tags_to_posts WHERE post_id = ?1", [id])?;
            let deleted = tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            if deleted == 0 {
                return Err(DbError::NotFound);
            }
            Ok(())
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// Every post with its author handle and tags, ordered by id.
    pub fn list_posts(&self) -> Result<Vec<PostSummary>> {
        self.with_tx(|tx| {
            let mut stmt = tx.prepare(
                "SELECT p.id, u.handle, p.title, p.upload_timestamp, p.modified_timestamp,
                        p.draft, p.archived
                 FROM posts p
                 JOIN users u ON p.author_id = u.id
                 ORDER BY p.id",
            )?;
            let mut posts = stmt
                .query_map([], |row| {
                    Ok(PostSummary {
                        id: row.get(0)?,
                        author_handle: row.get(1)?,
                        title: row.get(2)?,
                        tags: Vec::new(),
                        upload_timestamp: row.get(3)?,
                        modified_timestamp: row.get(4)?,
                        draft: row.get(5)?,
                        archived: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let index: HashMap<i64, usize> =
                posts.iter().enumerate().map(|(i, p)| (p.id, i)).collect();

            let mut stmt = tx.prepare(
                "SELECT tp.post_id, t.name
                 FROM tags_to_posts tp
                 JOIN tags t ON tp.tag_id = t.id
                 ORDER BY tp.rowid",
            )?;
            let links = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            for (post_id, tag) in links {
                let slot = index.get(&post_id).ok_or_else(|| {
                    DbError::Inconsistent(format!(
                        "tag '{}' linked to unknown post {}",
                        tag, post_id
                    ))
                })?;
                posts[*slot].tags.push(tag);
            }

            Ok(posts)
        })
    }
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, author_id, title, upload_timestamp, modified_timestamp, draft, archived,
                content_ref
         FROM posts WHERE id = ?1",
    )?;

    let row = stmt
        .query_row([id], |row| {
            Ok(PostRow {
                id: row.get(0)?,
                author_id: row.get(1)?,
                title: row.get(2)?,
                upload_timestamp: row.get(3)?,
                modified_timestamp: row.get(4)?,
                draft: row.get(5)?,
                archived: row.get(6)?,
                content_ref: row.get(7)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Looks each tag up by name, inserting the ones that do not exist yet.
fn resolve_tag_ids(conn: &Connection, tags: &[String]) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(tags.len());
    for name in tags {
        let existing: Option<i64> = conn
            .query_row("SELECT id FROM tags WHERE name = ?1", [name], |row| row.get(0))
            .optional()?;

        let id = match existing {
            Some(id) => id,
            None => {
                conn.execute("INSERT INTO tags (name) VALUES (?1)", [name])?;
                conn.last_insert_rowid()
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

fn link_tags(conn: &Connection, post_id: i64, tag_ids: &[i64]) -> Result<()> {
    let mut stmt = conn.prepare("INSERT INTO tags_to_posts (tag_id, post_id) VALUES (?1, ?2)")?;
    for tag_id in tag_ids {
        stmt.execute(params![tag_id, post_id])?;
    }
    Ok(())
}
