use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, posts, tags)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                handle          TEXT NOT NULL UNIQUE,
                is_admin        INTEGER NOT NULL DEFAULT 0,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE posts (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id           INTEGER NOT NULL REFERENCES users(id),
                title               TEXT NOT NULL,
                upload_timestamp    TEXT NOT NULL,
                modified_timestamp  TEXT NOT NULL,
                draft               INTEGER NOT NULL,
                archived            INTEGER NOT NULL,
                content_ref         TEXT NOT NULL UNIQUE
            );

            CREATE TABLE tags (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                name    TEXT NOT NULL UNIQUE
            );

            CREATE TABLE tags_to_posts (
                tag_id  INTEGER NOT NULL REFERENCES tags(id),
                post_id INTEGER NOT NULL REFERENCES posts(id),
                PRIMARY KEY (tag_id, post_id)
            );

            CREATE INDEX idx_tags_to_posts_post ON tags_to_posts(post_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
