use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Result as SqlResult, Row, ToSql};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{timestamp_column, DbPool, Tag};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub filename: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Which photos a feed query covers.
#[derive(Debug, Clone, Copy)]
pub enum FeedScope<'a> {
    Global,
    /// Only photos owned by users the viewer follows.
    Following(&'a str),
}

impl Photo {
    pub fn from_row(row: &Row) -> SqlResult<Self> {
        Ok(Photo {
            id: row.get(0)?,
            filename: row.get(1)?,
            user_id: row.get(2)?,
            created_at: timestamp_column(row, 3, "created_at")?,
        })
    }

    /// Insert the photo and link its tags in one transaction. Tag names are
    /// upserted, so re-using a name never duplicates a tag row.
    pub fn create_with_tags(
        pool: &DbPool,
        user_id: &str,
        filename: &str,
        tag_names: &[String],
    ) -> Result<(Photo, Vec<Tag>), Box<dyn std::error::Error>> {
        let mut conn = pool.get()?;
        let tx = conn.transaction()?;

        let photo = Photo {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        tx.execute(
            "INSERT INTO photos (id, filename, user_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                photo.id,
                photo.filename,
                photo.user_id,
                photo.created_at.to_rfc3339(),
            ],
        )?;

        let mut tags = Vec::new();
        for name in tag_names {
            let tag = Tag::upsert_by_name(&tx, name)?;
            tx.execute(
                "INSERT OR IGNORE INTO photo_tags (photo_id, tag_id) VALUES (?1, ?2)",
                params![photo.id, tag.id],
            )?;
            tags.push(tag);
        }

        tx.commit()?;
        Ok((photo, tags))
    }

    pub fn find_by_id(
        pool: &DbPool,
        id: &str,
    ) -> Result<Option<Photo>, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let photo = conn
            .query_row(
                "SELECT id, filename, user_id, created_at FROM photos WHERE id = ?1",
                [id],
                Photo::from_row,
            )
            .optional()?;
        Ok(photo)
    }

    /// Deletes the row; photo_tags, comments, likes and reposts go with it
    /// via the schema's ON DELETE CASCADE.
    pub fn delete(pool: &DbPool, id: &str) -> Result<bool, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let deleted = conn.execute("DELETE FROM photos WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// One page of the feed plus the total matching count. `search` is a
    /// pre-normalized tag-name substring; photos qualify when at least one
    /// of their tags contains it.
    pub fn feed_page(
        pool: &DbPool,
        scope: FeedScope,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Photo>, i64), Box<dyn std::error::Error>> {
        let conn = pool.get()?;

        let pattern = search.map(|s| format!("%{}%", s));
        let viewer = match scope {
            FeedScope::Global => None,
            FeedScope::Following(viewer_id) => Some(viewer_id),
        };

        let mut clauses: Vec<&str> = Vec::new();
        let mut filter_params: Vec<&dyn ToSql> = Vec::new();
        if let Some(ref viewer_id) = viewer {
            clauses.push(
                "p.user_id IN (SELECT following_id FROM follows WHERE follower_id = ?)",
            );
            filter_params.push(viewer_id);
        }
        if let Some(ref pattern) = pattern {
            clauses.push(
                "EXISTS (SELECT 1 FROM photo_tags pt JOIN tags t ON t.id = pt.tag_id
                         WHERE pt.photo_id = p.id AND t.name LIKE ?)",
            );
            filter_params.push(pattern);
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM photos p{}", where_clause),
            &filter_params[..],
            |row| row.get(0),
        )?;

        let query = format!(
            "SELECT p.id, p.filename, p.user_id, p.created_at FROM photos p{}
             ORDER BY p.created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut page_params = filter_params;
        page_params.push(&limit);
        page_params.push(&offset);

        let mut stmt = conn.prepare(&query)?;
        let photo_iter = stmt.query_map(&page_params[..], Photo::from_row)?;

        let mut photos = Vec::new();
        for photo in photo_iter {
            photos.push(photo?);
        }
        Ok((photos, total))
    }

    pub fn by_user(
        pool: &DbPool,
        user_id: &str,
    ) -> Result<Vec<Photo>, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, filename, user_id, created_at FROM photos
             WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let photo_iter = stmt.query_map([user_id], Photo::from_row)?;

        let mut photos = Vec::new();
        for photo in photo_iter {
            photos.push(photo?);
        }
        Ok(photos)
    }

    pub fn count_by_user(
        pool: &DbPool,
        user_id: &str,
    ) -> Result<i64, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM photos WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
