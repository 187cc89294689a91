use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Result as SqlResult, Row};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{timestamp_column, DbPool, UserPublic};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub photo_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Comment plus its author, as embedded in photo responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithUser {
    pub id: String,
    pub text: String,
    pub photo_id: String,
    pub created_at: DateTime<Utc>,
    pub user: UserPublic,
}

impl Comment {
    pub fn from_row(row: &Row) -> SqlResult<Self> {
        Ok(Comment {
            id: row.get(0)?,
            text: row.get(1)?,
            photo_id: row.get(2)?,
            user_id: row.get(3)?,
            created_at: timestamp_column(row, 4, "created_at")?,
        })
    }

    /// Stores the already-trimmed text; length rules live in the handler.
    pub fn create(
        pool: &DbPool,
        photo_id: &str,
        user_id: &str,
        text: &str,
    ) -> Result<Comment, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            photo_id: photo_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO comments (id, text, photo_id, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                comment.id,
                comment.text,
                comment.photo_id,
                comment.user_id,
                comment.created_at.to_rfc3339(),
            ],
        )?;
        Ok(comment)
    }

    pub fn find_by_id(
        pool: &DbPool,
        id: &str,
    ) -> Result<Option<Comment>, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let comment = conn
            .query_row(
                "SELECT id, text, photo_id, user_id, created_at FROM comments WHERE id = ?1",
                [id],
                Comment::from_row,
            )
            .optional()?;
        Ok(comment)
    }

    pub fn delete(pool: &DbPool, id: &str) -> Result<bool, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let deleted = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }

    /// Comments on a photo in posting order, each with its author's public
    /// profile.
    pub fn for_photo(
        pool: &DbPool,
        photo_id: &str,
    ) -> Result<Vec<CommentWithUser>, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.text, c.photo_id, c.created_at,
                    u.id, u.username, u.fname, u.lname, u.avatar
             FROM comments c
             JOIN users u ON u.id = c.user_id
             WHERE c.photo_id = ?1
             ORDER BY c.created_at ASC",
        )?;
        let comment_iter = stmt.query_map([photo_id], |row| {
            Ok(CommentWithUser {
                id: row.get(0)?,
                text: row.get(1)?,
                photo_id: row.get(2)?,
                created_at: timestamp_column(row, 3, "created_at")?,
                user: UserPublic {
                    id: row.get(4)?,
                    username: row.get(5)?,
                    fname: row.get(6)?,
                    lname: row.get(7)?,
                    avatar: row.get(8)?,
                },
            })
        })?;

        let mut comments = Vec::new();
        for comment in comment_iter {
            comments.push(comment?);
        }
        Ok(comments)
    }
}
