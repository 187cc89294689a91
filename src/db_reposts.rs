use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use crate::db::{timestamp_column, DbPool, Photo};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repost {
    pub user_id: String,
    pub photo_id: String,
    pub created_at: DateTime<Utc>,
}

pub fn exists(
    pool: &DbPool,
    user_id: &str,
    photo_id: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reposts WHERE user_id = ?1 AND photo_id = ?2",
        params![user_id, photo_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn create(
    pool: &DbPool,
    user_id: &str,
    photo_id: &str,
) -> Result<Repost, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let repost = Repost {
        user_id: user_id.to_string(),
        photo_id: photo_id.to_string(),
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO reposts (user_id, photo_id, created_at) VALUES (?1, ?2, ?3)",
        params![
            repost.user_id,
            repost.photo_id,
            repost.created_at.to_rfc3339(),
        ],
    )?;
    Ok(repost)
}

pub fn delete(
    pool: &DbPool,
    user_id: &str,
    photo_id: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let deleted = conn.execute(
        "DELETE FROM reposts WHERE user_id = ?1 AND photo_id = ?2",
        params![user_id, photo_id],
    )?;
    Ok(deleted > 0)
}

pub fn count_for_photo(
    pool: &DbPool,
    photo_id: &str,
) -> Result<i64, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM reposts WHERE photo_id = ?1",
        [photo_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// A user's reposts, newest first, each paired with the reposted photo.
pub fn reposted_photos(
    pool: &DbPool,
    user_id: &str,
) -> Result<Vec<(Repost, Photo)>, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT r.user_id, r.photo_id, r.created_at,
                p.id, p.filename, p.user_id, p.created_at
         FROM reposts r
         JOIN photos p ON p.id = r.photo_id
         WHERE r.user_id = ?1
         ORDER BY r.created_at DESC",
    )?;
    let repost_iter = stmt.query_map([user_id], |row| {
        Ok((
            Repost {
                user_id: row.get(0)?,
                photo_id: row.get(1)?,
                created_at: timestamp_column(row, 2, "created_at")?,
            },
            Photo {
                id: row.get(3)?,
                filename: row.get(4)?,
                user_id: row.get(5)?,
                created_at: timestamp_column(row, 6, "created_at")?,
            },
        ))
    })?;

    let mut reposts = Vec::new();
    for repost in repost_iter {
        reposts.push(repost?);
    }
    Ok(reposts)
}
