use rusqlite::{params, Connection, Result as SqlResult, Row};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DbPool;

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// A tag ranked by how many photos used it inside the trending window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTag {
    pub id: String,
    pub name: String,
    pub photo_count: i64,
}

impl Tag {
    pub fn from_row(row: &Row) -> SqlResult<Self> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }

    /// Idempotent per name: an existing tag row is reused, names are unique.
    /// Takes a connection so photo upload can run it inside its transaction.
    pub fn upsert_by_name(conn: &Connection, name: &str) -> SqlResult<Tag> {
        conn.execute(
            "INSERT INTO tags (id, name) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
            params![Uuid::new_v4().to_string(), name],
        )?;
        conn.query_row(
            "SELECT id, name FROM tags WHERE name = ?1",
            [name],
            Tag::from_row,
        )
    }

    pub fn for_photo(pool: &DbPool, photo_id: &str) -> Result<Vec<Tag>, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name FROM tags t
             JOIN photo_tags pt ON pt.tag_id = t.id
             WHERE pt.photo_id = ?1
             ORDER BY t.name ASC",
        )?;
        let tag_iter = stmt.query_map([photo_id], Tag::from_row)?;

        let mut tags = Vec::new();
        for tag in tag_iter {
            tags.push(tag?);
        }
        Ok(tags)
    }

    /// Ranks all tags by distinct photos tagged since `window_start`,
    /// descending, top 20. The LEFT JOINs keep tags with no in-window
    /// photos in the listing with a zero count.
    pub fn trending(
        pool: &DbPool,
        window_start: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<TrendingTag>, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, COUNT(DISTINCT p.id) AS photo_count
             FROM tags t
             LEFT JOIN photo_tags pt ON pt.tag_id = t.id
             LEFT JOIN photos p ON p.id = pt.photo_id AND p.created_at >= ?1
             GROUP BY t.id, t.name
             ORDER BY photo_count DESC, t.name ASC
             LIMIT 20",
        )?;
        let tag_iter = stmt.query_map([window_start.to_rfc3339()], |row| {
            Ok(TrendingTag {
                id: row.get(0)?,
                name: row.get(1)?,
                photo_count: row.get(2)?,
            })
        })?;

        let mut tags = Vec::new();
        for tag in tag_iter {
            tags.push(tag?);
        }
        Ok(tags)
    }
}
