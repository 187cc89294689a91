use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::db::{timestamp_column, DbPool, UserPublic};

/// The three mutually exclusive reaction kinds. A user holds at most one
/// reaction per photo; picking a different kind replaces the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Like,
    Heart,
    Smile,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Heart => "heart",
            ReactionKind::Smile => "smile",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ReactionKind::Like),
            "heart" => Ok(ReactionKind::Heart),
            "smile" => Ok(ReactionKind::Smile),
            _ => Err(()),
        }
    }
}

/// Result of a toggle call. `likes_count` is the photo's total reaction
/// count across all kinds, which is what the client renders next to the
/// buttons.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub likes_count: i64,
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionCounts {
    pub likes_count: i64,
    pub heart_count: i64,
    pub smile_count: i64,
}

/// A reactor identity with their reaction kind, for the "who reacted" view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionWithUser {
    pub reaction_type: String,
    pub created_at: DateTime<Utc>,
    pub user: UserPublic,
}

/// Toggle a reaction of `kind` for (user, photo).
///
/// Same kind already present: the row is removed. Any other state: an
/// upsert against the (user_id, photo_id) primary key writes the new kind,
/// replacing a different-kind reaction in the same statement. The whole
/// sequence runs in one transaction so concurrent toggles from the same
/// user serialize instead of racing the read against the write.
pub fn toggle(
    pool: &DbPool,
    user_id: &str,
    photo_id: &str,
    kind: ReactionKind,
) -> Result<ToggleOutcome, Box<dyn std::error::Error>> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    let existing: Option<String> = tx
        .query_row(
            "SELECT reaction_type FROM likes WHERE user_id = ?1 AND photo_id = ?2",
            params![user_id, photo_id],
            |row| row.get(0),
        )
        .optional()?;

    let is_liked = if existing.as_deref() == Some(kind.as_str()) {
        tx.execute(
            "DELETE FROM likes WHERE user_id = ?1 AND photo_id = ?2",
            params![user_id, photo_id],
        )?;
        false
    } else {
        tx.execute(
            "INSERT INTO likes (user_id, photo_id, reaction_type, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, photo_id) DO UPDATE SET
                 reaction_type = excluded.reaction_type,
                 created_at = excluded.created_at",
            params![user_id, photo_id, kind.as_str(), Utc::now().to_rfc3339()],
        )?;
        true
    };

    let likes_count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM likes WHERE photo_id = ?1",
        [photo_id],
        |row| row.get(0),
    )?;

    tx.commit()?;
    Ok(ToggleOutcome {
        likes_count,
        is_liked,
    })
}

/// Total reactions on a photo, any kind.
pub fn count_for_photo(
    pool: &DbPool,
    photo_id: &str,
) -> Result<i64, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let count = conn.query_row(
        "SELECT COUNT(*) FROM likes WHERE photo_id = ?1",
        [photo_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn counts_by_kind(
    pool: &DbPool,
    photo_id: &str,
) -> Result<ReactionCounts, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT reaction_type, COUNT(*) FROM likes WHERE photo_id = ?1 GROUP BY reaction_type",
    )?;
    let count_iter = stmt.query_map([photo_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut counts = ReactionCounts {
        likes_count: 0,
        heart_count: 0,
        smile_count: 0,
    };
    for entry in count_iter {
        let (kind, count) = entry?;
        match kind.as_str() {
            "like" => counts.likes_count = count,
            "heart" => counts.heart_count = count,
            "smile" => counts.smile_count = count,
            _ => {}
        }
    }
    Ok(counts)
}

pub fn for_photo(
    pool: &DbPool,
    photo_id: &str,
) -> Result<Vec<ReactionWithUser>, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT l.reaction_type, l.created_at,
                u.id, u.username, u.fname, u.lname, u.avatar
         FROM likes l
         JOIN users u ON u.id = l.user_id
         WHERE l.photo_id = ?1
         ORDER BY l.created_at DESC",
    )?;
    let reaction_iter = stmt.query_map([photo_id], |row| {
        Ok(ReactionWithUser {
            reaction_type: row.get(0)?,
            created_at: timestamp_column(row, 1, "created_at")?,
            user: UserPublic {
                id: row.get(2)?,
                username: row.get(3)?,
                fname: row.get(4)?,
                lname: row.get(5)?,
                avatar: row.get(6)?,
            },
        })
    })?;

    let mut reactions = Vec::new();
    for reaction in reaction_iter {
        reactions.push(reaction?);
    }
    Ok(reactions)
}
