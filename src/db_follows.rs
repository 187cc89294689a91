use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use crate::db::{DbPool, UserPublic};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Follow {
    pub follower_id: String,
    pub following_id: String,
    pub created_at: DateTime<Utc>,
}

/// Follower and following totals for one user.
#[derive(Debug, Clone, Copy)]
pub struct FollowCounts {
    pub followers: i64,
    pub following: i64,
}

pub fn exists(
    pool: &DbPool,
    follower_id: &str,
    following_id: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND following_id = ?2",
        params![follower_id, following_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Creates the directed edge. The no-self-follow and no-duplicate rules are
/// checked by the handler; the schema's primary key and CHECK back them up
/// under concurrent requests.
pub fn create(
    pool: &DbPool,
    follower_id: &str,
    following_id: &str,
) -> Result<Follow, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let follow = Follow {
        follower_id: follower_id.to_string(),
        following_id: following_id.to_string(),
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?1, ?2, ?3)",
        params![
            follow.follower_id,
            follow.following_id,
            follow.created_at.to_rfc3339(),
        ],
    )?;
    Ok(follow)
}

pub fn delete(
    pool: &DbPool,
    follower_id: &str,
    following_id: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let deleted = conn.execute(
        "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
        params![follower_id, following_id],
    )?;
    Ok(deleted > 0)
}

pub fn counts_for_user(
    pool: &DbPool,
    user_id: &str,
) -> Result<FollowCounts, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let followers: i64 = conn.query_row(
        "SELECT COUNT(*) FROM follows WHERE following_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    let following: i64 = conn.query_row(
        "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(FollowCounts {
        followers,
        following,
    })
}

/// Users who follow `user_id`, newest edge first.
pub fn followers_of(
    pool: &DbPool,
    user_id: &str,
) -> Result<Vec<UserPublic>, Box<dyn std::error::Error>> {
    counterparts(
        pool,
        user_id,
        "SELECT u.id, u.username, u.fname, u.lname, u.avatar
         FROM follows f
         JOIN users u ON u.id = f.follower_id
         WHERE f.following_id = ?1
         ORDER BY f.created_at DESC",
    )
}

/// Users `user_id` follows, newest edge first.
pub fn following_of(
    pool: &DbPool,
    user_id: &str,
) -> Result<Vec<UserPublic>, Box<dyn std::error::Error>> {
    counterparts(
        pool,
        user_id,
        "SELECT u.id, u.username, u.fname, u.lname, u.avatar
         FROM follows f
         JOIN users u ON u.id = f.following_id
         WHERE f.follower_id = ?1
         ORDER BY f.created_at DESC",
    )
}

fn counterparts(
    pool: &DbPool,
    user_id: &str,
    query: &str,
) -> Result<Vec<UserPublic>, Box<dyn std::error::Error>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(query)?;
    let user_iter = stmt.query_map([user_id], |row| {
        Ok(UserPublic {
            id: row.get(0)?,
            username: row.get(1)?,
            fname: row.get(2)?,
            lname: row.get(3)?,
            avatar: row.get(4)?,
        })
    })?;

    let mut users = Vec::new();
    for user in user_iter {
        users.push(user?);
    }
    Ok(users)
}
