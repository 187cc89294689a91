use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Result as SqlResult, Row};
use serde::Serialize;
use uuid::Uuid;

use crate::db::{timestamp_column, DbPool};

/// Account row. The password field holds the bcrypt hash and is never
/// serialized; clients only ever see the [`UserPublic`] projection.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub fname: String,
    pub lname: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public profile fields embedded in photos, comments, reactions and
/// follower listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    pub username: String,
    pub fname: String,
    pub lname: String,
    pub avatar: Option<String>,
}

impl User {
    pub fn from_row(row: &Row) -> SqlResult<Self> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            fname: row.get(3)?,
            lname: row.get(4)?,
            avatar: row.get(5)?,
            created_at: timestamp_column(row, 6, "created_at")?,
        })
    }

    pub fn public(&self) -> UserPublic {
        UserPublic {
            id: self.id.clone(),
            username: self.username.clone(),
            fname: self.fname.clone(),
            lname: self.lname.clone(),
            avatar: self.avatar.clone(),
        }
    }

    pub fn create(
        pool: &DbPool,
        username: &str,
        password_hash: &str,
        fname: &str,
        lname: &str,
    ) -> Result<User, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password: password_hash.to_string(),
            fname: fname.to_string(),
            lname: lname.to_string(),
            avatar: None,
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO users (id, username, password, fname, lname, avatar, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id,
                user.username,
                user.password,
                user.fname,
                user.lname,
                user.avatar,
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(user)
    }

    pub fn find_by_id(
        pool: &DbPool,
        id: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, username, password, fname, lname, avatar, created_at
                 FROM users WHERE id = ?1",
                [id],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn find_by_username(
        pool: &DbPool,
        username: &str,
    ) -> Result<Option<User>, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let user = conn
            .query_row(
                "SELECT id, username, password, fname, lname, avatar, created_at
                 FROM users WHERE username = ?1",
                [username],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Avatar strings are stored verbatim (URL or data URI); validation of
    /// their content is out of scope here.
    pub fn update_avatar(
        pool: &DbPool,
        user_id: &str,
        avatar: &str,
    ) -> Result<bool, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let updated = conn.execute(
            "UPDATE users SET avatar = ?1 WHERE id = ?2",
            params![avatar, user_id],
        )?;
        Ok(updated > 0)
    }

    /// Case-insensitive substring search over username and display names,
    /// excluding the searching user.
    pub fn search(
        pool: &DbPool,
        term: &str,
        exclude_id: &str,
    ) -> Result<Vec<UserPublic>, Box<dyn std::error::Error>> {
        let conn = pool.get()?;
        let pattern = format!("%{}%", term);
        let mut stmt = conn.prepare(
            "SELECT id, username, password, fname, lname, avatar, created_at FROM users
             WHERE (username LIKE ?1 OR fname LIKE ?1 OR lname LIKE ?1) AND id <> ?2
             ORDER BY username ASC LIMIT 20",
        )?;
        let user_iter = stmt.query_map(params![pattern, exclude_id], User::from_row)?;

        let mut users = Vec::new();
        for user in user_iter {
            users.push(user?.public());
        }
        Ok(users)
    }
}
