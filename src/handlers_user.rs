use serde::{Deserialize, Serialize};
use serde_json::json;
use warp::{Rejection, Reply};

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::{DbPool, Photo, User, UserPublic};
use crate::db_follows;
use crate::feed::{self, PhotoResponse};
use crate::warp_helpers::{db_rejection, not_found, request_base_url, validation};

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAvatarRequest {
    pub avatar: Option<String>,
}

/// Full profile view: public fields plus counts and the user's photos.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserPublic,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub photos_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub photos: Vec<PhotoResponse>,
}

/// The caller's own account data.
pub async fn get_user(auth: AuthUser, db_pool: DbPool) -> Result<impl Reply, Rejection> {
    let user = User::find_by_username(&db_pool, &auth.username)
        .map_err(db_rejection)?
        .ok_or_else(|| not_found("User not found"))?;

    Ok(warp::reply::json(&json!({
        "user": {
            "id": user.id,
            "username": user.username,
            "fname": user.fname,
            "lname": user.lname,
            "avatar": user.avatar,
            "createdAt": user.created_at,
        }
    })))
}

pub async fn search_users(
    query: UserSearchQuery,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .ok_or_else(|| validation("Search query required"))?;

    let users = User::search(&db_pool, term, &auth.id).map_err(db_rejection)?;
    Ok(warp::reply::json(&json!({ "users": users })))
}

pub async fn get_user_by_username(
    username: String,
    host: Option<String>,
    _auth: AuthUser,
    config: Config,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let user = User::find_by_username(&db_pool, &username)
        .map_err(db_rejection)?
        .ok_or_else(|| not_found("User not found"))?;

    let base_url = request_base_url(host.as_deref(), &config);
    let photos = Photo::by_user(&db_pool, &user.id).map_err(db_rejection)?;

    let mut projected = Vec::with_capacity(photos.len());
    for photo in &photos {
        projected.push(feed::project_photo(&db_pool, photo, &base_url).map_err(db_rejection)?);
    }

    let counts = db_follows::counts_for_user(&db_pool, &user.id).map_err(db_rejection)?;
    let photos_count = Photo::count_by_user(&db_pool, &user.id).map_err(db_rejection)?;

    Ok(warp::reply::json(&json!({
        "user": UserProfile {
            user: user.public(),
            created_at: user.created_at,
            photos_count,
            followers_count: counts.followers,
            following_count: counts.following,
            photos: projected,
        }
    })))
}

pub async fn update_avatar(
    request: UpdateAvatarRequest,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let avatar = request
        .avatar
        .as_deref()
        .filter(|avatar| !avatar.is_empty())
        .ok_or_else(|| validation("Avatar required"))?;

    let updated = User::update_avatar(&db_pool, &auth.id, avatar).map_err(db_rejection)?;
    if !updated {
        return Err(not_found("User not found"));
    }

    Ok(warp::reply::json(&json!({
        "message": "Avatar updated successfully",
        "avatar": avatar,
    })))
}
