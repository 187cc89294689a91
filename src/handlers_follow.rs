use serde::Deserialize;
use serde_json::json;
use warp::{Rejection, Reply};

use crate::auth::AuthUser;
use crate::db::{DbPool, User};
use crate::db_follows;
use crate::warp_helpers::{db_rejection, not_found, validation};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

pub async fn follow_user(
    request: FollowRequest,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let target_id = request
        .user_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| validation("User ID required"))?;

    if target_id == auth.id {
        return Err(validation("Cannot follow yourself"));
    }

    let target = User::find_by_id(&db_pool, target_id).map_err(db_rejection)?;
    if target.is_none() {
        return Err(not_found("User not found"));
    }

    if db_follows::exists(&db_pool, &auth.id, target_id).map_err(db_rejection)? {
        return Err(validation("You already follow this user"));
    }

    db_follows::create(&db_pool, &auth.id, target_id).map_err(db_rejection)?;
    let counts = db_follows::counts_for_user(&db_pool, target_id).map_err(db_rejection)?;

    Ok(warp::reply::json(&json!({
        "message": "User follow successful",
        "followers": counts.followers,
        "following": counts.following,
        "isFollowing": true,
    })))
}

pub async fn unfollow_user(
    request: FollowRequest,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let target_id = request
        .user_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| validation("User ID required"))?;

    if !db_follows::exists(&db_pool, &auth.id, target_id).map_err(db_rejection)? {
        return Err(validation("You do not follow this user"));
    }

    db_follows::delete(&db_pool, &auth.id, target_id).map_err(db_rejection)?;
    let counts = db_follows::counts_for_user(&db_pool, target_id).map_err(db_rejection)?;

    Ok(warp::reply::json(&json!({
        "message": "User unfollow successful",
        "followers": counts.followers,
        "following": counts.following,
        "isFollowing": false,
    })))
}

pub async fn get_followers(
    user_id: String,
    _auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let followers = db_follows::followers_of(&db_pool, &user_id).map_err(db_rejection)?;
    Ok(warp::reply::json(&json!({ "followers": followers })))
}

pub async fn get_following(
    user_id: String,
    _auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let following = db_follows::following_of(&db_pool, &user_id).map_err(db_rejection)?;
    Ok(warp::reply::json(&json!({ "following": following })))
}

pub async fn check_follow_status(
    user_id: String,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let is_following = db_follows::exists(&db_pool, &auth.id, &user_id).map_err(db_rejection)?;
    Ok(warp::reply::json(&json!({ "isFollowing": is_following })))
}
