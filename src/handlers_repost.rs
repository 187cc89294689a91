use serde::{Deserialize, Serialize};
use serde_json::json;
use warp::{Rejection, Reply};

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::{DbPool, Photo};
use crate::db_reposts;
use crate::feed::{self, PhotoResponse};
use crate::warp_helpers::{db_rejection, not_found, request_base_url, validation};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepostRequest {
    #[serde(default)]
    pub photo_id: Option<String>,
}

/// A reposted photo in the profile listing: the photo's feed projection
/// plus when the caller reposted it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepostedPhoto {
    #[serde(flatten)]
    pub photo: PhotoResponse,
    pub reposted_at: chrono::DateTime<chrono::Utc>,
}

pub async fn repost_photo(
    request: RepostRequest,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let photo_id = request
        .photo_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| validation("Photo ID required"))?;

    let photo = Photo::find_by_id(&db_pool, photo_id)
        .map_err(db_rejection)?
        .ok_or_else(|| not_found("Photo not found"))?;

    if photo.user_id == auth.id {
        return Err(validation("Cannot repost your own photo"));
    }

    if db_reposts::exists(&db_pool, &auth.id, photo_id).map_err(db_rejection)? {
        return Err(validation("You already reposted this photo"));
    }

    let repost = db_reposts::create(&db_pool, &auth.id, photo_id).map_err(db_rejection)?;

    Ok(warp::reply::json(&json!({
        "message": "Photo reposted successfully",
        "repost": repost,
        "isReposted": true,
    })))
}

pub async fn unrepost_photo(
    request: RepostRequest,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let photo_id = request
        .photo_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| validation("Photo ID required"))?;

    if !db_reposts::exists(&db_pool, &auth.id, photo_id).map_err(db_rejection)? {
        return Err(validation("You haven't reposted this photo"));
    }

    db_reposts::delete(&db_pool, &auth.id, photo_id).map_err(db_rejection)?;

    Ok(warp::reply::json(&json!({
        "message": "Repost removed successfully",
        "isReposted": false,
    })))
}

pub async fn check_repost_status(
    photo_id: String,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let is_reposted = db_reposts::exists(&db_pool, &auth.id, &photo_id).map_err(db_rejection)?;
    Ok(warp::reply::json(&json!({ "isReposted": is_reposted })))
}

pub async fn get_reposted_photos(
    user_id: String,
    host: Option<String>,
    _auth: AuthUser,
    config: Config,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let base_url = request_base_url(host.as_deref(), &config);
    let reposts = db_reposts::reposted_photos(&db_pool, &user_id).map_err(db_rejection)?;

    let mut reposted_photos = Vec::with_capacity(reposts.len());
    for (repost, photo) in &reposts {
        reposted_photos.push(RepostedPhoto {
            photo: feed::project_photo(&db_pool, photo, &base_url).map_err(db_rejection)?,
            reposted_at: repost.created_at,
        });
    }

    Ok(warp::reply::json(&json!({ "repostedPhotos": reposted_photos })))
}
