use serde::Serialize;
use serde_json::json;
use warp::{Rejection, Reply};

use crate::auth::AuthUser;
use crate::db::{DbPool, Photo, ReactionWithUser};
use crate::db_reactions::{self, ReactionKind};
use crate::warp_helpers::{db_rejection, not_found};

/// The "who reacted" view: the photo, its reactors and per-kind totals.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionsResponse {
    pub id: String,
    pub filename: String,
    pub user_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub likes: Vec<ReactionWithUser>,
    pub likes_count: i64,
    pub heart_count: i64,
    pub smile_count: i64,
}

/// Toggle one reaction kind for the caller on a photo. Removing an existing
/// reaction of the same kind answers 200; creating or replacing one answers
/// 201. Clients branch on that distinction.
pub async fn toggle_reaction(
    photo_id: String,
    kind: ReactionKind,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let photo = Photo::find_by_id(&db_pool, &photo_id).map_err(db_rejection)?;
    if photo.is_none() {
        return Err(not_found("Photo not found"));
    }

    let outcome = db_reactions::toggle(&db_pool, &auth.id, &photo_id, kind).map_err(db_rejection)?;

    let status = if outcome.is_liked {
        warp::http::StatusCode::CREATED
    } else {
        warp::http::StatusCode::OK
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "data": outcome })),
        status,
    ))
}

pub async fn get_reactions(
    photo_id: String,
    _auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let photo = Photo::find_by_id(&db_pool, &photo_id)
        .map_err(db_rejection)?
        .ok_or_else(|| not_found("Photo not found"))?;

    let likes = db_reactions::for_photo(&db_pool, &photo_id).map_err(db_rejection)?;
    let counts = db_reactions::counts_by_kind(&db_pool, &photo_id).map_err(db_rejection)?;

    Ok(warp::reply::json(&json!({
        "reactions": ReactionsResponse {
            id: photo.id,
            filename: photo.filename,
            user_id: photo.user_id,
            created_at: photo.created_at,
            likes,
            likes_count: counts.likes_count,
            heart_count: counts.heart_count,
            smile_count: counts.smile_count,
        }
    })))
}
