use serde::Deserialize;
use serde_json::json;
use warp::{Rejection, Reply};

use crate::auth::AuthUser;
use crate::db::{Comment, CommentWithUser, DbPool, Photo, User};
use crate::warp_helpers::{db_rejection, forbidden, not_found, validation};

pub const MAX_COMMENT_LENGTH: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[serde(default)]
    pub photo_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

pub async fn add_comment(
    request: AddCommentRequest,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let photo_id = request.photo_id.as_deref().filter(|id| !id.is_empty());
    let text = request.text.as_deref().unwrap_or("");

    let (photo_id, text) = match photo_id {
        Some(photo_id) if !text.trim().is_empty() => (photo_id, text),
        _ => return Err(validation("Photo ID and comment text are required")),
    };

    // Length is checked against the raw input, before trimming.
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(validation(format!(
            "Comment too long. Maximum {} characters allowed.",
            MAX_COMMENT_LENGTH
        )));
    }

    let photo = Photo::find_by_id(&db_pool, photo_id).map_err(db_rejection)?;
    if photo.is_none() {
        return Err(not_found("Photo not found"));
    }

    let comment = Comment::create(&db_pool, photo_id, &auth.id, text.trim()).map_err(db_rejection)?;
    let author = User::find_by_id(&db_pool, &auth.id)
        .map_err(db_rejection)?
        .ok_or_else(|| not_found("User not found"))?;

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({
            "comment": CommentWithUser {
                id: comment.id,
                text: comment.text,
                photo_id: comment.photo_id,
                created_at: comment.created_at,
                user: author.public(),
            }
        })),
        warp::http::StatusCode::CREATED,
    ))
}

/// Comment removal is allowed to the comment author and to the owner of the
/// photo the comment is on, nobody else.
pub async fn delete_comment(
    comment_id: String,
    auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let comment = Comment::find_by_id(&db_pool, &comment_id)
        .map_err(db_rejection)?
        .ok_or_else(|| not_found("Comment not found"))?;

    let photo = Photo::find_by_id(&db_pool, &comment.photo_id).map_err(db_rejection)?;
    let is_photo_owner = photo.map(|p| p.user_id == auth.id).unwrap_or(false);

    if comment.user_id != auth.id && !is_photo_owner {
        return Err(forbidden("Not authorized to delete this comment"));
    }

    Comment::delete(&db_pool, &comment_id).map_err(db_rejection)?;

    Ok(warp::reply::json(
        &json!({ "message": "Comment deleted successfully" }),
    ))
}

pub async fn get_comments(
    photo_id: String,
    _auth: AuthUser,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let comments = Comment::for_photo(&db_pool, &photo_id).map_err(db_rejection)?;
    Ok(warp::reply::json(&json!({ "comments": comments })))
}
