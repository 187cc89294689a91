use bytes::BufMut;
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use uuid::Uuid;
use warp::multipart::{FormData, Part};
use warp::{Rejection, Reply};

use crate::auth::AuthUser;
use crate::config::Config;
use crate::db::{DbPool, Photo, Tag};
use crate::feed;
use crate::warp_helpers::{db_rejection, forbidden, not_found, request_base_url, validation};

/// Upload response: the stored photo with the tags linked to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPhoto {
    #[serde(flatten)]
    pub photo: Photo,
    pub tags: Vec<Tag>,
}

async fn collect_part(part: Part) -> Result<Vec<u8>, warp::Error> {
    part.stream()
        .try_fold(Vec::new(), |mut acc, data| {
            acc.put(data);
            async move { Ok(acc) }
        })
        .await
}

/// Multipart upload: a `photo` file part plus an optional space-separated
/// `tags` text field. Tag names are trimmed, lowercased and upserted.
pub async fn upload_photo(
    form: FormData,
    auth: AuthUser,
    config: Config,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let mut parts = form;
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut tags_input = String::new();

    while let Some(part) = parts
        .try_next()
        .await
        .map_err(|err| validation(format!("Invalid multipart body: {}", err)))?
    {
        let name = part.name().to_string();
        match name.as_str() {
            "photo" => {
                let original_name = part.filename().unwrap_or("photo").to_string();
                let data = collect_part(part)
                    .await
                    .map_err(|err| validation(format!("Invalid multipart body: {}", err)))?;
                file = Some((original_name, data));
            }
            "tags" => {
                let data = collect_part(part)
                    .await
                    .map_err(|err| validation(format!("Invalid multipart body: {}", err)))?;
                tags_input = String::from_utf8_lossy(&data).to_string();
            }
            _ => {}
        }
    }

    let (original_name, data) = file.ok_or_else(|| validation("No file uploaded"))?;

    let extension = Path::new(&original_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let filename = format!("photo_{}{}", Uuid::new_v4(), extension);

    tokio::fs::create_dir_all(&config.upload_path)
        .await
        .map_err(|err| db_rejection(Box::new(err)))?;
    tokio::fs::write(Path::new(&config.upload_path).join(&filename), &data)
        .await
        .map_err(|err| db_rejection(Box::new(err)))?;

    let tag_names: Vec<String> = tags_input
        .split_whitespace()
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let (photo, tags) =
        Photo::create_with_tags(&db_pool, &auth.id, &filename, &tag_names).map_err(db_rejection)?;

    log::info!("Photo {} uploaded by {}", photo.id, auth.username);

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "photo": UploadedPhoto { photo, tags } })),
        warp::http::StatusCode::CREATED,
    ))
}

pub async fn get_photo(
    photo_id: String,
    host: Option<String>,
    _auth: AuthUser,
    config: Config,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let photo = Photo::find_by_id(&db_pool, &photo_id)
        .map_err(db_rejection)?
        .ok_or_else(|| not_found("Photo not found"))?;

    let base_url = request_base_url(host.as_deref(), &config);
    let projected = feed::project_photo(&db_pool, &photo, &base_url).map_err(db_rejection)?;

    Ok(warp::reply::json(&json!({ "photo": projected })))
}

pub async fn delete_photo(
    photo_id: String,
    auth: AuthUser,
    config: Config,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let photo = Photo::find_by_id(&db_pool, &photo_id)
        .map_err(db_rejection)?
        .ok_or_else(|| not_found("Photo not found"))?;

    if photo.user_id != auth.id {
        return Err(forbidden("Not authorized to delete this photo"));
    }

    Photo::delete(&db_pool, &photo_id).map_err(db_rejection)?;

    // Best effort: a file already gone from disk is not an error.
    let file_path = Path::new(&config.upload_path).join(&photo.filename);
    if file_path.exists() {
        if let Err(err) = std::fs::remove_file(&file_path) {
            log::warn!("Could not remove {}: {}", file_path.display(), err);
        }
    }

    Ok(warp::reply::json(
        &json!({ "message": "Photo deleted successfully" }),
    ))
}

/// Serve a stored upload. Filenames are generated by the server, so
/// anything that tries to traverse out of the upload dir is rejected.
pub async fn serve_upload(filename: String, config: Config) -> Result<Box<dyn Reply>, Rejection> {
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(not_found("Not found"));
    }

    let file_path = Path::new(&config.upload_path).join(&filename);
    match std::fs::read(&file_path) {
        Ok(file_data) => {
            let content_type = mime_guess::from_path(&filename)
                .first_or_octet_stream()
                .to_string();

            let reply = warp::reply::with_header(file_data, "content-type", content_type);
            let reply =
                warp::reply::with_header(reply, "cache-control", "public, max-age=31536000");

            Ok(Box::new(reply))
        }
        Err(_) => Err(not_found("Not found")),
    }
}
