use serde::Serialize;

use crate::db::{
    CommentWithUser, DbPool, Photo, ReactionWithUser, Tag, UserPublic,
};
use crate::db_photos::FeedScope;
use crate::{db_comments, db_reactions, db_reposts, db_users};

pub const PAGE_SIZE: i64 = 10;

/// Pagination block returned with every feed page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
}

impl Pagination {
    pub fn new(page: i64, total: i64) -> Self {
        let total_pages = (total + PAGE_SIZE - 1) / PAGE_SIZE;
        Pagination {
            page,
            limit: PAGE_SIZE,
            total,
            total_pages,
            has_next_page: page < total_pages,
        }
    }
}

/// A photo as the client sees it: entity fields plus access URL, aggregate
/// counts and embedded relations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub id: String,
    pub filename: String,
    pub user_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub url: String,
    pub likes_count: i64,
    pub reposts_count: i64,
    pub user: UserPublic,
    pub tags: Vec<Tag>,
    pub comments: Vec<CommentWithUser>,
    pub likes: Vec<ReactionWithUser>,
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub photos: Vec<PhotoResponse>,
    pub pagination: Pagination,
}

/// Lenient page parsing: absent, non-numeric or non-positive input is
/// silently page 1.
pub fn parse_page(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

/// Trim and lowercase the tag search term; an empty result means no filter.
pub fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// One feed page: query the matching photo window, then project each photo
/// with its owner, counts and embedded relations.
pub fn get_feed(
    pool: &DbPool,
    scope: FeedScope,
    page: i64,
    search: Option<&str>,
    base_url: &str,
) -> Result<FeedPage, Box<dyn std::error::Error>> {
    let offset = (page - 1) * PAGE_SIZE;
    let (photos, total) = Photo::feed_page(pool, scope, search, PAGE_SIZE, offset)?;

    let mut projected = Vec::with_capacity(photos.len());
    for photo in &photos {
        projected.push(project_photo(pool, photo, base_url)?);
    }

    Ok(FeedPage {
        photos: projected,
        pagination: Pagination::new(page, total),
    })
}

pub fn photo_url(base_url: &str, filename: &str) -> String {
    format!("{}/uploads/{}", base_url, filename)
}

/// Projection from the persisted photo to its response shape. Field set:
/// entity fields, url, likesCount, repostsCount, owner public profile,
/// tags, comments (ascending, with authors), reactors with kinds.
pub fn project_photo(
    pool: &DbPool,
    photo: &Photo,
    base_url: &str,
) -> Result<PhotoResponse, Box<dyn std::error::Error>> {
    let owner = db_users::User::find_by_id(pool, &photo.user_id)?
        .ok_or_else(|| format!("photo {} has no owner row", photo.id))?;

    Ok(PhotoResponse {
        id: photo.id.clone(),
        filename: photo.filename.clone(),
        user_id: photo.user_id.clone(),
        created_at: photo.created_at,
        url: photo_url(base_url, &photo.filename),
        likes_count: db_reactions::count_for_photo(pool, &photo.id)?,
        reposts_count: db_reposts::count_for_photo(pool, &photo.id)?,
        user: owner.public(),
        tags: Tag::for_photo(pool, &photo.id)?,
        comments: db_comments::Comment::for_photo(pool, &photo.id)?,
        likes: db_reactions::for_photo(pool, &photo.id)?,
    })
}

/// Following feed helper: scope the query to the viewer's followees.
pub fn get_following_feed(
    pool: &DbPool,
    viewer_id: &str,
    page: i64,
    search: Option<&str>,
    base_url: &str,
) -> Result<FeedPage, Box<dyn std::error::Error>> {
    get_feed(pool, FeedScope::Following(viewer_id), page, search, base_url)
}
