pub mod auth;
pub mod config;
pub mod db;
pub mod db_comments;
pub mod db_follows;
pub mod db_photos;
pub mod db_pool;
pub mod db_reactions;
pub mod db_reposts;
pub mod db_schema;
pub mod db_tags;
pub mod db_users;
pub mod feed;
pub mod handlers_auth;
pub mod handlers_comment;
pub mod handlers_feed;
pub mod handlers_follow;
pub mod handlers_health;
pub mod handlers_photo;
pub mod handlers_reaction;
pub mod handlers_repost;
pub mod handlers_user;
pub mod routes;
pub mod warp_helpers;
