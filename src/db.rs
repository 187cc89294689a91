use chrono::{DateTime, Utc};
use rusqlite::Result as SqlResult;

pub use crate::db_comments::{Comment, CommentWithUser};
pub use crate::db_follows::Follow;
pub use crate::db_photos::Photo;
pub use crate::db_pool::{create_db_pool, create_test_db_pool, DbPool};
pub use crate::db_reactions::{ReactionCounts, ReactionKind, ReactionWithUser, ToggleOutcome};
pub use crate::db_reposts::Repost;
pub use crate::db_tags::Tag;
pub use crate::db_users::{User, UserPublic};

/// Parse an RFC 3339 timestamp column written by this application.
pub(crate) fn timestamp_column(
    row: &rusqlite::Row,
    idx: usize,
    name: &str,
) -> SqlResult<DateTime<Utc>> {
    let raw = row.get::<_, String>(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::InvalidColumnType(idx, name.to_string(), rusqlite::types::Type::Text)
        })
}
