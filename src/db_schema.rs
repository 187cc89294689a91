use rusqlite::{Connection, Result as SqlResult};

// Schema definitions. Timestamps are RFC 3339 text written by the
// application, so they sort lexicographically.
pub const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY NOT NULL,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    fname TEXT NOT NULL DEFAULT '',
    lname TEXT NOT NULL DEFAULT '',
    avatar TEXT,
    created_at TEXT NOT NULL
)
"#;

pub const PHOTOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS photos (
    id TEXT PRIMARY KEY NOT NULL,
    filename TEXT NOT NULL,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
)
"#;

// Tag names are stored lowercase; rows are never deleted, orphans persist.
pub const TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tags (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL UNIQUE
)
"#;

pub const PHOTO_TAGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS photo_tags (
    photo_id TEXT NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
    tag_id TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (photo_id, tag_id)
)
"#;

pub const COMMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY NOT NULL,
    text TEXT NOT NULL,
    photo_id TEXT NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
)
"#;

// The composite primary key carries the one-reaction-per-user-per-photo
// invariant; switching kinds is an upsert against it.
pub const LIKES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS likes (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    photo_id TEXT NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
    reaction_type TEXT NOT NULL CHECK(reaction_type IN ('like', 'heart', 'smile')),
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, photo_id)
)
"#;

pub const FOLLOWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    following_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (follower_id, following_id),
    CHECK (follower_id <> following_id)
)
"#;

pub const REPOSTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reposts (
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    photo_id TEXT NOT NULL REFERENCES photos(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, photo_id)
)
"#;

pub const SCHEMA_SQL: &[&str] = &[
    USERS_TABLE,
    PHOTOS_TABLE,
    TAGS_TABLE,
    PHOTO_TAGS_TABLE,
    COMMENTS_TABLE,
    LIKES_TABLE,
    FOLLOWS_TABLE,
    REPOSTS_TABLE,
    "CREATE INDEX IF NOT EXISTS idx_photos_user_id ON photos(user_id);",
    "CREATE INDEX IF NOT EXISTS idx_photos_created_at ON photos(created_at);",
    "CREATE INDEX IF NOT EXISTS idx_photo_tags_tag_id ON photo_tags(tag_id);",
    "CREATE INDEX IF NOT EXISTS idx_comments_photo_id ON comments(photo_id);",
    "CREATE INDEX IF NOT EXISTS idx_likes_photo_id ON likes(photo_id);",
    "CREATE INDEX IF NOT EXISTS idx_follows_following_id ON follows(following_id);",
    "CREATE INDEX IF NOT EXISTS idx_reposts_photo_id ON reposts(photo_id);",
];

pub fn initialize_schema(conn: &Connection) -> SqlResult<()> {
    for sql in SCHEMA_SQL {
        conn.execute(sql, [])?;
    }
    Ok(())
}
