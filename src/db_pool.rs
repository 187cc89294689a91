use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::db_schema::initialize_schema;

pub type DbPool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

pub fn create_db_pool(database_path: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = std::path::Path::new(database_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    // foreign_keys and busy_timeout are connection-level settings, so they
    // run on every connection the pool opens.
    let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
    });
    let pool = Pool::new(manager)?;

    // Initialize schema and configure database-level pragmas on a connection
    // from the pool. WAL mode improves concurrency; synchronous NORMAL is a
    // sensible durability/speed tradeoff under WAL.
    {
        let conn = pool.get()?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )?;
        initialize_schema(&conn)?;
    }

    Ok(pool)
}

/// In-memory pool for tests. Capped at one connection: each `:memory:`
/// connection is its own database, so a larger pool would hand tests
/// different (empty) databases.
pub fn create_test_db_pool() -> Result<DbPool, Box<dyn std::error::Error>> {
    let manager = SqliteConnectionManager::memory()
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
    let pool = Pool::builder().max_size(1).build(manager)?;

    {
        let conn = pool.get()?;
        initialize_schema(&conn)?;
    }

    Ok(pool)
}
