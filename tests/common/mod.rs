#![allow(dead_code)]

use instalite::auth;
use instalite::config::Config;
use instalite::db::{DbPool, User};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        port: 0,
        host: "127.0.0.1".to_string(),
        db_path: ":memory:".to_string(),
        upload_path: std::env::temp_dir()
            .join("instalite-test-uploads")
            .to_string_lossy()
            .into_owned(),
        token_secret: TEST_SECRET.to_string(),
        token_ttl_secs: 3600,
    }
}

/// Insert an account directly and mint a token for it. The stored password
/// is a placeholder; tests that exercise sign-in go through the real
/// handler instead.
pub fn create_user(pool: &DbPool, username: &str) -> (User, String) {
    let user = User::create(pool, username, "not-a-real-hash", "Test", "User")
        .expect("failed to create test user");
    let token = auth::create_token(TEST_SECRET, 3600, &user.id, &user.username)
        .expect("failed to create test token");
    (user, token)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn json_body(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).expect("response body was not valid JSON")
}
