use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use warp::{Rejection, Reply};

use crate::auth;
use crate::config::Config;
use crate::db::{DbPool, User};
use crate::warp_helpers::{db_rejection, validation, UnauthorizedError};

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub lname: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Account as returned on registration: the full profile, never the
/// password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub id: String,
    pub username: String,
    pub fname: String,
    pub lname: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn sign_up(request: SignUpRequest, db_pool: DbPool) -> Result<impl Reply, Rejection> {
    let (username, password) = match (request.username.as_deref(), request.password.as_deref()) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            (username, password)
        }
        _ => return Err(validation("Username and password are required")),
    };

    let existing = User::find_by_username(&db_pool, username).map_err(db_rejection)?;
    if existing.is_some() {
        return Err(validation("username already taken"));
    }

    let hash = auth::hash_password(password).map_err(|err| {
        log::error!("Password hashing failed: {}", err);
        warp::reject::custom(crate::warp_helpers::DatabaseError {
            message: "something went wrong".to_string(),
        })
    })?;

    let user = User::create(
        &db_pool,
        username,
        &hash,
        request.fname.as_deref().unwrap_or(""),
        request.lname.as_deref().unwrap_or(""),
    )
    .map_err(db_rejection)?;

    log::info!("New account: {}", user.username);

    Ok(warp::reply::with_status(
        warp::reply::json(&SignUpResponse {
            id: user.id,
            username: user.username,
            fname: user.fname,
            lname: user.lname,
            avatar: user.avatar,
            created_at: user.created_at,
        }),
        warp::http::StatusCode::CREATED,
    ))
}

pub async fn sign_in(
    request: SignInRequest,
    config: Config,
    db_pool: DbPool,
) -> Result<impl Reply, Rejection> {
    let (username, password) = match (request.username.as_deref(), request.password.as_deref()) {
        (Some(username), Some(password)) => (username, password),
        _ => return Err(validation("Username and password are required")),
    };

    // Unknown user and wrong password produce the same response.
    let user = User::find_by_username(&db_pool, username)
        .map_err(db_rejection)?
        .ok_or_else(|| {
            warp::reject::custom(UnauthorizedError {
                message: "wrong credentials".to_string(),
            })
        })?;

    if !auth::verify_password(password, &user.password) {
        return Err(warp::reject::custom(UnauthorizedError {
            message: "wrong credentials".to_string(),
        }));
    }

    let token = auth::create_token(
        &config.token_secret,
        config.token_ttl_secs,
        &user.id,
        &user.username,
    )
    .map_err(|err| {
        log::error!("Token signing failed: {}", err);
        warp::reject::custom(crate::warp_helpers::DatabaseError {
            message: "something went wrong".to_string(),
        })
    })?;

    Ok(warp::reply::json(&json!({ "token": token })))
}
