use serde::Serialize;
use std::convert::Infallible;

use warp::{reject, Filter, Rejection, Reply};

use crate::auth::{self, AuthUser};
use crate::config::Config;
use crate::db::DbPool;

/// Every error response carries a human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationError {
    pub message: String,
}

impl reject::Reject for ValidationError {}

#[derive(Debug)]
pub struct UnauthorizedError {
    pub message: String,
}

impl reject::Reject for UnauthorizedError {}

#[derive(Debug)]
pub struct ForbiddenError {
    pub message: String,
}

impl reject::Reject for ForbiddenError {}

#[derive(Debug)]
pub struct NotFoundError {
    pub message: String,
}

impl reject::Reject for NotFoundError {}

#[derive(Debug)]
pub struct DatabaseError {
    pub message: String,
}

impl reject::Reject for DatabaseError {}

pub fn validation(message: impl Into<String>) -> Rejection {
    reject::custom(ValidationError {
        message: message.into(),
    })
}

pub fn forbidden(message: impl Into<String>) -> Rejection {
    reject::custom(ForbiddenError {
        message: message.into(),
    })
}

pub fn not_found(message: impl Into<String>) -> Rejection {
    reject::custom(NotFoundError {
        message: message.into(),
    })
}

pub fn db_rejection(err: Box<dyn std::error::Error>) -> Rejection {
    log::error!("Database error: {}", err);
    reject::custom(DatabaseError {
        message: format!("Database error: {}", err),
    })
}

pub fn with_db(db_pool: DbPool) -> impl Filter<Extract = (DbPool,), Error = Infallible> + Clone {
    warp::any().map(move || db_pool.clone())
}

pub fn with_config(config: Config) -> impl Filter<Extract = (Config,), Error = Infallible> + Clone {
    warp::any().map(move || config.clone())
}

/// The authentication gate for protected routes: verify the bearer token
/// and hand the identity it carries to the handler. Missing header, bad
/// header shape and invalid token all reject as 401 with distinct messages.
pub fn with_auth(config: Config) -> impl Filter<Extract = (AuthUser,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let secret = config.token_secret.clone();
        async move {
            auth::authenticate_header(&secret, header.as_deref()).map_err(|err| {
                reject::custom(UnauthorizedError {
                    message: err.to_string(),
                })
            })
        }
    })
}

/// Base URL for building photo access links, derived from the request's
/// Host header with the configured bind address as fallback.
pub fn request_base_url(host: Option<&str>, config: &Config) -> String {
    match host {
        Some(host) => format!("http://{}", host),
        None => format!("http://{}:{}", config.host, config.port),
    }
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not found".to_string();
    } else if let Some(validation_error) = err.find::<ValidationError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = validation_error.message.clone();
    } else if let Some(unauthorized_error) = err.find::<UnauthorizedError>() {
        code = warp::http::StatusCode::UNAUTHORIZED;
        message = unauthorized_error.message.clone();
    } else if let Some(forbidden_error) = err.find::<ForbiddenError>() {
        code = warp::http::StatusCode::FORBIDDEN;
        message = forbidden_error.message.clone();
    } else if let Some(not_found_error) = err.find::<NotFoundError>() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = not_found_error.message.clone();
    } else if let Some(database_error) = err.find::<DatabaseError>() {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = database_error.message.clone();
    } else if let Some(body_error) = err.find::<warp::body::BodyDeserializeError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = body_error.to_string();
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = warp::http::StatusCode::PAYLOAD_TOO_LARGE;
        message = "Payload too large".to_string();
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        code = warp::http::StatusCode::UNSUPPORTED_MEDIA_TYPE;
        message = "Unsupported media type".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method not allowed".to_string();
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "something went wrong".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorMessage { message }),
        code,
    ))
}

pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
}
