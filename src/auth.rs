use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an identity token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub username: String,
    pub exp: u64,
}

/// The identity a verified token injects into protected handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing auth header")]
    MissingHeader,
    #[error("no token")]
    NoToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Issue a signed, time-limited token for the user.
pub fn create_token(
    secret: &str,
    ttl_secs: u64,
    user_id: &str,
    username: &str,
) -> Result<String, AuthError> {
    let claims = Claims {
        id: user_id.to_string(),
        username: username.to_string(),
        exp: Utc::now().timestamp() as u64 + ttl_secs,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verify a token and extract the identity it carries. Any decode failure,
/// including expiry, collapses to `InvalidToken` so callers leak nothing
/// about why verification failed.
pub fn verify_token(secret: &str, token: &str) -> Result<AuthUser, AuthError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AuthError::InvalidToken)?;
    Ok(AuthUser {
        id: data.claims.id,
        username: data.claims.username,
    })
}

/// The full request gate: take the raw Authorization header value, demand
/// the `Bearer <token>` form, verify the token.
pub fn authenticate_header(secret: &str, header: Option<&str>) -> Result<AuthUser, AuthError> {
    let bearer = header.ok_or(AuthError::MissingHeader)?;
    let token = bearer
        .split_once(' ')
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::NoToken)?;
    verify_token(secret, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn token_round_trip() {
        let token = create_token(SECRET, 3600, "user-1", "alice").unwrap();
        let user = verify_token(SECRET, &token).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let token = create_token(SECRET, 3600, "user-1", "alice").unwrap();
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn header_gate_rejects_bad_shapes() {
        assert!(matches!(
            authenticate_header(SECRET, None),
            Err(AuthError::MissingHeader)
        ));
        assert!(matches!(
            authenticate_header(SECRET, Some("Bearer")),
            Err(AuthError::NoToken)
        ));
        assert!(matches!(
            authenticate_header(SECRET, Some("Bearer not-a-token")),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn header_gate_accepts_bearer_token() {
        let token = create_token(SECRET, 3600, "user-2", "bob").unwrap();
        let header = format!("Bearer {}", token);
        let user = authenticate_header(SECRET, Some(&header)).unwrap();
        assert_eq!(user.username, "bob");
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }
}
