use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub db_path: String,
    pub upload_path: String,
    pub token_secret: String,
    pub token_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // The token secret has no default; starting without one is an error.
        let token_secret = env::var("INSTALITE_TOKEN_SECRET")
            .map_err(|_| "INSTALITE_TOKEN_SECRET is not set")?;

        Ok(Config {
            port: env::var("INSTALITE_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            host: env::var("INSTALITE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            db_path: env::var("INSTALITE_DB_PATH")
                .unwrap_or_else(|_| "./data/instalite.db".to_string()),
            upload_path: env::var("INSTALITE_UPLOAD_PATH")
                .unwrap_or_else(|_| "./uploads".to_string()),
            token_secret,
            token_ttl_secs: env::var("INSTALITE_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()?,
        })
    }
}
