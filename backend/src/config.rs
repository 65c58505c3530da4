use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub session_secret: String,
    pub qr_token_secret: String,
    pub session_expiration_hours: u64,
    pub qr_token_expiration_days: u64,
    /// Base URL embedded in QR login links (must end with a slash).
    pub public_base_url: String,
    pub secure_cookies: bool,
    pub default_admin_username: String,
    pub default_admin_password: String,
    pub default_member_password: String,
    pub rate_limit_burst: u32,
    pub rate_limit_window_seconds: u64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./qrpass.db".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let session_secret = env::var("SESSION_SECRET")
            .unwrap_or_else(|_| "dev-key-change-in-production".to_string());

        let qr_token_secret = env::var("QR_TOKEN_SECRET")
            .unwrap_or_else(|_| "super-secret-key-change-this".to_string());

        let session_expiration_hours = env::var("SESSION_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .unwrap_or(1);

        let qr_token_expiration_days = env::var("QR_TOKEN_EXPIRATION_DAYS")
            .unwrap_or_else(|_| "365".to_string())
            .parse()
            .unwrap_or(365);

        let mut public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:8080/".to_string());
        if !public_base_url.ends_with('/') {
            public_base_url.push('/');
        }

        let secure_cookies = env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let default_admin_username =
            env::var("DEFAULT_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let default_admin_password =
            env::var("DEFAULT_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
        let default_member_password =
            env::var("DEFAULT_MEMBER_PASSWORD").unwrap_or_else(|_| "123456".to_string());

        let rate_limit_burst = env::var("RATE_LIMIT_BURST")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let rate_limit_window_seconds = env::var("RATE_LIMIT_WINDOW_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        Ok(Config {
            database_url,
            port,
            session_secret,
            qr_token_secret,
            session_expiration_hours,
            qr_token_expiration_days,
            public_base_url,
            secure_cookies,
            default_admin_username,
            default_admin_password,
            default_member_password,
            rate_limit_burst,
            rate_limit_window_seconds,
        })
    }
}
