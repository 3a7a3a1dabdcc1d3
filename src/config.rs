// src/config.rs
use derive_more::Display;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_ADDRESS: &str = "127.0.0.1:8000";
const DEFAULT_STORAGE_PATH: &str = "./storage";
const DEFAULT_JWT_SECRET: &str = "collabdocs_super_secret_key";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Display)]
pub enum ConfigError {
    #[display(fmt = "invalid value for {}: {}", key, value)]
    InvalidValue { key: String, value: String },
}

impl std::error::Error for ConfigError {}

// Runtime settings, read from the environment (and .env when present)
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_address: String,
    pub storage_path: PathBuf,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub reset_token_expire_minutes: i64,
    pub frontend_url: String,
    pub bcrypt_cost: u32,
    /// Return password reset tokens in the response body instead of only logging them.
    pub expose_reset_tokens: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_address: DEFAULT_ADDRESS.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
            reset_token_expire_minutes: 30,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            expose_reset_tokens: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let defaults = Settings::default();

        Ok(Self {
            server_address: env::var("SERVER_ADDRESS").unwrap_or(defaults.server_address),
            storage_path: env::var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            access_token_expire_minutes: parse_var(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                defaults.access_token_expire_minutes,
            )?,
            refresh_token_expire_days: parse_var(
                "REFRESH_TOKEN_EXPIRE_DAYS",
                defaults.refresh_token_expire_days,
            )?,
            reset_token_expire_minutes: parse_var(
                "RESET_TOKEN_EXPIRE_MINUTES",
                defaults.reset_token_expire_minutes,
            )?,
            frontend_url: env::var("FRONTEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
            expose_reset_tokens: parse_var("EXPOSE_RESET_TOKENS", defaults.expose_reset_tokens)?,
        })
    }

    // Link handed out for a share token
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/share/{}", self.frontend_url, token)
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_url_joins_frontend_and_token() {
        let settings = Settings {
            frontend_url: "https://docs.example.com".to_string(),
            ..Settings::default()
        };
        assert_eq!(
            settings.share_url("abc123"),
            "https://docs.example.com/share/abc123"
        );
    }

    #[test]
    fn parse_var_rejects_garbage() {
        env::set_var("COLLABDOCS_TEST_BAD_NUMBER", "thirty");
        let parsed: Result<i64, _> = parse_var("COLLABDOCS_TEST_BAD_NUMBER", 30);
        assert!(parsed.is_err());
        env::remove_var("COLLABDOCS_TEST_BAD_NUMBER");
    }

    #[test]
    fn parse_var_falls_back_to_default() {
        let parsed: i64 = parse_var("COLLABDOCS_TEST_UNSET_NUMBER", 7).unwrap();
        assert_eq!(parsed, 7);
    }
}
