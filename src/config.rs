use std::{env, path::PathBuf};

use anyhow::bail;

pub const DEFAULT_SUPERUSER_EMAIL: &str = "admin@qure.kz";
pub const DEFAULT_SUPERUSER_PASSWORD: &str = "admin123";
pub const DEFAULT_SEARCH_HISTORY_LIMIT: usize = 5;
pub const DEFAULT_JWT_TTL_HOURS: i64 = 24;
/// One year.
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 366;

/// How registry passwords are written and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordMode {
    /// Stored and compared as-is.
    #[default]
    Plaintext,
    Argon2,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TokenMode {
    /// `<role>-jwt-<id>-<epoch-millis>`, unsigned and never expiring.
    #[default]
    Legacy,
    /// HS256 JWT; rehydrated sessions are verified and expire.
    Signed { secret: String, ttl_hours: i64 },
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub password_mode: PasswordMode,
    pub token_mode: TokenMode,
    pub superuser_email: String,
    pub superuser_password: String,
    pub email_case_insensitive: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_mode: PasswordMode::default(),
            token_mode: TokenMode::default(),
            superuser_email: DEFAULT_SUPERUSER_EMAIL.to_string(),
            superuser_password: DEFAULT_SUPERUSER_PASSWORD.to_string(),
            email_case_insensitive: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// File backing the key-value store; in-memory storage when unset.
    pub storage_path: Option<PathBuf>,
    pub auth: AuthConfig,
    pub search_history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            auth: AuthConfig::default(),
            search_history_limit: DEFAULT_SEARCH_HISTORY_LIMIT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage_path = env::var("STORAGE_PATH").ok().map(PathBuf::from);

        let password_mode = match env::var("AUTH_PASSWORD_MODE").as_deref() {
            Err(_) | Ok("plaintext") => PasswordMode::Plaintext,
            Ok("argon2") => PasswordMode::Argon2,
            Ok(other) => bail!("unknown AUTH_PASSWORD_MODE: {other}"),
        };

        let token_mode = match env::var("AUTH_TOKEN_MODE").as_deref() {
            Err(_) | Ok("legacy") => TokenMode::Legacy,
            Ok("signed") => {
                let secret = env::var("JWT_SECRET")
                    .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
                let ttl_hours = match env::var("JWT_TTL_HOURS") {
                    Ok(raw) => raw
                        .parse::<i64>()
                        .ok()
                        .filter(|h| (1..=MAX_JWT_TTL_HOURS).contains(h))
                        .ok_or_else(|| anyhow::anyhow!("invalid JWT_TTL_HOURS: {raw}"))?,
                    Err(_) => DEFAULT_JWT_TTL_HOURS,
                };
                TokenMode::Signed { secret, ttl_hours }
            }
            Ok(other) => bail!("unknown AUTH_TOKEN_MODE: {other}"),
        };

        let superuser_email =
            env::var("SUPERUSER_EMAIL").unwrap_or_else(|_| DEFAULT_SUPERUSER_EMAIL.to_string());
        let superuser_password = env::var("SUPERUSER_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_SUPERUSER_PASSWORD.to_string());
        let email_case_insensitive = env::var("AUTH_EMAIL_CASE_INSENSITIVE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let search_history_limit = env::var("SEARCH_HISTORY_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_SEARCH_HISTORY_LIMIT);

        Ok(Self {
            storage_path,
            auth: AuthConfig {
                password_mode,
                token_mode,
                superuser_email,
                superuser_password,
                email_case_insensitive,
            },
            search_history_limit,
        })
    }
}
