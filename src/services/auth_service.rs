use std::sync::Arc;

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Duration;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode as decode_jwt, encode as encode_jwt,
};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    clock::Clock,
    codec::{decode, encode},
    config::{AuthConfig, PasswordMode, TokenMode},
    dto::auth::{Claims, LoginRequest, RegisterRequest},
    error::{AppError, AppResult},
    models::{Id, PublicUser, Role, Session, User},
    storage::{Storage, keys},
};

const SUPERUSER_ID: &str = "admin";
const SUPERUSER_NAME: &str = "Администратор";
const SESSION_KEYS: [&str; 4] = [keys::USER, keys::TOKEN, keys::AUTH_TOKEN, keys::USER_ID];

#[derive(Debug)]
enum SessionState {
    /// Storage not consulted yet in this process.
    Unloaded,
    LoggedOut,
    LoggedIn(Session),
}

/// Owner of the `user`, `token`, `authToken` and `userId` keys, with read
/// and append access to the `users` registry.
#[derive(Debug)]
pub struct AuthSessionManager {
    storage: Storage,
    config: AuthConfig,
    clock: Arc<dyn Clock>,
    state: SessionState,
}

impl AuthSessionManager {
    pub fn new(storage: Storage, config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            config,
            clock,
            state: SessionState::Unloaded,
        }
    }

    /// The active session, rehydrated from storage on first access.
    pub fn current_session(&mut self) -> Option<&Session> {
        if matches!(self.state, SessionState::Unloaded) {
            self.state = match self.rehydrate() {
                Some(session) => SessionState::LoggedIn(session),
                None => SessionState::LoggedOut,
            };
        }
        match &self.state {
            SessionState::LoggedIn(session) => Some(session),
            _ => None,
        }
    }

    /// Unknown email and wrong password produce the same error.
    pub fn login(&mut self, payload: LoginRequest) -> AppResult<Session> {
        let LoginRequest { email, password } = payload;

        let user = if self.is_superuser(&email, &password) {
            PublicUser {
                id: Id::Text(SUPERUSER_ID.to_string()),
                name: SUPERUSER_NAME.to_string(),
                email: self.config.superuser_email.clone(),
                role: Role::Admin,
            }
        } else {
            let registry = self.registry();
            let found = registry.iter().find(|u| {
                self.emails_match(&u.email, &email) && self.password_matches(&u.password, &password)
            });
            match found {
                Some(u) => PublicUser::from(u),
                None => {
                    tracing::debug!("login rejected");
                    return Err(AppError::InvalidCredentials);
                }
            }
        };

        let token = self.issue_token(&user)?;
        let session = Session { user, token };
        self.persist_session(&session)?;
        self.state = SessionState::LoggedIn(session.clone());

        log_audit(
            Some(&session.user.id),
            "user_login",
            Some(keys::USER),
            Some(serde_json::json!({ "role": session.user.role.as_str() })),
        );
        Ok(session)
    }

    /// Appends a `user`-role record. Does not log the new user in.
    pub fn register(&mut self, payload: RegisterRequest) -> AppResult<User> {
        let RegisterRequest {
            name,
            email,
            password,
        } = payload;

        let mut registry = self.registry();
        if registry.iter().any(|u| self.emails_match(&u.email, &email)) {
            return Err(AppError::EmailTaken);
        }

        let password = match self.config.password_mode {
            PasswordMode::Plaintext => password,
            PasswordMode::Argon2 => hash_password(&password)?,
        };

        let user = User {
            id: Id::Text(Uuid::new_v4().to_string()),
            name,
            email,
            password,
            role: Role::User,
            created_at: Some(self.clock.now()),
        };
        registry.push(user.clone());
        encode(&self.storage, keys::USERS, &registry)?;

        log_audit(Some(&user.id), "user_register", Some(keys::USERS), None);
        Ok(user)
    }

    /// Ends the in-memory session even if clearing storage fails.
    pub fn logout(&mut self) -> AppResult<()> {
        let previous = std::mem::replace(&mut self.state, SessionState::LoggedOut);
        self.clear_persisted()?;
        if let SessionState::LoggedIn(session) = previous {
            log_audit(Some(&session.user.id), "user_logout", Some(keys::USER), None);
        }
        Ok(())
    }

    /// Registry entries without passwords.
    pub fn registered_users(&self) -> Vec<PublicUser> {
        self.registry().iter().map(PublicUser::from).collect()
    }

    /// Forgets the in-memory session so the next access re-reads storage.
    pub fn reload(&mut self) {
        self.state = SessionState::Unloaded;
    }

    /// Clears the session keys and the registry.
    pub fn reset(&mut self) -> AppResult<()> {
        self.clear_persisted()?;
        self.storage.remove(keys::USERS)?;
        self.state = SessionState::LoggedOut;
        Ok(())
    }

    fn registry(&self) -> Vec<User> {
        decode(&self.storage, keys::USERS, Vec::new())
    }

    fn is_superuser(&self, email: &str, password: &str) -> bool {
        self.emails_match(&self.config.superuser_email, email)
            && password == self.config.superuser_password
    }

    fn emails_match(&self, stored: &str, given: &str) -> bool {
        if self.config.email_case_insensitive {
            stored.to_lowercase() == given.to_lowercase()
        } else {
            stored == given
        }
    }

    /// Records that are not PHC strings are compared as plaintext, so a
    /// registry written before switching to argon2 keeps working.
    fn password_matches(&self, stored: &str, given: &str) -> bool {
        match self.config.password_mode {
            PasswordMode::Plaintext => stored == given,
            PasswordMode::Argon2 => match PasswordHash::new(stored) {
                Ok(parsed) => Argon2::default()
                    .verify_password(given.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => stored == given,
            },
        }
    }

    fn issue_token(&self, user: &PublicUser) -> AppResult<String> {
        match &self.config.token_mode {
            TokenMode::Legacy => Ok(format!(
                "{}-jwt-{}-{}",
                user.role.as_str(),
                user.id,
                self.clock.now_millis()
            )),
            TokenMode::Signed { secret, ttl_hours } => {
                let expiration = Duration::try_hours(*ttl_hours)
                    .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
                    .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;
                let exp = usize::try_from(expiration.timestamp())
                    .map_err(|_| AppError::Internal(anyhow::anyhow!("Token expires before epoch")))?;
                let claims = Claims {
                    sub: user.id.to_string(),
                    role: user.role.as_str().to_string(),
                    exp,
                };
                encode_jwt(
                    &Header::default(),
                    &claims,
                    &EncodingKey::from_secret(secret.as_bytes()),
                )
                .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
            }
        }
    }

    fn rehydrate(&self) -> Option<Session> {
        let user: PublicUser = decode(&self.storage, keys::USER, None)?;
        let token = self
            .read_raw(keys::TOKEN)
            .or_else(|| self.read_raw(keys::AUTH_TOKEN))?;

        if let TokenMode::Signed { secret, .. } = &self.config.token_mode {
            let verified = decode_jwt::<Claims>(
                &token,
                &DecodingKey::from_secret(secret.as_bytes()),
                &Validation::default(),
            );
            match verified {
                Ok(data) if data.claims.sub == user.id.to_string() => {}
                _ => {
                    tracing::warn!("stored session token rejected");
                    if let Err(err) = self.clear_persisted() {
                        tracing::warn!(error = %err, "failed to clear rejected session");
                    }
                    return None;
                }
            }
        }

        tracing::debug!(user_id = %user.id, "session rehydrated");
        Some(Session { user, token })
    }

    /// Token and id are stored as bare strings; tolerate a JSON-quoted one.
    fn read_raw(&self, key: &str) -> Option<String> {
        let raw = match self.storage.get(key) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(key, error = %err, "storage read failed");
                return None;
            }
        };
        let value = if raw.starts_with('"') {
            serde_json::from_str::<String>(&raw).unwrap_or(raw)
        } else {
            raw
        };
        Some(value).filter(|v| !v.is_empty())
    }

    /// All four keys are written or none are; on failure the previous
    /// values are put back.
    fn persist_session(&self, session: &Session) -> AppResult<()> {
        let previous = SESSION_KEYS
            .iter()
            .map(|&key| -> AppResult<(&'static str, Option<String>)> {
                Ok((key, self.storage.get(key)?))
            })
            .collect::<AppResult<Vec<_>>>()?;

        if let Err(err) = self.write_session(session) {
            for (key, value) in previous {
                let restored = match value {
                    Some(value) => self.storage.set(key, &value),
                    None => self.storage.remove(key),
                };
                if let Err(restore_err) = restored {
                    tracing::warn!(key, error = %restore_err, "failed to roll back session key");
                }
            }
            return Err(err);
        }
        Ok(())
    }

    fn write_session(&self, session: &Session) -> AppResult<()> {
        encode(&self.storage, keys::USER, &session.user)?;
        self.storage.set(keys::TOKEN, &session.token)?;
        self.storage.set(keys::AUTH_TOKEN, &session.token)?;
        self.storage.set(keys::USER_ID, &session.user.id.to_string())?;
        Ok(())
    }

    fn clear_persisted(&self) -> AppResult<()> {
        for key in SESSION_KEYS {
            self.storage.remove(key)?;
        }
        Ok(())
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

/// Fails with `Forbidden` unless an admin is logged in.
pub fn ensure_admin(session: Option<&Session>) -> AppResult<&Session> {
    match session {
        Some(session) if session.is_admin() => Ok(session),
        _ => Err(AppError::Forbidden),
    }
}
