use std::sync::Arc;

use qure_storefront::{
    clock::{FixedClock, SystemClock},
    config::{AuthConfig, PasswordMode, TokenMode},
    dto::auth::{LoginRequest, RegisterRequest},
    error::AppError,
    models::{Role, User},
    services::auth_service::{AuthSessionManager, ensure_admin},
    storage::{MemoryStorage, Storage, StorageError, keys},
};

const NOW_MILLIS: i64 = 1_700_000_000_000;

fn manager(storage: &Storage, config: AuthConfig) -> AuthSessionManager {
    AuthSessionManager::new(
        storage.clone(),
        config,
        Arc::new(FixedClock::from_millis(NOW_MILLIS)),
    )
}

fn register(auth: &mut AuthSessionManager, email: &str, password: &str) -> User {
    auth.register(RegisterRequest {
        name: "Аня".into(),
        email: email.into(),
        password: password.into(),
    })
    .expect("registration succeeds")
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.into(),
        password: password.into(),
    }
}

#[test]
fn login_accepts_right_password_and_rejects_wrong_one() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut auth = manager(&storage, AuthConfig::default());
    register(&mut auth, "e@qure.kz", "p");

    let session = auth.login(login("e@qure.kz", "p"))?;
    assert_eq!(session.user.role, Role::User);

    auth.logout()?;
    let wrong = auth.login(login("e@qure.kz", "wrong")).unwrap_err();
    assert!(matches!(wrong, AppError::InvalidCredentials));

    let unknown = auth.login(login("nobody@qure.kz", "p")).unwrap_err();
    assert_eq!(unknown.to_string(), wrong.to_string());
    assert!(auth.current_session().is_none());
    Ok(())
}

#[test]
fn superuser_logs_in_with_empty_registry() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut auth = manager(&storage, AuthConfig::default());

    let session = auth.login(login("admin@qure.kz", "admin123"))?;
    assert_eq!(session.user.role, Role::Admin);
    assert!(session.token.starts_with("admin-jwt-"));
    assert!(auth.registered_users().is_empty());
    Ok(())
}

#[test]
fn duplicate_email_is_rejected_without_appending() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut auth = manager(&storage, AuthConfig::default());
    register(&mut auth, "e@qure.kz", "p");

    let err = auth
        .register(RegisterRequest {
            name: "Any Name".into(),
            email: "e@qure.kz".into(),
            password: "anypassword".into(),
        })
        .unwrap_err();
    assert!(matches!(err, AppError::EmailTaken));
    assert_eq!(auth.registered_users().len(), 1);
    Ok(())
}

#[test]
fn email_comparison_is_exact_unless_configured() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut auth = manager(&storage, AuthConfig::default());
    register(&mut auth, "A@qure.kz", "p");
    register(&mut auth, "a@qure.kz", "p");
    assert_eq!(auth.registered_users().len(), 2);

    let folded = Storage::in_memory();
    let mut auth = manager(
        &folded,
        AuthConfig {
            email_case_insensitive: true,
            ..AuthConfig::default()
        },
    );
    register(&mut auth, "A@qure.kz", "p");
    let err = auth
        .register(RegisterRequest {
            name: "Аня".into(),
            email: "a@qure.kz".into(),
            password: "p".into(),
        })
        .unwrap_err();
    assert!(matches!(err, AppError::EmailTaken));
    assert!(auth.login(login("a@QURE.kz", "p")).is_ok());
    Ok(())
}

#[test]
fn registration_does_not_start_a_session() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut auth = manager(&storage, AuthConfig::default());
    let user = register(&mut auth, "e@qure.kz", "p");

    assert_eq!(user.role, Role::User);
    assert_eq!(user.password, "p");
    assert!(user.created_at.is_some());
    assert!(auth.current_session().is_none());
    assert!(storage.get(keys::TOKEN)?.is_none());
    Ok(())
}

#[test]
fn login_persists_session_keys() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut auth = manager(&storage, AuthConfig::default());
    let user = register(&mut auth, "e@qure.kz", "p");

    let session = auth.login(login("e@qure.kz", "p"))?;
    assert_eq!(session.token, format!("user-jwt-{}-{NOW_MILLIS}", user.id));

    assert_eq!(storage.get(keys::TOKEN)?, Some(session.token.clone()));
    assert_eq!(storage.get(keys::AUTH_TOKEN)?, Some(session.token.clone()));
    assert_eq!(storage.get(keys::USER_ID)?, Some(user.id.to_string()));
    let stored_user = storage.get(keys::USER)?.expect("user stored");
    assert!(!stored_user.contains("password"));
    Ok(())
}

#[test]
fn session_is_rehydrated_and_cleared_by_logout() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut auth = manager(&storage, AuthConfig::default());
    register(&mut auth, "e@qure.kz", "p");
    let session = auth.login(login("e@qure.kz", "p"))?;

    let mut restarted = manager(&storage, AuthConfig::default());
    assert_eq!(restarted.current_session(), Some(&session));

    restarted.logout()?;
    assert!(restarted.current_session().is_none());
    for key in [keys::USER, keys::TOKEN, keys::AUTH_TOKEN, keys::USER_ID] {
        assert!(storage.get(key)?.is_none(), "{key} still set");
    }
    assert!(manager(&storage, AuthConfig::default()).current_session().is_none());
    Ok(())
}

#[test]
fn legacy_session_is_trusted_as_stored() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    storage.set(
        keys::USER,
        r#"{"id":42,"name":"Аня","email":"e@qure.kz","role":"user"}"#,
    )?;
    storage.set(keys::AUTH_TOKEN, r#""user-jwt-42-1""#)?;

    let mut auth = manager(&storage, AuthConfig::default());
    let session = auth.current_session().expect("session");
    assert_eq!(session.token, "user-jwt-42-1");
    assert_eq!(session.user.id.to_string(), "42");
    Ok(())
}

#[test]
fn argon2_mode_hashes_and_verifies() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let config = AuthConfig {
        password_mode: PasswordMode::Argon2,
        ..AuthConfig::default()
    };
    let mut auth = manager(&storage, config);
    let user = register(&mut auth, "e@qure.kz", "secret");

    assert!(user.password.starts_with("$argon2"));
    assert!(auth.login(login("e@qure.kz", "secret")).is_ok());
    assert!(matches!(
        auth.login(login("e@qure.kz", "nope")),
        Err(AppError::InvalidCredentials)
    ));
    Ok(())
}

#[test]
fn signed_tokens_are_verified_on_rehydrate() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let config = AuthConfig {
        token_mode: TokenMode::Signed {
            secret: "test-secret".into(),
            ttl_hours: 1,
        },
        ..AuthConfig::default()
    };
    let mut auth = AuthSessionManager::new(storage.clone(), config.clone(), Arc::new(SystemClock));
    let session = auth.login(login("admin@qure.kz", "admin123"))?;
    assert_eq!(session.token.split('.').count(), 3);

    let mut restarted =
        AuthSessionManager::new(storage.clone(), config.clone(), Arc::new(SystemClock));
    assert_eq!(restarted.current_session(), Some(&session));

    storage.set(keys::TOKEN, "admin-jwt-admin-1")?;
    let mut forged = AuthSessionManager::new(storage.clone(), config, Arc::new(SystemClock));
    assert!(forged.current_session().is_none());
    assert!(storage.get(keys::USER)?.is_none());
    Ok(())
}

#[test]
fn out_of_range_token_lifetimes_fail_login() {
    for ttl_hours in [i64::MAX, i64::MIN, -1_000_000] {
        let storage = Storage::in_memory();
        let config = AuthConfig {
            token_mode: TokenMode::Signed {
                secret: "test-secret".into(),
                ttl_hours,
            },
            ..AuthConfig::default()
        };
        let mut auth = manager(&storage, config);
        assert!(
            matches!(
                auth.login(login("admin@qure.kz", "admin123")),
                Err(AppError::Internal(_))
            ),
            "ttl {ttl_hours} accepted"
        );
        assert!(auth.current_session().is_none());
        assert!(storage.get(keys::USER).ok().flatten().is_none());
    }
}

#[test]
fn failed_session_write_leaves_no_partial_session() -> anyhow::Result<()> {
    let scratch = Storage::in_memory();
    manager(&scratch, AuthConfig::default()).login(login("admin@qure.kz", "admin123"))?;
    let user_json = scratch.get(keys::USER)?.expect("user stored");

    // room for the user record but not for the tokens
    let limit = keys::USER.len() + user_json.len() + 8;
    let storage = Storage::new(Arc::new(MemoryStorage::with_quota(limit)));
    let mut auth = manager(&storage, AuthConfig::default());

    let err = auth
        .login(login("admin@qure.kz", "admin123"))
        .expect_err("quota exceeded");
    assert!(matches!(
        err,
        AppError::Storage(StorageError::QuotaExceeded { .. })
    ));
    assert!(storage.keys()?.is_empty());
    assert!(auth.current_session().is_none());
    Ok(())
}

#[test]
fn ensure_admin_requires_admin_role() -> anyhow::Result<()> {
    let storage = Storage::in_memory();
    let mut auth = manager(&storage, AuthConfig::default());
    register(&mut auth, "e@qure.kz", "p");

    assert!(matches!(ensure_admin(None), Err(AppError::Forbidden)));

    let user = auth.login(login("e@qure.kz", "p"))?;
    assert!(matches!(ensure_admin(Some(&user)), Err(AppError::Forbidden)));

    let admin = auth.login(login("admin@qure.kz", "admin123"))?;
    assert!(ensure_admin(Some(&admin)).is_ok());
    Ok(())
}
