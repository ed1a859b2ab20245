use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use ballot_db::users::UserRow;
use ballot_db::DbPool;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

const MIN_PASSWORD_LEN: usize = 8;

/// Access token payload. `sub` is the user id; email and display name ride
/// along so profile bootstrap does not need an extra lookup per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller as seen by handlers and core operations.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn create_token(
    user_id: &str,
    email: &str,
    display_name: &str,
    secret: &str,
    expiry_seconds: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        name: display_name.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now,
        exp: now + expiry_seconds as i64,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

pub async fn register(
    pool: &DbPool,
    email: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<UserRow, CoreError> {
    let email = email.trim();

    if email.is_empty() || !email.contains('@') {
        return Err(CoreError::Validation("A valid email is required.".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    // Absent or blank display name falls back to the email's local part.
    let display_name = match display_name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => email.split('@').next().unwrap_or(email),
    };

    if ballot_db::users::get_user_by_email(pool, email).await?.is_some() {
        return Err(CoreError::Conflict("Email is already registered.".into()));
    }

    let password_hash =
        hash_password(password).map_err(|e| CoreError::Internal(e.to_string()))?;
    let user_id = Uuid::new_v4().to_string();
    // Two racing registrations can both pass the lookup above; the loser of
    // the UNIQUE(email) insert gets the same conflict, not a store failure.
    let user = ballot_db::users::create_user(pool, &user_id, email, display_name, &password_hash)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                CoreError::Conflict("Email is already registered.".into())
            } else {
                CoreError::from(e)
            }
        })?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

pub async fn login(pool: &DbPool, email: &str, password: &str) -> Result<UserRow, CoreError> {
    let auth = ballot_db::users::get_user_by_email(pool, email.trim())
        .await?
        .ok_or(CoreError::InvalidCredentials)?;

    let valid = verify_password(password, &auth.password_hash).unwrap_or(false);
    if !valid {
        return Err(CoreError::InvalidCredentials);
    }

    Ok(UserRow {
        id: auth.id,
        email: auth.email,
        display_name: auth.display_name,
        created_at: auth.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> DbPool {
        let pool = ballot_db::create_pool("sqlite::memory:", 1).await.unwrap();
        ballot_db::run_migrations(&pool).await.unwrap();
        pool
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn token_round_trip() {
        let token = create_token("u1", "a@example.com", "Alice", "secret", 3600).unwrap();
        let claims = validate_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.name, "Alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_rejects_wrong_secret() {
        let token = create_token("u1", "a@example.com", "Alice", "secret", 3600).unwrap();
        assert!(validate_token(&token, "other-secret").is_err());
    }

    #[test]
    fn token_rejects_expired() {
        // Craft a token whose expiry is past the default validation leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "u1".to_string(),
            email: "a@example.com".to_string(),
            name: "Alice".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(validate_token(&token, "secret").is_err());
    }

    #[tokio::test]
    async fn register_and_login() {
        let pool = test_pool().await;
        let user = register(&pool, "new@example.com", "longenough", Some("Newbie"))
            .await
            .unwrap();
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.display_name, "Newbie");

        let logged_in = login(&pool, "new@example.com", "longenough").await.unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn register_derives_display_name_from_email() {
        let pool = test_pool().await;
        let user = register(&pool, "carol@example.com", "longenough", None)
            .await
            .unwrap();
        assert_eq!(user.display_name, "carol");

        let blank = register(&pool, "dave@example.com", "longenough", Some("   "))
            .await
            .unwrap();
        assert_eq!(blank.display_name, "dave");
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let pool = test_pool().await;
        let result = register(&pool, "short@example.com", "tiny", Some("Shorty")).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn register_rejects_bad_email() {
        let pool = test_pool().await;
        let result = register(&pool, "not-an-email", "longenough", None).await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let pool = test_pool().await;
        register(&pool, "dup@example.com", "longenough", Some("First"))
            .await
            .unwrap();
        let result = register(&pool, "dup@example.com", "longenough", Some("Second")).await;
        assert!(matches!(result, Err(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn concurrent_registrations_yield_one_user_and_one_conflict() {
        let pool = test_pool().await;

        // Both can pass the duplicate lookup before either inserts; the
        // loser must still come back as a conflict, not a store failure.
        let (a, b) = tokio::join!(
            register(&pool, "race@example.com", "longenough", Some("First")),
            register(&pool, "race@example.com", "longenough", Some("Second")),
        );
        assert!(a.is_ok() != b.is_ok(), "exactly one registration must win");
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(CoreError::Conflict(_))));

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = 'race@example.com'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn login_rejects_unknown_email() {
        let pool = test_pool().await;
        let result = login(&pool, "ghost@example.com", "whatever123").await;
        assert!(matches!(result, Err(CoreError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let pool = test_pool().await;
        register(&pool, "user@example.com", "rightpassword", Some("User"))
            .await
            .unwrap();
        let result = login(&pool, "user@example.com", "wrongpassword").await;
        assert!(matches!(result, Err(CoreError::InvalidCredentials)));
    }
}
