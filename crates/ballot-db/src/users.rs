use crate::{DbError, DbPool};
use chrono::{DateTime, Utc};

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserAuthRow {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub async fn create_user(
    pool: &DbPool,
    id: &str,
    email: &str,
    display_name: &str,
    password_hash: &str,
) -> Result<UserRow, DbError> {
    let normalized_email = normalize_email(email);
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, email, display_name, password_hash)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING id, email, display_name, created_at",
    )
    .bind(id)
    .bind(normalized_email)
    .bind(display_name)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn get_user_by_id(pool: &DbPool, id: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, display_name, created_at
         FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<UserAuthRow>, DbError> {
    let normalized_email = normalize_email(email);
    let row = sqlx::query_as::<_, UserAuthRow>(
        "SELECT id, email, display_name, password_hash, created_at
         FROM users WHERE lower(email) = ?1",
    )
    .bind(normalized_email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
