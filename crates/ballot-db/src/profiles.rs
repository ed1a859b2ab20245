use crate::{DbError, DbPool};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create the profile row if it does not exist yet. Existing rows are left
/// untouched, so the insert is safe to race from concurrent requests.
pub async fn ensure_profile(
    pool: &DbPool,
    id: &str,
    email: &str,
    full_name: Option<&str>,
) -> Result<ProfileRow, DbError> {
    sqlx::query(
        "INSERT INTO profiles (id, email, full_name)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(id)
    .bind(email)
    .bind(full_name)
    .execute(pool)
    .await?;

    get_profile(pool, id).await?.ok_or(DbError::NotFound)
}

pub async fn get_profile(pool: &DbPool, id: &str) -> Result<Option<ProfileRow>, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, email, full_name, avatar_url, created_at, updated_at
         FROM profiles WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
