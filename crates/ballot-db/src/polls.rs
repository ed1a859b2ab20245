use crate::{DbError, DbPool};
use ballot_models::PollStatus;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollRow {
    pub id: String,
    pub creator_id: String,
    pub question: String,
    pub description: Option<String>,
    pub status: String,
    pub is_public: bool,
    pub allow_multiple_votes: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollOptionRow {
    pub id: String,
    pub poll_id: String,
    pub option_text: String,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
}

/// Option with its tally, ordered by display order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OptionTallyRow {
    pub id: String,
    pub option_text: String,
    pub display_order: i64,
    pub vote_count: i64,
}

/// Listing row for a creator's dashboard.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PollSummaryRow {
    pub id: String,
    pub question: String,
    pub description: Option<String>,
    pub status: String,
    pub is_public: bool,
    pub allow_multiple_votes: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub total_votes: i64,
}

/// Listing row for the public browse feed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PublicPollRow {
    pub id: String,
    pub question: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub allow_multiple_votes: bool,
    pub total_votes: i64,
}

/// Insert a poll and its options as one transaction. A failure inserting any
/// option rolls the poll row back with it, so a poll is never left without
/// options.
#[allow(clippy::too_many_arguments)]
pub async fn create_poll_with_options(
    pool: &DbPool,
    poll_id: &str,
    creator_id: &str,
    question: &str,
    description: Option<&str>,
    allow_multiple_votes: bool,
    is_public: bool,
    expires_at: Option<DateTime<Utc>>,
    options: &[(String, String)],
) -> Result<PollRow, DbError> {
    let mut tx = pool.begin().await?;

    let poll = sqlx::query_as::<_, PollRow>(
        "INSERT INTO polls (id, creator_id, question, description, allow_multiple_votes, is_public, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         RETURNING id, creator_id, question, description, status, is_public, allow_multiple_votes, expires_at, created_at, updated_at",
    )
    .bind(poll_id)
    .bind(creator_id)
    .bind(question)
    .bind(description)
    .bind(allow_multiple_votes)
    .bind(is_public)
    .bind(expires_at)
    .fetch_one(&mut *tx)
    .await?;

    for (index, (option_id, text)) in options.iter().enumerate() {
        sqlx::query(
            "INSERT INTO poll_options (id, poll_id, option_text, display_order)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(option_id)
        .bind(poll_id)
        .bind(text)
        .bind(index as i64 + 1)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(poll)
}

pub async fn get_poll(pool: &DbPool, id: &str) -> Result<Option<PollRow>, DbError> {
    let row = sqlx::query_as::<_, PollRow>(
        "SELECT id, creator_id, question, description, status, is_public, allow_multiple_votes, expires_at, created_at, updated_at
         FROM polls WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn get_option(pool: &DbPool, option_id: &str) -> Result<Option<PollOptionRow>, DbError> {
    let row = sqlx::query_as::<_, PollOptionRow>(
        "SELECT id, poll_id, option_text, display_order, created_at
         FROM poll_options WHERE id = ?1",
    )
    .bind(option_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn get_option_tallies(
    pool: &DbPool,
    poll_id: &str,
) -> Result<Vec<OptionTallyRow>, DbError> {
    let rows = sqlx::query_as::<_, OptionTallyRow>(
        "SELECT o.id, o.option_text, o.display_order,
                (SELECT COUNT(*) FROM votes v WHERE v.option_id = o.id) AS vote_count
         FROM poll_options o
         WHERE o.poll_id = ?1
         ORDER BY o.display_order ASC",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_polls_by_creator(
    pool: &DbPool,
    creator_id: &str,
) -> Result<Vec<PollSummaryRow>, DbError> {
    let rows = sqlx::query_as::<_, PollSummaryRow>(
        "SELECT p.id, p.question, p.description, p.status, p.is_public, p.allow_multiple_votes,
                p.expires_at, p.created_at,
                (SELECT COUNT(*) FROM votes v WHERE v.poll_id = p.id) AS total_votes
         FROM polls p
         WHERE p.creator_id = ?1
         ORDER BY p.created_at DESC",
    )
    .bind(creator_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_public_polls(
    pool: &DbPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<PublicPollRow>, DbError> {
    let rows = sqlx::query_as::<_, PublicPollRow>(
        "SELECT p.id, p.question, p.description, p.created_at, p.expires_at, p.allow_multiple_votes,
                (SELECT COUNT(*) FROM votes v WHERE v.poll_id = p.id) AS total_votes
         FROM polls p
         WHERE p.is_public = 1 AND p.status = 'active'
         ORDER BY p.created_at DESC
         LIMIT ?1 OFFSET ?2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Partial field update. `None` leaves a column untouched. The nullable
/// columns take a set flag plus a value so an explicit null can clear them.
#[allow(clippy::too_many_arguments)]
pub async fn update_poll_fields(
    pool: &DbPool,
    id: &str,
    question: Option<&str>,
    description: Option<Option<&str>>,
    status: Option<PollStatus>,
    allow_multiple_votes: Option<bool>,
    expires_at: Option<Option<DateTime<Utc>>>,
    is_public: Option<bool>,
) -> Result<Option<PollRow>, DbError> {
    let row = sqlx::query_as::<_, PollRow>(
        "UPDATE polls SET
             question = COALESCE(?2, question),
             description = CASE WHEN ?3 THEN ?4 ELSE description END,
             status = COALESCE(?5, status),
             allow_multiple_votes = COALESCE(?6, allow_multiple_votes),
             expires_at = CASE WHEN ?7 THEN ?8 ELSE expires_at END,
             is_public = COALESCE(?9, is_public),
             updated_at = datetime('now')
         WHERE id = ?1
         RETURNING id, creator_id, question, description, status, is_public, allow_multiple_votes, expires_at, created_at, updated_at",
    )
    .bind(id)
    .bind(question)
    .bind(description.is_some())
    .bind(description.flatten())
    .bind(status.map(|s| s.as_str()))
    .bind(allow_multiple_votes)
    .bind(expires_at.is_some())
    .bind(expires_at.flatten())
    .bind(is_public)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Swap the full option set in one transaction. Votes referencing the old
/// options are removed by the cascade.
pub async fn replace_poll_options(
    pool: &DbPool,
    poll_id: &str,
    options: &[(String, String)],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM poll_options WHERE poll_id = ?1")
        .bind(poll_id)
        .execute(&mut *tx)
        .await?;

    for (index, (option_id, text)) in options.iter().enumerate() {
        sqlx::query(
            "INSERT INTO poll_options (id, poll_id, option_text, display_order)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(option_id)
        .bind(poll_id)
        .bind(text)
        .bind(index as i64 + 1)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_poll(pool: &DbPool, id: &str) -> Result<(), DbError> {
    sqlx::query("DELETE FROM polls WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
