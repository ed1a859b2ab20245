use crate::{DbError, DbPool};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VoteRow {
    pub id: String,
    pub poll_id: String,
    pub option_id: String,
    pub voter_id: String,
    pub created_at: DateTime<Utc>,
}

/// Insert a vote only when every eligibility rule holds, in one statement:
/// the poll is public, active and unexpired, the option belongs to it, the
/// voter has not used this option before, and either the poll allows
/// multiple votes or the voter has no vote on it at all. Returns `None`
/// when any rule fails; the caller decides which rule it was.
///
/// Since SQLite serializes writers, two racing votes cannot both pass the
/// NOT EXISTS checks; the loser sees `None`.
pub async fn insert_vote_if_eligible(
    pool: &DbPool,
    id: &str,
    poll_id: &str,
    option_id: &str,
    voter_id: &str,
) -> Result<Option<VoteRow>, DbError> {
    let row = sqlx::query_as::<_, VoteRow>(
        "INSERT INTO votes (id, poll_id, option_id, voter_id)
         SELECT ?1, ?2, ?3, ?4
         WHERE EXISTS (
                   SELECT 1 FROM polls p
                   WHERE p.id = ?2
                     AND p.status = 'active'
                     AND p.is_public = 1
                     AND (p.expires_at IS NULL OR datetime(p.expires_at) > datetime('now'))
               )
           AND EXISTS (
                   SELECT 1 FROM poll_options o
                   WHERE o.id = ?3 AND o.poll_id = ?2
               )
           AND NOT EXISTS (
                   SELECT 1 FROM votes v
                   WHERE v.poll_id = ?2 AND v.option_id = ?3 AND v.voter_id = ?4
               )
           AND (
                   (SELECT p.allow_multiple_votes FROM polls p WHERE p.id = ?2) = 1
                   OR NOT EXISTS (
                          SELECT 1 FROM votes v
                          WHERE v.poll_id = ?2 AND v.voter_id = ?4
                      )
               )
         RETURNING id, poll_id, option_id, voter_id, created_at",
    )
    .bind(id)
    .bind(poll_id)
    .bind(option_id)
    .bind(voter_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// The voter's earliest vote on the poll, if any.
pub async fn get_vote_for_voter(
    pool: &DbPool,
    poll_id: &str,
    voter_id: &str,
) -> Result<Option<VoteRow>, DbError> {
    let row = sqlx::query_as::<_, VoteRow>(
        "SELECT id, poll_id, option_id, voter_id, created_at
         FROM votes
         WHERE poll_id = ?1 AND voter_id = ?2
         ORDER BY created_at ASC, id ASC
         LIMIT 1",
    )
    .bind(poll_id)
    .bind(voter_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
