use ballot_db::polls::{self, PollRow};
use ballot_db::DbPool;
use ballot_models::{
    CreatePollRequest, Pagination, PollOptionWithVotes, PollStatus, PollWithOptions, PublicPoll,
    UpdatePollRequest, UserPoll,
};
use uuid::Uuid;

use crate::access;
use crate::auth::Identity;
use crate::error::CoreError;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

pub async fn create_poll(
    pool: &DbPool,
    identity: &Identity,
    req: CreatePollRequest,
) -> Result<PollWithOptions, CoreError> {
    let question = req.question.trim();
    let options = clean_options(&req.options);
    if question.is_empty() || options.len() < 2 {
        return Err(CoreError::Validation(
            "Please provide a question and at least two options.".into(),
        ));
    }

    crate::profile::ensure_profile(pool, identity).await?;

    let description = req
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let poll_id = Uuid::new_v4().to_string();
    let poll = polls::create_poll_with_options(
        pool,
        &poll_id,
        &identity.user_id,
        question,
        description,
        req.allow_multiple_votes.unwrap_or(false),
        req.is_public.unwrap_or(true),
        req.expires_at,
        &options,
    )
    .await?;

    tracing::info!(poll_id = %poll.id, creator = %identity.user_id, "poll created");
    with_options(pool, poll).await
}

/// Private polls are reported as missing to everyone but their creator.
pub async fn get_poll(
    pool: &DbPool,
    poll_id: &str,
    caller: Option<&str>,
) -> Result<PollWithOptions, CoreError> {
    let poll = polls::get_poll(pool, poll_id)
        .await?
        .ok_or(CoreError::NotFound)?;
    if !access::can_view_poll(&poll, caller) {
        return Err(CoreError::NotFound);
    }
    with_options(pool, poll).await
}

pub async fn list_user_polls(pool: &DbPool, user_id: &str) -> Result<Vec<UserPoll>, CoreError> {
    let rows = polls::list_polls_by_creator(pool, user_id).await?;
    rows.into_iter()
        .map(|row| {
            let status = parse_status(&row.status)?;
            Ok(UserPoll {
                poll_id: row.id,
                question: row.question,
                description: row.description,
                status,
                is_public: row.is_public,
                allow_multiple_votes: row.allow_multiple_votes,
                expires_at: row.expires_at,
                created_at: row.created_at,
                total_votes: row.total_votes,
            })
        })
        .collect()
}

pub async fn list_public_polls(
    pool: &DbPool,
    limit: i64,
    offset: i64,
) -> Result<(Vec<PublicPoll>, Pagination), CoreError> {
    let limit = limit.clamp(1, MAX_PAGE_LIMIT);
    let offset = offset.max(0);

    // Fetch one row past the page so a final page that is exactly full
    // still reports has_more = false.
    let mut rows = polls::list_public_polls(pool, limit + 1, offset).await?;
    let has_more = rows.len() as i64 > limit;
    if has_more {
        rows.truncate(limit as usize);
    }
    let listing = rows
        .into_iter()
        .map(|row| PublicPoll {
            id: row.id,
            question: row.question,
            description: row.description,
            created_at: row.created_at,
            expires_at: row.expires_at,
            allow_multiple_votes: row.allow_multiple_votes,
            total_votes: row.total_votes,
        })
        .collect();

    Ok((
        listing,
        Pagination {
            limit,
            offset,
            has_more,
        },
    ))
}

/// Field-level partial update. Supplying `options` swaps the whole option
/// set, which also drops any votes cast for the old options.
pub async fn update_poll(
    pool: &DbPool,
    poll_id: &str,
    caller: &str,
    req: UpdatePollRequest,
) -> Result<PollWithOptions, CoreError> {
    let existing = polls::get_poll(pool, poll_id)
        .await?
        .ok_or(CoreError::NotFound)?;
    if !access::can_manage_poll(&existing, caller) {
        return Err(CoreError::Forbidden);
    }

    if req.is_empty() {
        return with_options(pool, existing).await;
    }

    let question = match req.question.as_deref().map(str::trim) {
        Some("") => return Err(CoreError::Validation("Question cannot be empty.".into())),
        other => other,
    };

    let new_options = match req.options {
        Some(ref raw) => {
            let cleaned = clean_options(raw);
            if cleaned.len() < 2 {
                return Err(CoreError::Validation(
                    "A poll needs at least two options.".into(),
                ));
            }
            Some(cleaned)
        }
        None => None,
    };

    let description = req
        .description
        .map(|d| d.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));

    let updated = polls::update_poll_fields(
        pool,
        poll_id,
        question,
        description.as_ref().map(|d| d.as_deref()),
        req.status,
        req.allow_multiple_votes,
        req.expires_at,
        req.is_public,
    )
    .await?
    .ok_or(CoreError::NotFound)?;

    if let Some(options) = new_options {
        polls::replace_poll_options(pool, poll_id, &options).await?;
    }

    with_options(pool, updated).await
}

pub async fn delete_poll(pool: &DbPool, poll_id: &str, caller: &str) -> Result<(), CoreError> {
    let existing = polls::get_poll(pool, poll_id)
        .await?
        .ok_or(CoreError::NotFound)?;
    if !access::can_manage_poll(&existing, caller) {
        return Err(CoreError::Forbidden);
    }
    polls::delete_poll(pool, poll_id).await?;
    tracing::info!(poll_id, "poll deleted");
    Ok(())
}

/// Fold per-option tallies into the full poll view.
pub(crate) async fn with_options(
    pool: &DbPool,
    poll: PollRow,
) -> Result<PollWithOptions, CoreError> {
    let tallies = polls::get_option_tallies(pool, &poll.id).await?;
    let options: Vec<PollOptionWithVotes> = tallies
        .into_iter()
        .map(|t| PollOptionWithVotes {
            id: t.id,
            option_text: t.option_text,
            display_order: t.display_order,
            vote_count: t.vote_count,
        })
        .collect();
    let total_votes = options.iter().map(|o| o.vote_count).sum();

    Ok(PollWithOptions {
        poll_id: poll.id,
        question: poll.question,
        description: poll.description,
        status: parse_status(&poll.status)?,
        is_public: poll.is_public,
        allow_multiple_votes: poll.allow_multiple_votes,
        expires_at: poll.expires_at,
        created_at: poll.created_at,
        creator_id: poll.creator_id,
        options,
        total_votes,
    })
}

fn parse_status(raw: &str) -> Result<PollStatus, CoreError> {
    raw.parse::<PollStatus>()
        .map_err(|_| CoreError::Internal(format!("unknown poll status: {raw}")))
}

fn clean_options(raw: &[String]) -> Vec<(String, String)> {
    raw.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| (Uuid::new_v4().to_string(), t.to_string()))
        .collect()
}
