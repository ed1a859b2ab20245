use ballot_db::{polls, votes, DbPool};
use ballot_models::{PollStatus, PollWithOptions, UserVote};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::CoreError;

/// Record a vote and return the refreshed poll view. Eligibility (poll
/// active, not expired, public, option belongs, no prior vote unless the
/// poll allows several) is enforced by the guarded insert itself, so two
/// racing votes from one voter can never both land.
pub async fn cast_vote(
    pool: &DbPool,
    identity: &Identity,
    poll_id: &str,
    option_id: &str,
) -> Result<PollWithOptions, CoreError> {
    crate::profile::ensure_profile(pool, identity).await?;

    let vote_id = Uuid::new_v4().to_string();
    let inserted =
        votes::insert_vote_if_eligible(pool, &vote_id, poll_id, option_id, &identity.user_id)
            .await?;

    if inserted.is_none() {
        // The guarded insert refused. Re-read the poll to name the reason,
        // in the same order the guards apply.
        let poll = polls::get_poll(pool, poll_id)
            .await?
            .ok_or(CoreError::NotFound)?;
        if poll.status != PollStatus::Active.as_str() {
            return Err(CoreError::InactivePoll);
        }
        if poll.expires_at.is_some_and(|t| t <= Utc::now()) {
            return Err(CoreError::InactivePoll);
        }
        if !poll.is_public {
            return Err(CoreError::Forbidden);
        }
        match polls::get_option(pool, option_id).await? {
            Some(option) if option.poll_id == poll_id => {}
            _ => return Err(CoreError::InvalidOption),
        }
        return Err(CoreError::DuplicateVote);
    }

    tracing::info!(poll_id, voter = %identity.user_id, "vote recorded");
    let poll = polls::get_poll(pool, poll_id)
        .await?
        .ok_or(CoreError::NotFound)?;
    crate::poll::with_options(pool, poll).await
}

/// The caller's earliest vote on a poll, if any. "Not voted" is a `None`,
/// never an error.
pub async fn get_user_vote(
    pool: &DbPool,
    poll_id: &str,
    voter_id: &str,
) -> Result<Option<UserVote>, CoreError> {
    let vote = votes::get_vote_for_voter(pool, poll_id, voter_id).await?;
    Ok(vote.map(|v| UserVote {
        option_id: v.option_id,
        created_at: v.created_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_models::{CreatePollRequest, UpdatePollRequest};
    use chrono::Duration;

    async fn test_pool() -> DbPool {
        let pool = ballot_db::create_pool("sqlite::memory:", 1).await.unwrap();
        ballot_db::run_migrations(&pool).await.unwrap();
        pool
    }

    async fn seed_identity(pool: &DbPool, id: &str, name: &str) -> Identity {
        let email = format!("{id}@example.com");
        ballot_db::users::create_user(pool, id, &email, name, "hash")
            .await
            .unwrap();
        Identity {
            user_id: id.to_string(),
            email,
            display_name: name.to_string(),
        }
    }

    fn request(question: &str, options: &[&str]) -> CreatePollRequest {
        CreatePollRequest {
            question: question.to_string(),
            description: None,
            options: options.iter().map(|s| s.to_string()).collect(),
            allow_multiple_votes: None,
            expires_at: None,
            is_public: None,
        }
    }

    async fn make_poll(pool: &DbPool, creator: &Identity, req: CreatePollRequest) -> PollWithOptions {
        crate::poll::create_poll(pool, creator, req).await.unwrap()
    }

    #[tokio::test]
    async fn vote_then_duplicate_leaves_counts_unchanged() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;

        let poll = make_poll(&pool, &alice, request("Favorite color?", &["Red", "Blue"])).await;
        assert_eq!(poll.options.len(), 2);
        assert_eq!(poll.total_votes, 0);
        let red = poll.options[0].id.clone();
        let blue = poll.options[1].id.clone();

        let after = cast_vote(&pool, &bob, &poll.poll_id, &red).await.unwrap();
        assert_eq!(after.total_votes, 1);
        assert_eq!(after.options[0].vote_count, 1);
        assert_eq!(after.options[1].vote_count, 0);

        let second = cast_vote(&pool, &bob, &poll.poll_id, &blue).await;
        assert!(matches!(second, Err(CoreError::DuplicateVote)));

        let unchanged = crate::poll::get_poll(&pool, &poll.poll_id, None).await.unwrap();
        assert_eq!(unchanged.total_votes, 1);
        assert_eq!(unchanged.options[0].vote_count, 1);
        assert_eq!(unchanged.options[1].vote_count, 0);
    }

    #[tokio::test]
    async fn vote_bootstraps_voter_profile() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;
        let poll = make_poll(&pool, &alice, request("Q?", &["A", "B"])).await;

        assert!(ballot_db::profiles::get_profile(&pool, "u2").await.unwrap().is_none());
        cast_vote(&pool, &bob, &poll.poll_id, &poll.options[0].id)
            .await
            .unwrap();
        assert!(ballot_db::profiles::get_profile(&pool, "u2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn vote_on_missing_poll_is_not_found() {
        let pool = test_pool().await;
        let bob = seed_identity(&pool, "u2", "Bob").await;
        let result = cast_vote(&pool, &bob, "ghost", "option").await;
        assert!(matches!(result, Err(CoreError::NotFound)));
    }

    #[tokio::test]
    async fn vote_on_closed_poll_is_inactive() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;
        let poll = make_poll(&pool, &alice, request("Q?", &["A", "B"])).await;

        crate::poll::update_poll(
            &pool,
            &poll.poll_id,
            "u1",
            UpdatePollRequest {
                status: Some(PollStatus::Closed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let result = cast_vote(&pool, &bob, &poll.poll_id, &poll.options[0].id).await;
        assert!(matches!(result, Err(CoreError::InactivePoll)));
    }

    #[tokio::test]
    async fn vote_on_expired_poll_is_inactive() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;

        let mut req = request("Q?", &["A", "B"]);
        req.expires_at = Some(Utc::now() - Duration::hours(1));
        let poll = make_poll(&pool, &alice, req).await;

        let result = cast_vote(&pool, &bob, &poll.poll_id, &poll.options[0].id).await;
        assert!(matches!(result, Err(CoreError::InactivePoll)));
    }

    #[tokio::test]
    async fn vote_before_expiry_succeeds() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;

        let mut req = request("Q?", &["A", "B"]);
        req.expires_at = Some(Utc::now() + Duration::hours(1));
        let poll = make_poll(&pool, &alice, req).await;

        let after = cast_vote(&pool, &bob, &poll.poll_id, &poll.options[0].id)
            .await
            .unwrap();
        assert_eq!(after.total_votes, 1);
    }

    #[tokio::test]
    async fn private_poll_rejects_votes_including_creator() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;

        let mut req = request("Secret?", &["A", "B"]);
        req.is_public = Some(false);
        let poll = make_poll(&pool, &alice, req).await;

        let by_creator = cast_vote(&pool, &alice, &poll.poll_id, &poll.options[0].id).await;
        assert!(matches!(by_creator, Err(CoreError::Forbidden)));

        let by_other = cast_vote(&pool, &bob, &poll.poll_id, &poll.options[0].id).await;
        assert!(matches!(by_other, Err(CoreError::Forbidden)));
    }

    #[tokio::test]
    async fn vote_with_foreign_option_is_invalid() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;

        let poll_a = make_poll(&pool, &alice, request("A?", &["A1", "A2"])).await;
        let poll_b = make_poll(&pool, &alice, request("B?", &["B1", "B2"])).await;

        let crossed = cast_vote(&pool, &bob, &poll_a.poll_id, &poll_b.options[0].id).await;
        assert!(matches!(crossed, Err(CoreError::InvalidOption)));

        let missing = cast_vote(&pool, &bob, &poll_a.poll_id, "no-such-option").await;
        assert!(matches!(missing, Err(CoreError::InvalidOption)));
    }

    #[tokio::test]
    async fn multi_vote_poll_allows_spread_but_not_repeats() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;

        let mut req = request("Toppings?", &["Olives", "Onions", "Peppers"]);
        req.allow_multiple_votes = Some(true);
        let poll = make_poll(&pool, &alice, req).await;

        cast_vote(&pool, &bob, &poll.poll_id, &poll.options[0].id)
            .await
            .unwrap();
        let after = cast_vote(&pool, &bob, &poll.poll_id, &poll.options[1].id)
            .await
            .unwrap();
        assert_eq!(after.total_votes, 2);

        let repeat = cast_vote(&pool, &bob, &poll.poll_id, &poll.options[0].id).await;
        assert!(matches!(repeat, Err(CoreError::DuplicateVote)));
    }

    #[tokio::test]
    async fn concurrent_votes_land_exactly_once() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;
        let poll = make_poll(&pool, &alice, request("Race?", &["A", "B"])).await;

        let first = cast_vote(&pool, &bob, &poll.poll_id, &poll.options[0].id);
        let second = cast_vote(&pool, &bob, &poll.poll_id, &poll.options[1].id);
        let (a, b) = tokio::join!(first, second);

        let wins = a.is_ok() as u8 + b.is_ok() as u8;
        assert_eq!(wins, 1);
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser, Err(CoreError::DuplicateVote)));

        let after = crate::poll::get_poll(&pool, &poll.poll_id, None).await.unwrap();
        assert_eq!(after.total_votes, 1);
    }

    #[tokio::test]
    async fn get_user_vote_reports_earliest_or_none() {
        let pool = test_pool().await;
        let alice = seed_identity(&pool, "u1", "Alice").await;
        let bob = seed_identity(&pool, "u2", "Bob").await;

        let mut req = request("Toppings?", &["Olives", "Onions"]);
        req.allow_multiple_votes = Some(true);
        let poll = make_poll(&pool, &alice, req).await;

        assert!(get_user_vote(&pool, &poll.poll_id, "u2").await.unwrap().is_none());

        cast_vote(&pool, &bob, &poll.poll_id, &poll.options[0].id)
            .await
            .unwrap();
        // Backdate the first vote so the ordering is deterministic.
        sqlx::query("UPDATE votes SET created_at = datetime('now', '-60 seconds') WHERE option_id = ?1")
            .bind(&poll.options[0].id)
            .execute(&pool)
            .await
            .unwrap();
        cast_vote(&pool, &bob, &poll.poll_id, &poll.options[1].id)
            .await
            .unwrap();

        let vote = get_user_vote(&pool, &poll.poll_id, "u2").await.unwrap().unwrap();
        assert_eq!(vote.option_id, poll.options[0].id);
    }
}
