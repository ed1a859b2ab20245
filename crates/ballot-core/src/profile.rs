use ballot_db::profiles::ProfileRow;
use ballot_db::DbPool;

use crate::auth::Identity;
use crate::error::CoreError;

/// Guarantees a profile row for the caller. Polls and votes reference
/// profiles, so every write on behalf of a user runs through this first.
/// The underlying upsert keeps it idempotent under concurrent requests.
pub async fn ensure_profile(pool: &DbPool, identity: &Identity) -> Result<ProfileRow, CoreError> {
    let full_name = preferred_name(identity);
    let profile = ballot_db::profiles::ensure_profile(
        pool,
        &identity.user_id,
        &identity.email,
        Some(&full_name),
    )
    .await?;
    Ok(profile)
}

/// Display name when present, otherwise the local part of the email.
fn preferred_name(identity: &Identity) -> String {
    let name = identity.display_name.trim();
    if !name.is_empty() {
        return name.to_string();
    }
    identity
        .email
        .split('@')
        .next()
        .unwrap_or(identity.email.as_str())
        .to_string()
}
