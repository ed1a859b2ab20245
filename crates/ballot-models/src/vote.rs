use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "optionId")]
    pub option_id: String,
}

/// What the vote-status endpoint reveals about an existing vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserVote {
    pub option_id: String,
    pub created_at: DateTime<Utc>,
}
