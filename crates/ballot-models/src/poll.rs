use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::serde_util::double_option;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Active,
    Closed,
    Draft,
}

impl PollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollStatus::Active => "active",
            PollStatus::Closed => "closed",
            PollStatus::Draft => "draft",
        }
    }
}

impl std::str::FromStr for PollStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PollStatus::Active),
            "closed" => Ok(PollStatus::Closed),
            "draft" => Ok(PollStatus::Draft),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full poll view returned by the single-poll endpoints, with per-option
/// tallies folded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollWithOptions {
    pub poll_id: String,
    pub question: String,
    pub description: Option<String>,
    pub status: PollStatus,
    pub is_public: bool,
    pub allow_multiple_votes: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub creator_id: String,
    pub options: Vec<PollOptionWithVotes>,
    pub total_votes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOptionWithVotes {
    pub id: String,
    pub option_text: String,
    pub display_order: i64,
    pub vote_count: i64,
}

/// Dashboard listing entry. Trimmed relative to [`PollWithOptions`]: the
/// owner list view carries totals but not the options themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPoll {
    pub poll_id: String,
    pub question: String,
    pub description: Option<String>,
    pub status: PollStatus,
    pub is_public: bool,
    pub allow_multiple_votes: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub total_votes: i64,
}

/// Browse listing entry. Public polls hide the creator and status since the
/// listing only ever contains active public polls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPoll {
    pub id: String,
    pub question: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub allow_multiple_votes: bool,
    pub total_votes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    pub description: Option<String>,
    pub options: Vec<String>,
    #[serde(rename = "allowMultipleVotes")]
    pub allow_multiple_votes: Option<bool>,
    #[serde(rename = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "isPublic")]
    pub is_public: Option<bool>,
}

/// Partial update. `description` and `expiresAt` are nullable columns, so
/// they use the double-option trick to tell "leave alone" apart from "clear".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePollRequest {
    pub question: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<PollStatus>,
    #[serde(default, rename = "allowMultipleVotes")]
    pub allow_multiple_votes: Option<bool>,
    #[serde(default, rename = "expiresAt", deserialize_with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, rename = "isPublic")]
    pub is_public: Option<bool>,
    pub options: Option<Vec<String>>,
}

impl UpdatePollRequest {
    /// True when no recognized field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.question.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.allow_multiple_votes.is_none()
            && self.expires_at.is_none()
            && self.is_public.is_none()
            && self.options.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}
