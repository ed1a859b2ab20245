pub mod poll;
pub mod serde_util;
pub mod vote;

pub use poll::{
    CreatePollRequest, Pagination, PollOptionWithVotes, PollStatus, PollWithOptions, PublicPoll,
    UpdatePollRequest, UserPoll,
};
pub use vote::{UserVote, VoteRequest};
