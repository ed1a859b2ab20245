pub mod auth;
pub mod polls;
pub mod votes;
