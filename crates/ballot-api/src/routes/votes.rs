use axum::{
    extract::{Path, State},
    Json,
};
use ballot_core::AppState;
use ballot_models::VoteRequest;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiJson, AuthUser};

pub async fn cast_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<VoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let poll =
        ballot_core::vote::cast_vote(&state.db, &auth.identity(), &id, &body.option_id).await?;

    Ok(Json(json!({
        "message": "Vote recorded successfully",
        "poll": poll,
    })))
}

pub async fn my_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let vote = ballot_core::vote::get_user_vote(&state.db, &id, &auth.user_id).await?;

    Ok(Json(json!({
        "hasVoted": vote.is_some(),
        "vote": vote,
    })))
}
