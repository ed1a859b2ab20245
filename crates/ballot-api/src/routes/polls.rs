use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ballot_core::AppState;
use ballot_models::{CreatePollRequest, UpdatePollRequest};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiQuery, AuthUser, OptionalAuthUser};

#[derive(Deserialize)]
pub struct PageParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_my_polls(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let polls = ballot_core::poll::list_user_polls(&state.db, &auth.user_id).await?;
    Ok(Json(json!({ "polls": polls })))
}

pub async fn create_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreatePollRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let poll = ballot_core::poll::create_poll(&state.db, &auth.identity(), body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "poll": poll }))))
}

pub async fn list_public_polls(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<Value>, ApiError> {
    let (polls, pagination) = ballot_core::poll::list_public_polls(
        &state.db,
        params.limit.unwrap_or(ballot_core::poll::DEFAULT_PAGE_LIMIT),
        params.offset.unwrap_or(0),
    )
    .await?;

    Ok(Json(json!({ "polls": polls, "pagination": pagination })))
}

pub async fn get_poll(
    State(state): State<AppState>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let caller = auth.as_ref().map(|a| a.user_id.as_str());
    let poll = ballot_core::poll::get_poll(&state.db, &id, caller).await?;
    Ok(Json(json!({ "poll": poll })))
}

pub async fn update_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdatePollRequest>,
) -> Result<Json<Value>, ApiError> {
    let poll = ballot_core::poll::update_poll(&state.db, &id, &auth.user_id, body).await?;
    Ok(Json(json!({ "poll": poll })))
}

pub async fn delete_poll(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    ballot_core::poll::delete_poll(&state.db, &id, &auth.user_id).await?;
    Ok(Json(json!({ "message": "Poll deleted successfully" })))
}
