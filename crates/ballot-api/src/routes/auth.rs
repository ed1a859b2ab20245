use axum::{extract::State, http::StatusCode, Json};
use ballot_core::AppState;
use ballot_db::users::UserRow;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiJson, AuthUser};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn user_json(user: &UserRow) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "display_name": user.display_name,
        "created_at": user.created_at.to_rfc3339(),
    })
}

fn issue_token(state: &AppState, user: &UserRow) -> Result<String, ApiError> {
    ballot_core::auth::create_token(
        &user.id,
        &user.email,
        &user.display_name,
        &state.config.jwt_secret,
        state.config.jwt_expiry_seconds,
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !state.config.registration_enabled {
        return Err(ApiError::Forbidden);
    }

    let user = ballot_core::auth::register(
        &state.db,
        &body.email,
        &body.password,
        body.display_name.as_deref(),
    )
    .await?;
    let token = issue_token(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": user_json(&user) })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = ballot_core::auth::login(&state.db, &body.email, &body.password).await?;
    let token = issue_token(&state, &user)?;

    Ok(Json(json!({ "token": token, "user": user_json(&user) })))
}

pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Value>, ApiError> {
    let user = ballot_db::users::get_user_by_id(&state.db, &auth.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(json!({ "user": user_json(&user) })))
}
