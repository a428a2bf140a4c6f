use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::ledger;
use crate::models::CreateUser;

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub public_token: String,
    pub credits: i64,
}

/// Register a new user with an empty balance and a fresh page token.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<impl IntoResponse> {
    let conn = state.db.get()?;
    let user = queries::create_user(&conn, &input)?;

    tracing::info!("User registered: id={}, email={}", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            public_token: user.public_token,
            credits: user.credits,
        }),
    ))
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub credits: i64,
}

/// Read a user's current credit balance.
pub async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let conn = state.db.get()?;

    let credits = ledger::balance(&conn, &user_id)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(BalanceResponse { credits }))
}
