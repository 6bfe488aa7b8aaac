use super::extract::{ApiForm, ApiJson, ApiPath, ApiQuery, Caller};
use super::AppState;
use crate::auth::AccessToken;
use crate::calculations::{
    Calculation, CalculationRepository, CalculationUpdate, NewCalculation, DEFAULT_LIMIT,
};
use crate::error::{AppError, AppResult};
use crate::users::{find_user_by_username, register_user, NewUser, User};
use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// `/token` takes an OAuth2-style password form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

// ============================================================================
// Service & identity
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(new_user): ApiJson<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    new_user.validate()?;

    // Hashing runs on the blocking pool, outside the db lock
    let hasher = state.hasher;
    let password = new_user.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .context("password hashing task failed")??;

    let user = state
        .db
        .transaction(|tx| register_user(tx, &new_user, &password_hash))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /token
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> AppResult<Json<AccessToken>> {
    let user = state
        .db
        .transaction(|tx| find_user_by_username(tx, &form.username))?;

    // Unknown users pay for a bcrypt round too
    let hasher = state.hasher;
    let password = form.password;
    let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => hasher.verify(&password, &hash),
        None => hasher.verify_missing(&password),
    })
    .await
    .context("password verification task failed")?;

    let user = match user {
        Some(user) if verified => user,
        Some(user) => {
            warn!(user_id = user.id, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            warn!(username = %form.username, "login for unknown user");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = state.tokens.issue(&user.username)?;
    info!(user_id = user.id, "access token issued");

    Ok(Json(token))
}

/// GET /users/me
pub async fn read_current_user(State(state): State<AppState>, caller: Caller) -> AppResult<Json<User>> {
    let user = state.db.transaction(|tx| caller.resolve(tx))?;
    Ok(Json(user))
}

// ============================================================================
// BREAD over calculations
// ============================================================================

/// GET /calculations?skip&limit
pub async fn browse_calculations(
    State(state): State<AppState>,
    caller: Caller,
    ApiQuery(page): ApiQuery<Pagination>,
) -> AppResult<Json<Vec<Calculation>>> {
    let calculations = state.db.transaction(|tx| {
        let user = caller.resolve(tx)?;
        CalculationRepository::for_owner(tx, user.id).list(page.skip, page.limit)
    })?;

    Ok(Json(calculations))
}

/// GET /calculations/:calculation_id
pub async fn read_calculation(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(calculation_id): ApiPath<i64>,
) -> AppResult<Json<Calculation>> {
    let calculation = state.db.transaction(|tx| {
        let user = caller.resolve(tx)?;
        CalculationRepository::for_owner(tx, user.id).get(calculation_id)
    })?;

    Ok(Json(calculation))
}

/// POST /calculations
pub async fn add_calculation(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(input): ApiJson<NewCalculation>,
) -> AppResult<(StatusCode, Json<Calculation>)> {
    let calculation = state.db.transaction(|tx| {
        let user = caller.resolve(tx)?;
        CalculationRepository::for_owner(tx, user.id).create(&input)
    })?;

    Ok((StatusCode::CREATED, Json(calculation)))
}

/// PUT|PATCH /calculations/:calculation_id
pub async fn edit_calculation(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(calculation_id): ApiPath<i64>,
    ApiJson(changes): ApiJson<CalculationUpdate>,
) -> AppResult<Json<Calculation>> {
    let calculation = state.db.transaction(|tx| {
        let user = caller.resolve(tx)?;
        CalculationRepository::for_owner(tx, user.id).update(calculation_id, &changes)
    })?;

    Ok(Json(calculation))
}

/// DELETE /calculations/:calculation_id
pub async fn delete_calculation(
    State(state): State<AppState>,
    caller: Caller,
    ApiPath(calculation_id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    state.db.transaction(|tx| {
        let user = caller.resolve(tx)?;
        CalculationRepository::for_owner(tx, user.id).delete(calculation_id)
    })?;

    Ok(StatusCode::NO_CONTENT)
}
