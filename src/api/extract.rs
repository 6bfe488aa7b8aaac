//! Request extractors that reject with [`AppError`] instead of axum's
//! plain-text rejections, plus the bearer-token extractor.

use super::AppState;
use crate::auth::bearer_token;
use crate::error::{AppError, AppResult};
use crate::users::{find_user_by_username, User};
use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use rusqlite::Connection;
use tracing::warn;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct ApiForm<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Caller proven by a valid, unexpired bearer token.
///
/// Only the token is checked here; the user row is resolved inside the
/// handler's own transaction with [`Caller::resolve`].
#[derive(Debug, Clone)]
pub struct Caller {
    pub username: String,
}

impl Caller {
    /// Load the user the token was issued to. A token for a deleted user is
    /// treated like any other invalid token.
    pub fn resolve(&self, conn: &Connection) -> AppResult<User> {
        find_user_by_username(conn, &self.username)?.ok_or_else(|| {
            warn!(username = %self.username, "token subject no longer exists");
            AppError::Unauthorized
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = bearer_token(header).ok_or(AppError::Unauthorized)?;
        let username = state.tokens.verify(token)?;

        Ok(Caller { username })
    }
}
