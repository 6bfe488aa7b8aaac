//! HTTP surface: routes, shared state, extractors and error responses.
//!
//! ```text
//! POST   /register                  {"username","email","password"}
//! POST   /token                     form: username, password
//! GET    /users/me
//! GET    /calculations?skip&limit
//! POST   /calculations              {"operation","operand1","operand2"}
//! GET    /calculations/:id
//! PUT    /calculations/:id          any of operation, operand1, operand2
//! PATCH  /calculations/:id
//! DELETE /calculations/:id
//! GET    /health
//! ```

pub mod error;
pub mod extract;
pub mod handlers;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::config::Config;
use crate::db::Database;
use axum::routing::{get, post};
use axum::Router;
use chrono::Duration;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenIssuer,
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Builds the signing key from `config`; warns here if it is the development key.
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            tokens: TokenIssuer::new(
                config.signing_key().as_bytes(),
                Duration::minutes(config.token_ttl_minutes),
            ),
            hasher: PasswordHasher::new(config.bcrypt_cost),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/token", post(handlers::login))
        .route("/users/me", get(handlers::read_current_user))
        .route(
            "/calculations",
            get(handlers::browse_calculations).post(handlers::add_calculation),
        )
        .route(
            "/calculations/:calculation_id",
            get(handlers::read_calculation)
                .put(handlers::edit_calculation)
                .patch(handlers::edit_calculation)
                .delete(handlers::delete_calculation),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(error::handle_panic))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[cfg(test)]
mod tests;
