// Calculations API - Core Library
// Exposes all modules for use in the operator CLI, the API server, and tests

pub mod auth;
pub mod calculations;
pub mod calculator;
pub mod config;
pub mod db;
pub mod error;
pub mod users;

// Only compile the HTTP surface when the server feature is enabled
#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use auth::{AccessToken, PasswordHasher, TokenIssuer};
pub use calculations::{Calculation, CalculationRepository, CalculationUpdate, NewCalculation};
pub use calculator::{compute, Operation};
pub use config::Config;
pub use db::{setup_database, Database};
pub use error::{AppError, AppResult, ValidationError};
pub use users::{
    delete_user, find_user_by_email, find_user_by_username, get_user, list_users, register_user,
    NewUser, User,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
