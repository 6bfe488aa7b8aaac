// Error taxonomy shared by the engine, the stores and the HTTP surface

use thiserror::Error;

/// Input rejected before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid operation: {0}. Operation must be one of: add, subtract, multiply, divide")]
    InvalidOperation(String),

    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NonFiniteResult,

    #[error("No fields to update")]
    NoFieldsProvided,

    #[error("Username must be between 3 and 50 characters")]
    InvalidUsername,

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
}

impl ValidationError {
    /// Stable machine-readable tag
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidOperation(_) => "invalid_operation",
            ValidationError::DivisionByZero => "division_by_zero",
            ValidationError::NonFiniteResult => "non_finite_result",
            ValidationError::NoFieldsProvided => "no_fields_provided",
            ValidationError::InvalidUsername => "invalid_username",
            ValidationError::InvalidEmail => "invalid_email",
            ValidationError::PasswordTooShort => "password_too_short",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Username already registered")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthorized,

    /// Absent and foreign records are reported the same way
    #[error("Calculation not found")]
    NotFound,

    #[error("{0}")]
    MalformedRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(err) => err.code(),
            AppError::DuplicateUsername => "duplicate_username",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized => "unauthorized",
            AppError::NotFound => "not_found",
            AppError::MalformedRequest(_) => "malformed_request",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err).context("database operation failed"))
    }
}

pub type AppResult<T> = Result<T, AppError>;
