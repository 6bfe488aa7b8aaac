// 👤 Credential Store
// Users own calculations; username and email are both unique.

use crate::db::parse_timestamp;
use crate::error::{AppError, AppResult, ValidationError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;

/// Stored user. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let username_len = self.username.chars().count();
        if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
            return Err(ValidationError::InvalidUsername);
        }

        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }

        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(ValidationError::PasswordTooShort);
        }

        Ok(())
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty() && !name.starts_with('.'),
        None => false,
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let created_at: String = row.get(4)?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
    })
}

const USER_COLUMNS: &str = "id, username, email, hashed_password, created_at";

pub fn find_user_by_username(conn: &Connection, username: &str) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            [username],
            user_from_row,
        )
        .optional()?;

    Ok(user)
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            [email],
            user_from_row,
        )
        .optional()?;

    Ok(user)
}

pub fn get_user(conn: &Connection, user_id: i64) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [user_id],
            user_from_row,
        )
        .optional()?;

    Ok(user)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;

    let users = stmt
        .query_map([], user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(users)
}

/// Insert a user whose password has already been hashed.
///
/// Username is checked before email, so a request colliding on both reports
/// `DuplicateUsername`. The unique constraints catch anything that slips
/// past the lookups.
pub fn register_user(conn: &Connection, new_user: &NewUser, password_hash: &str) -> AppResult<User> {
    new_user.validate()?;

    if find_user_by_username(conn, &new_user.username)?.is_some() {
        return Err(AppError::DuplicateUsername);
    }
    if find_user_by_email(conn, &new_user.email)?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let created_at = Utc::now();
    insert_user(conn, new_user, password_hash, created_at)?;

    let user = User {
        id: conn.last_insert_rowid(),
        username: new_user.username.clone(),
        email: new_user.email.clone(),
        password_hash: password_hash.to_string(),
        created_at,
    };
    info!(user_id = user.id, username = %user.username, "user registered");

    Ok(user)
}

fn insert_user(
    conn: &Connection,
    new_user: &NewUser,
    password_hash: &str,
    created_at: DateTime<Utc>,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO users (username, email, hashed_password, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![new_user.username, new_user.email, password_hash, created_at.to_rfc3339()],
    )
    .map_err(duplicate_from_constraint)?;

    Ok(())
}

/// Unique violations on `users` become the matching duplicate error;
/// every other failure stays internal.
fn duplicate_from_constraint(err: rusqlite::Error) -> AppError {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            if message.contains("users.username") {
                return AppError::DuplicateUsername;
            }
            if message.contains("users.email") {
                return AppError::DuplicateEmail;
            }
        }
    }
    err.into()
}

/// Delete a user together with every calculation they own.
///
/// Children go first so the delete holds even on a connection without
/// foreign key enforcement. Returns the number of calculations removed.
pub fn delete_user(conn: &Connection, user_id: i64) -> AppResult<usize> {
    let removed = conn.execute("DELETE FROM calculations WHERE user_id = ?1", [user_id])?;
    let deleted = conn.execute("DELETE FROM users WHERE id = ?1", [user_id])?;

    if deleted == 0 {
        return Err(AppError::NotFound);
    }

    info!(user_id, calculations_removed = removed, "user deleted");
    Ok(removed)
}
