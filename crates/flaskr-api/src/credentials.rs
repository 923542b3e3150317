//! Registration and credential checks against the `user` table.

use flaskr_db::{Database, is_unique_violation};
use flaskr_types::UserId;
use flaskr_types::models::User;
use tracing::info;

use crate::error::AppError;
use crate::password;

/// Create a user. Only the salted hash of `password` is stored.
pub fn register(db: &Database, username: &str, password: &str) -> Result<UserId, AppError> {
    if username.is_empty() {
        return Err(AppError::Validation("Username is required."));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Password is required."));
    }

    if db.get_user_by_username(username)?.is_some() {
        return Err(AppError::DuplicateUsername(username.to_string()));
    }

    let hash = password::hash_password(password)?;

    // A concurrent registration can still win the race past the lookup above
    let id = db.create_user(username, &hash).map_err(|e| {
        if is_unique_violation(&e) {
            AppError::DuplicateUsername(username.to_string())
        } else {
            AppError::Internal(e)
        }
    })?;

    info!(user_id = id, username, "registered user");
    Ok(id)
}

/// Look up `username` and check `password` against its stored hash.
pub fn verify(db: &Database, username: &str, password: &str) -> Result<User, AppError> {
    let row = db
        .get_user_by_username(username)?
        .ok_or(AppError::UnknownUser)?;

    if !password::verify_password(password, &row.password)? {
        return Err(AppError::WrongPassword);
    }

    Ok(User {
        id: row.id,
        username: row.username,
    })
}
