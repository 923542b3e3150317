//! Database row types, mapped directly from SQLite rows.
//! Kept apart from flaskr-types so the store layer has no API dependencies.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string, never plaintext.
    pub password: String,
}

pub struct PostRow {
    pub id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub title: String,
    pub body: String,
    /// `CURRENT_TIMESTAMP` text, `YYYY-MM-DD HH:MM:SS` in UTC.
    pub created: String,
}
