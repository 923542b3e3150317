pub mod api;
pub mod models;

/// Primary key of a row in the `user` table.
pub type UserId = i64;

/// Primary key of a row in the `post` table.
pub type PostId = i64;
