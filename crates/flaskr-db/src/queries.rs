use crate::Database;
use crate::models::{PostRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, params};

/// Result of a write that is only allowed for the row's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedWrite {
    Done,
    Missing,
    NotOwner,
}

impl Database {
    // -- Users --

    /// Insert a user and return the assigned id.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO user (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Posts --

    /// Insert a post and return the assigned id.
    pub fn insert_post(&self, author_id: i64, title: &str, body: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO post (title, body, author_id) VALUES (?1, ?2, ?3)",
                params![title, body, author_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| query_post(conn, id))
    }

    /// All posts, newest first.
    pub fn list_posts(&self) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.author_id, u.username, p.title, p.body, p.created
                 FROM post p
                 JOIN user u ON p.author_id = u.id
                 ORDER BY p.created DESC, p.id DESC",
            )?;

            let rows = stmt
                .query_map([], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Update title/body if the post exists and belongs to `author_id`.
    /// The ownership read and the write share the writer lock.
    pub fn update_owned_post(
        &self,
        id: i64,
        author_id: i64,
        title: &str,
        body: &str,
    ) -> Result<OwnedWrite> {
        self.with_conn_mut(|conn| {
            let outcome = check_owner(conn, id, author_id)?;
            if outcome == OwnedWrite::Done {
                conn.execute(
                    "UPDATE post SET title = ?1, body = ?2 WHERE id = ?3",
                    params![title, body, id],
                )?;
            }
            Ok(outcome)
        })
    }

    /// Delete the post if it exists and belongs to `author_id`.
    pub fn delete_owned_post(&self, id: i64, author_id: i64) -> Result<OwnedWrite> {
        self.with_conn_mut(|conn| {
            let outcome = check_owner(conn, id, author_id)?;
            if outcome == OwnedWrite::Done {
                conn.execute("DELETE FROM post WHERE id = ?1", [id])?;
            }
            Ok(outcome)
        })
    }
}

/// True when `err` came from a UNIQUE constraint (e.g. a duplicate username).
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<rusqlite::Error>() {
        Some(rusqlite::Error::SqliteFailure(e, _)) => {
            e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        }
        _ => false,
    }
}

fn query_user<P: rusqlite::ToSql>(
    conn: &Connection,
    column: &str,
    value: P,
) -> Result<Option<UserRow>> {
    let sql = format!("SELECT id, username, password FROM user WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_post(conn: &Connection, id: i64) -> Result<Option<PostRow>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.author_id, u.username, p.title, p.body, p.created
         FROM post p
         JOIN user u ON p.author_id = u.id
         WHERE p.id = ?1",
    )?;

    let row = stmt.query_row([id], map_post_row).optional()?;
    Ok(row)
}

fn map_post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        author_username: row.get(2)?,
        title: row.get(3)?,
        body: row.get(4)?,
        created: row.get(5)?,
    })
}

fn check_owner(conn: &Connection, id: i64, author_id: i64) -> Result<OwnedWrite> {
    let owner: Option<i64> = conn
        .query_row("SELECT author_id FROM post WHERE id = ?1", [id], |row| {
            row.get(0)
        })
        .optional()?;

    Ok(match owner {
        None => OwnedWrite::Missing,
        Some(owner) if owner != author_id => OwnedWrite::NotOwner,
        Some(_) => OwnedWrite::Done,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
