//! Post CRUD with author-only mutation.
//!
//! Existence and ownership are re-read from the store on every call.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, warn};

use flaskr_db::models::PostRow;
use flaskr_db::{Database, OwnedWrite};
use flaskr_types::PostId;
use flaskr_types::models::{Post, User};

use crate::error::AppError;

/// All posts, newest first. Public.
pub fn list_posts(db: &Database) -> Result<Vec<Post>, AppError> {
    Ok(db.list_posts()?.into_iter().map(into_post).collect())
}

pub fn get_post(db: &Database, id: PostId) -> Result<Post, AppError> {
    db.get_post(id)?.map(into_post).ok_or(AppError::NotFound(id))
}

/// A post the requester is allowed to edit.
pub fn get_owned_post(db: &Database, id: PostId, requester: &User) -> Result<Post, AppError> {
    let post = get_post(db, id)?;
    if !post.is_owned_by(requester) {
        return Err(AppError::Forbidden);
    }
    Ok(post)
}

pub fn create_post(db: &Database, author: &User, title: &str, body: &str) -> Result<PostId, AppError> {
    validate_title(title)?;
    let id = db.insert_post(author.id, title, body)?;
    info!(post_id = id, author_id = author.id, "created post");
    Ok(id)
}

pub fn update_post(
    db: &Database,
    id: PostId,
    requester: &User,
    title: &str,
    body: &str,
) -> Result<(), AppError> {
    // Missing/foreign posts are reported before a bad title
    get_owned_post(db, id, requester)?;
    validate_title(title)?;

    owned_write(db.update_owned_post(id, requester.id, title, body)?, id, requester)?;
    info!(post_id = id, author_id = requester.id, "updated post");
    Ok(())
}

pub fn delete_post(db: &Database, id: PostId, requester: &User) -> Result<(), AppError> {
    owned_write(db.delete_owned_post(id, requester.id)?, id, requester)?;
    info!(post_id = id, author_id = requester.id, "deleted post");
    Ok(())
}

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.is_empty() {
        return Err(AppError::Validation("Title is required."));
    }
    Ok(())
}

fn owned_write(outcome: OwnedWrite, id: PostId, requester: &User) -> Result<(), AppError> {
    match outcome {
        OwnedWrite::Done => Ok(()),
        OwnedWrite::Missing => Err(AppError::NotFound(id)),
        OwnedWrite::NotOwner => {
            warn!(post_id = id, user_id = requester.id, "Rejected change to another user's post");
            Err(AppError::Forbidden)
        }
    }
}

fn into_post(row: PostRow) -> Post {
    Post {
        created: parse_created(&row.created).unwrap_or_else(|| {
            warn!("Corrupt created '{}' on post {}", row.created, row.id);
            DateTime::default()
        }),
        id: row.id,
        author_id: row.author_id,
        author_username: row.author_username,
        title: row.title,
        body: row.body,
    }
}

/// SQLite's `CURRENT_TIMESTAMP` has no timezone; it is always UTC.
fn parse_created(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|ndt| ndt.and_utc())
    })
}
