use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PostId, UserId};

/// An authenticated identity. The password hash never leaves the store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// A blog post together with its author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub author_username: String,
    pub title: String,
    pub body: String,
    pub created: DateTime<Utc>,
}

impl Post {
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.author_id == user.id
    }
}
