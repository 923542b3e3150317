use serde::{Deserialize, Serialize};

use crate::UserId;

// -- Session --

/// Payload of the signed session cookie. The user id is the only field the
/// application acts on; `iat`/`exp` exist for signature-level expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: UserId,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

// -- Auth --

/// Body of `POST /auth/register` and `POST /auth/login`.
/// Missing fields deserialize as empty so validation can report them.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// -- Posts --

#[derive(Debug, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}
