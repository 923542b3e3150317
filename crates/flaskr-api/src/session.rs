//! Signed client-side sessions.
//!
//! The session is an HS256 JWT stored in the `session` cookie. It carries the
//! user id plus issue and (optional) expiry timestamps; nothing is kept on
//! the server.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use time::Duration;
use tracing::debug;

use flaskr_types::UserId;
use flaskr_types::api::SessionClaims;

use crate::config::Config;

pub const SESSION_COOKIE: &str = "session";

/// Signing material derived from the configured secret key.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// A signed session value as it travels in and out of the request boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Sign a session for `user_id`. `ttl` of `None` issues a token without `exp`.
    pub fn issue(user_id: UserId, keys: &SessionKeys, ttl: Option<Duration>) -> anyhow::Result<Self> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            user_id,
            iat: now,
            exp: ttl.map(|ttl| now + ttl.whole_seconds()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)?;
        Ok(Self(token))
    }

    /// The user id if the signature is valid and the token has not expired.
    pub fn verify(&self, keys: &SessionKeys) -> Option<UserId> {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is optional; when present it is still enforced
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        match decode::<SessionClaims>(&self.0, &keys.decoding, &validation) {
            Ok(data) => Some(data.claims.user_id),
            Err(e) => {
                debug!("Rejected session token: {}", e);
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Issues and clears the session cookie.
///
/// Sessions are stateless: logout only removes the client's cookie, so a
/// copy of the token taken earlier stays valid until its `exp`. The TTL is
/// the bound on that window.
#[derive(Clone)]
pub struct SessionManager {
    keys: SessionKeys,
    ttl: Option<Duration>,
    secure: bool,
}

impl SessionManager {
    pub fn new(keys: SessionKeys, ttl: Option<Duration>, secure: bool) -> Self {
        Self { keys, ttl, secure }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SessionKeys::from_secret(config.secret_key.as_bytes()),
            config.session_ttl,
            config.cookie_secure,
        )
    }

    /// Start a fresh session for `user_id`, replacing whatever session cookie
    /// the client held before.
    pub fn login(&self, jar: CookieJar, user_id: UserId) -> anyhow::Result<CookieJar> {
        let token = SessionToken::issue(user_id, &self.keys, self.ttl)?;

        let mut cookie = Cookie::build((SESSION_COOKIE, token.0))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure);
        if let Some(ttl) = self.ttl {
            cookie = cookie.max_age(ttl);
        }

        Ok(jar.add(cookie))
    }

    pub fn logout(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }

    /// The user id carried by the request's session cookie, if any and valid.
    pub fn user_id(&self, jar: &CookieJar) -> Option<UserId> {
        let raw = jar.get(SESSION_COOKIE)?.value().to_owned();
        if raw.is_empty() {
            return None;
        }
        SessionToken::from(raw).verify(&self.keys)
    }
}
