use std::env;
use std::path::PathBuf;

use anyhow::Context;
use time::Duration;

/// Secrets that only exist as development defaults.
const PLACEHOLDER_SECRETS: &[&str] = &["dev", "change-me", "dev-secret-change-me"];

const DEFAULT_SESSION_TTL_HOURS: i64 = 168;

/// Application settings. `Default` holds the development values; the server
/// binary overrides them from `FLASKR_*` environment variables and tests
/// build a `Config` directly.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key used to sign session cookies.
    pub secret_key: String,
    pub database: PathBuf,
    pub host: String,
    pub port: u16,
    /// `None` issues browser-session cookies whose token never expires.
    pub session_ttl: Option<Duration>,
    pub cookie_secure: bool,
    /// When set, unsafe requests carrying a different `Origin` are rejected.
    pub allowed_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: "dev".into(),
            database: PathBuf::from("instance").join("flaskr.sqlite"),
            host: "0.0.0.0".into(),
            port: 5000,
            session_ttl: Some(Duration::hours(DEFAULT_SESSION_TTL_HOURS)),
            cookie_secure: false,
            allowed_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = Self::default();

        if let Ok(secret) = env::var("FLASKR_SECRET_KEY") {
            cfg.secret_key = secret;
        }
        if let Ok(path) = env::var("FLASKR_DB_PATH") {
            cfg.database = path.into();
        }
        if let Ok(host) = env::var("FLASKR_HOST") {
            cfg.host = host;
        }
        if let Ok(port) = env::var("FLASKR_PORT") {
            cfg.port = port.parse().context("FLASKR_PORT must be a port number")?;
        }
        if let Ok(hours) = env::var("FLASKR_SESSION_TTL_HOURS") {
            cfg.session_ttl = parse_ttl_hours(&hours)?;
        }
        if let Ok(secure) = env::var("FLASKR_COOKIE_SECURE") {
            cfg.cookie_secure = matches!(secure.as_str(), "1" | "true" | "yes");
        }
        cfg.allowed_origin = env::var("FLASKR_ALLOWED_ORIGIN")
            .ok()
            .filter(|origin| !origin.is_empty());

        Ok(cfg)
    }

    pub fn has_placeholder_secret(&self) -> bool {
        self.secret_key.is_empty() || PLACEHOLDER_SECRETS.contains(&self.secret_key.as_str())
    }
}

/// `0` means browser-session cookies with no token expiry.
fn parse_ttl_hours(raw: &str) -> anyhow::Result<Option<Duration>> {
    let hours: i64 = raw
        .trim()
        .parse()
        .context("FLASKR_SESSION_TTL_HOURS must be an integer")?;
    if hours < 0 {
        anyhow::bail!("FLASKR_SESSION_TTL_HOURS must be >= 0, got {hours}");
    }
    Ok((hours > 0).then(|| Duration::hours(hours)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_development_values() {
        let cfg = Config::default();
        assert!(cfg.has_placeholder_secret());
        assert_eq!(cfg.database, PathBuf::from("instance/flaskr.sqlite"));
        assert_eq!(cfg.session_ttl, Some(Duration::hours(168)));
        assert!(cfg.allowed_origin.is_none());
    }

    #[test]
    fn real_secret_is_not_placeholder() {
        let cfg = Config {
            secret_key: "4f0c8e1d9a".into(),
            ..Default::default()
        };
        assert!(!cfg.has_placeholder_secret());
    }

    #[test]
    fn ttl_hours_parsing() {
        assert_eq!(parse_ttl_hours("0").unwrap(), None);
        assert_eq!(parse_ttl_hours("24").unwrap(), Some(Duration::hours(24)));
        assert!(parse_ttl_hours("-5").is_err());
        assert!(parse_ttl_hours("a week").is_err());
    }
}
