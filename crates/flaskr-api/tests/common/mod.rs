//! In-process client over the real router, with a throwaway database.

#![allow(dead_code)]

use std::sync::Mutex;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use tempfile::TempDir;
use tower::ServiceExt;

use flaskr_api::guard::SameOrigin;
use flaskr_api::{AppState, Config, build_state, credentials, router};

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub state: AppState,
    router: Router,
    cookie: Mutex<Option<String>>,
    _dir: TempDir,
}

impl TestApp {
    /// Users `test`/`test` and `other`/`other`, plus one post by `test`.
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_allowed_origin(origin: &str) -> Self {
        Self::build(Some(origin))
    }

    fn build(origin: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            secret_key: SECRET.into(),
            database: dir.path().join("instance").join("flaskr.sqlite"),
            ..Default::default()
        };
        let state = build_state(&config).unwrap();

        let test_id = credentials::register(&state.db, "test", "test").unwrap();
        credentials::register(&state.db, "other", "other").unwrap();
        state
            .db
            .with_conn_mut(|conn| {
                conn.execute(
                    "INSERT INTO post (title, body, author_id, created)
                     VALUES ('test title', 'test\nbody', ?1, '2018-01-01 00:00:00')",
                    [test_id],
                )?;
                Ok(())
            })
            .unwrap();

        let same_origin = origin.map(|o| SameOrigin::new(o).unwrap());
        Self {
            router: router(state.clone(), same_origin),
            state,
            cookie: Mutex::new(None),
            _dir: dir,
        }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Method::GET, uri, None, &[]).await
    }

    pub async fn post(&self, uri: &str, form: &[(&str, &str)]) -> Response<Body> {
        self.send(Method::POST, uri, None, form).await
    }

    pub async fn post_from(&self, origin: &str, uri: &str, form: &[(&str, &str)]) -> Response<Body> {
        self.send(Method::POST, uri, Some(origin), form).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        origin: Option<&str>,
        form: &[(&str, &str)],
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method.clone()).uri(uri);
        if let Some(cookie) = self.cookie.lock().unwrap().as_deref() {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(origin) = origin {
            builder = builder.header(header::ORIGIN, origin);
        }

        let body = if method == Method::POST {
            builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
            Body::from(serde_urlencoded::to_string(form).unwrap())
        } else {
            Body::empty()
        };

        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        self.store_cookie(&resp);
        resp
    }

    /// Keep the session cookie the way a browser would, honouring removals.
    fn store_cookie(&self, resp: &Response<Body>) {
        for value in resp.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap().trim();
            let Some(("session", token)) = pair.split_once('=') else {
                continue;
            };
            let removed = token.is_empty() || raw.contains("Max-Age=0");
            *self.cookie.lock().unwrap() = (!removed).then(|| pair.to_string());
        }
    }

    pub fn session_cookie(&self) -> Option<String> {
        self.cookie.lock().unwrap().clone()
    }

    pub fn set_session_cookie(&self, cookie: Option<String>) {
        *self.cookie.lock().unwrap() = cookie;
    }

    pub async fn login(&self, username: &str, password: &str) -> Response<Body> {
        self.post("/auth/login", &[("username", username), ("password", password)])
            .await
    }

    pub async fn logout(&self) -> Response<Body> {
        self.get("/auth/logout").await
    }

    pub fn post_count(&self) -> i64 {
        self.state
            .db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(id) FROM post", [], |r| r.get(0))?))
            .unwrap()
    }
}

pub async fn body_string(resp: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
}

pub fn assert_redirect(resp: &Response<Body>, to: &str) {
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(resp), to);
}
