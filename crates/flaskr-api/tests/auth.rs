mod common;

use axum::http::StatusCode;

use common::{TestApp, assert_redirect, body_string};
use flaskr_api::credentials;

#[tokio::test]
async fn hello_route() {
    let app = TestApp::new();
    let resp = app.get("/hello").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_string(resp).await, "Hello, World!");
}

#[tokio::test]
async fn register_page_renders() {
    let app = TestApp::new();
    let resp = app.get("/auth/register").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_string(resp).await;
    assert!(body.contains("Register"));
    assert!(body.contains("name=\"username\""));
}

#[tokio::test]
async fn register_creates_user_and_redirects_to_login() {
    let app = TestApp::new();
    let resp = app
        .post("/auth/register", &[("username", "a"), ("password", "a")])
        .await;
    assert_redirect(&resp, "/auth/login");

    let row = app.state.db.get_user_by_username("a").unwrap().unwrap();
    assert_ne!(row.password, "a");
    assert!(credentials::verify(&app.state.db, "a", "a").is_ok());
}

#[tokio::test]
async fn register_validation_messages() {
    let app = TestApp::new();
    let cases = [
        ("", "", StatusCode::BAD_REQUEST, "Username is required."),
        ("a", "", StatusCode::BAD_REQUEST, "Password is required."),
        ("test", "test", StatusCode::CONFLICT, "User test is already registered."),
    ];

    for (username, password, status, message) in cases {
        let resp = app
            .post("/auth/register", &[("username", username), ("password", password)])
            .await;
        assert_eq!(resp.status(), status, "{message}");
        assert!(body_string(resp).await.contains(message), "{message}");
    }
}

#[tokio::test]
async fn register_with_missing_fields_reports_username() {
    let app = TestApp::new();
    let resp = app.post("/auth/register", &[]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(resp).await.contains("Username is required."));
}

#[tokio::test]
async fn login_sets_session_and_loads_user() {
    let app = TestApp::new();
    assert_eq!(app.get("/auth/login").await.status(), StatusCode::OK);

    let resp = app.login("test", "test").await;
    assert_redirect(&resp, "/");
    assert!(app.session_cookie().is_some());

    let body = body_string(app.get("/").await).await;
    assert!(body.contains("<span>test</span>"));
    assert!(body.contains("Log Out"));
}

#[tokio::test]
async fn login_validation_messages() {
    let app = TestApp::new();
    let cases = [
        ("a", "test", "Incorrect username."),
        ("test", "a", "Incorrect password."),
    ];

    for (username, password, message) in cases {
        let resp = app.login(username, password).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(resp).await.contains(message), "{message}");
        assert!(app.session_cookie().is_none());
    }
}

#[tokio::test]
async fn logout_clears_session() {
    let app = TestApp::new();
    app.login("test", "test").await;

    let resp = app.logout().await;
    assert_redirect(&resp, "/");
    assert!(app.session_cookie().is_none());

    let body = body_string(app.get("/").await).await;
    assert!(body.contains("Log In"));
    assert!(!body.contains("Log Out"));
}

#[tokio::test]
async fn logout_without_session_is_harmless() {
    let app = TestApp::new();
    assert_redirect(&app.logout().await, "/");
}

#[tokio::test]
async fn second_login_replaces_session() {
    let app = TestApp::new();
    app.login("test", "test").await;
    app.login("other", "other").await;

    let body = body_string(app.get("/").await).await;
    assert!(body.contains("<span>other</span>"));
}

#[tokio::test]
async fn tampered_session_is_anonymous() {
    let app = TestApp::new();
    app.login("test", "test").await;

    let cookie = app.session_cookie().unwrap();
    app.set_session_cookie(Some(format!("{cookie}x")));
    assert_redirect(&app.get("/create").await, "/auth/login");

    app.set_session_cookie(Some("session=not-a-token".into()));
    let body = body_string(app.get("/").await).await;
    assert!(body.contains("Log In"));
}

#[tokio::test]
async fn session_for_deleted_user_is_anonymous() {
    let app = TestApp::new();
    app.login("other", "other").await;
    app.state
        .db
        .with_conn_mut(|conn| {
            conn.execute("DELETE FROM user WHERE username = 'other'", [])?;
            Ok(())
        })
        .unwrap();

    assert_redirect(&app.get("/create").await, "/auth/login");
}
