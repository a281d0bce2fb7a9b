mod common;

use common::{build_app, load_test_config, mint_token};
use mockito::{Matcher, Server};
use savolalab::api::ApiError;
use savolalab::guard::GuardDecision;
use savolalab::models::Role;
use savolalab::storage::{FileSlot, TokenSlot};
use serde_json::json;
use tempfile::tempdir;

/// Test the full sign-in path: form login, persisted token, profile fetch.
#[tokio::test]
async fn test_login_then_fetch_profile() {
    let token = mint_token("QC12345", "qc_manager", 3600);
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/users/login")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("username".into(), "QC12345".into()),
            Matcher::UrlEncoded("password".into(), "secret".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"access_token": token, "token_type": "bearer"}).to_string())
        .create_async()
        .await;
    let me = server
        .mock("GET", "/users/me")
        .match_header("authorization", format!("Bearer {}", token).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "123e4567-e89b-12d3-a456-426614174000",
                "employee_id": "QC12345",
                "full_name": "Jane Doe",
                "role": "qc_manager",
                "department": "QC"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let path = dir.path().join("token");
    let (app, nav) = build_app(load_test_config(&server.url(), &path));
    assert!(!app.store.is_authenticated());

    let identity = app.api.login("QC12345", "secret").await.expect("login should succeed");
    login.assert_async().await;
    assert_eq!(identity.username, "QC12345");
    assert_eq!(identity.role, Some(Role::QcManager));
    assert_eq!(FileSlot::new(&path).read().unwrap().as_deref(), Some(token.as_str()));

    let profile = app.api.current_user().await.expect("profile should load");
    me.assert_async().await;
    assert_eq!(profile.full_name, "Jane Doe");
    assert_eq!(profile.department.as_deref(), Some("QC"));

    assert_eq!(app.guard_for("/dashboard/users").react(), GuardDecision::Authorized);
    assert_eq!(nav.count(), 0);
}

/// Test that wrong credentials leave the app signed out.
#[tokio::test]
async fn test_wrong_password() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/users/login")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Invalid username or password"}"#)
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let path = dir.path().join("token");
    let (app, _) = build_app(load_test_config(&server.url(), &path));

    let err = app.api.login("QC12345", "nope").await.unwrap_err();
    assert!(matches!(err, ApiError::Status { .. }));
    assert!(err.to_string().contains("Invalid username or password"));
    assert!(!app.store.is_authenticated());
    assert_eq!(FileSlot::new(&path).read().unwrap(), None);
}

/// Test that a backend 401 on a restored session clears it and sends the user to login.
#[tokio::test]
async fn test_revoked_session_is_logged_out() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/users/me")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Could not validate credentials"}"#)
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let path = dir.path().join("token");
    FileSlot::new(&path)
        .write(&mint_token("QC12345", "chemist", 3600))
        .unwrap();
    let (app, nav) = build_app(load_test_config(&server.url(), &path));
    assert!(app.store.is_authenticated());

    let err = app.api.current_user().await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    assert!(!app.store.is_authenticated());
    assert_eq!(nav.history(), vec!["/login"]);
    assert_eq!(FileSlot::new(&path).read().unwrap(), None);
}
