mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_vec, TestApp};
use serde::Deserialize;

#[derive(Deserialize)]
struct AuthenticatedAdmin {
    username: String,
    role: String,
}

#[tokio::test]
async fn login_and_me_roundtrip() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let password = "s3cret";
    app.insert_user("alice", password, "admin").await?;

    let token = app.login_token("alice", password).await?;

    let response = app.get("/api/auth/me", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_vec(response.into_body()).await?;
    let admin: AuthenticatedAdmin = serde_json::from_slice(&body)?;

    assert_eq!(admin.username, "alice");
    assert_eq!(admin.role, "admin");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn non_staff_role_cannot_reach_admin_routes() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let password = "driverpass";
    app.insert_user("dave", password, "driver").await?;
    let token = app.login_token("dave", password).await?;

    let response = app.get("/api/admin/applications", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let unauthenticated = app.get("/api/admin/applications", None).await?;
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn staff_role_passes_the_admin_gate() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let password = "staffpass";
    app.insert_user("sam", password, "staff").await?;
    let token = app.login_token("sam", password).await?;

    let response = app.get("/api/admin/applications", Some(&token)).await?;
    assert_eq!(response.status(), StatusCode::OK);

    app.cleanup().await?;
    Ok(())
}
