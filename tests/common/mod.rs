#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use budgeting_server::{AppState, config::Config, database, router};
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_TOKEN_SECRET: &str = "test_secret_key_at_least_32_chars_long";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn setup_test_app() -> anyhow::Result<TestApp> {
    let temp_dir = tempfile::tempdir()?;
    let data_path = temp_dir.path().to_string_lossy().to_string();
    std::mem::forget(temp_dir);

    let db = database::init_db(&data_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize database: {}", e))?;

    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_path,
        token_secret: TEST_TOKEN_SECRET.to_string(),
    };

    let state = AppState {
        db,
        config,
    };
    let router = router(state.clone());

    Ok(TestApp {
        router,
        state,
    })
}

/// Send a JSON request, optionally authenticated, and parse the JSON body.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    payload: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let body = match payload {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };

    let request = builder
        .body(body)
        .map_err(|e| anyhow::anyhow!("Failed to build request: {}", e))?;

    let response = app
        .clone()
        .oneshot(request)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to execute request: {}", e))?;

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read response body: {}", e))?;

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}

/// Register a user through the API and return the issued token.
pub async fn register_user(
    app: &Router,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<String> {
    let (status, body) = send_json(
        app,
        "POST",
        "/user/register",
        None,
        Some(serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        })),
    )
    .await?;

    anyhow::ensure!(status == StatusCode::OK, "register failed: {}", body);

    body["token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No token in register response"))
}

pub async fn login_user(app: &Router, username: &str, password: &str) -> anyhow::Result<String> {
    let (status, body) = send_json(
        app,
        "POST",
        "/user/login",
        None,
        Some(serde_json::json!({
            "username": username,
            "password": password,
        })),
    )
    .await?;

    anyhow::ensure!(status == StatusCode::OK, "login failed: {}", body);

    body["token"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No token in login response"))
}

/// Insert a category row directly, bypassing the API. Returns its id.
pub async fn seed_category(
    state: &AppState,
    category_type: &str,
    name: &str,
) -> anyhow::Result<String> {
    let category_id = Uuid::new_v4().to_string();

    let conn = state.db.write().await;
    conn.execute(
        "INSERT INTO categories (id, type, name) VALUES (?, ?, ?)",
        (category_id.as_str(), category_type, name),
    )
    .await?;

    Ok(category_id)
}

/// Add a category through the API (find-or-create plus association).
pub async fn add_category(
    app: &Router,
    token: &str,
    category_type: &str,
    name: &str,
) -> anyhow::Result<()> {
    let (status, body) = send_json(
        app,
        "POST",
        "/category/",
        Some(token),
        Some(serde_json::json!({ "type": category_type, "category": name })),
    )
    .await?;

    anyhow::ensure!(status == StatusCode::OK, "add category failed: {}", body);
    Ok(())
}

/// Add a transaction through the API and return its id.
pub async fn add_transaction(
    app: &Router,
    token: &str,
    payload: Value,
) -> anyhow::Result<String> {
    let (status, body) = send_json(app, "POST", "/transaction/", Some(token), Some(payload)).await?;

    anyhow::ensure!(status == StatusCode::OK, "add transaction failed: {}", body);

    body["transactionId"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("No transactionId in response"))
}
