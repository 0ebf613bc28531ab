mod common;

use anyhow::Result;
use common::{expect_status, TestServer, PASSWORD};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn root_and_health_are_public() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/")).send().await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Supply Chain API");

    let res = server.client.get(server.url("/health")).send().await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["nodes"], 0);
    Ok(())
}

#[tokio::test]
async fn register_login_and_read_profile() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/user/register/"))
        .json(&json!({
            "email": "ivanov@example.com",
            "password": PASSWORD,
            "password_confirmation": PASSWORD,
            "first_name": "Ivan",
            "last_name": "Ivanov"
        }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::CREATED).await?;
    assert_eq!(body["data"]["message"], "User ivanov@example.com registered successfully.");

    let token = server.login("ivanov@example.com", PASSWORD).await?;
    let res = server.get("/user/me/", &token).send().await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["email"], "ivanov@example.com");
    assert_eq!(body["data"]["first_name"], "Ivan");
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"]["last_login"].is_string());
    Ok(())
}

#[tokio::test]
async fn registration_errors_are_field_errors() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/user/register/"))
        .json(&json!({
            "email": "a@example.com",
            "password": PASSWORD,
            "password_confirmation": "different-password"
        }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["non_field_errors"], "Passwords do not match!");

    server.register_and_login("taken@example.com").await?;
    let res = server
        .client
        .post(server.url("/user/register/"))
        .json(&json!({
            "email": "taken@example.com",
            "password": PASSWORD,
            "password_confirmation": PASSWORD
        }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["field_errors"]["email"], "user with this email already exists.");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> Result<()> {
    let server = TestServer::start().await?;
    server.register_and_login("ivanov@example.com").await?;

    let res = server
        .client
        .post(server.url("/user/login/"))
        .json(&json!({ "email": "ivanov@example.com", "password": "wrong-password" }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::UNAUTHORIZED).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn supply_routes_require_a_token() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server.client.get(server.url("/supply/nodes/")).send().await?;
    let body = expect_status(res, StatusCode::UNAUTHORIZED).await?;
    assert_eq!(body["code"], "UNAUTHORIZED");

    let res = server.get("/supply/products/", "not-a-jwt").send().await?;
    expect_status(res, StatusCode::UNAUTHORIZED).await?;

    let res = server
        .client
        .get(server.url("/user/me/"))
        .header("Authorization", "Token abc")
        .send()
        .await?;
    expect_status(res, StatusCode::UNAUTHORIZED).await?;
    Ok(())
}

#[tokio::test]
async fn refresh_issues_a_new_access_token() -> Result<()> {
    let server = TestServer::start().await?;
    server.register_and_login("ivanov@example.com").await?;

    let res = server
        .client
        .post(server.url("/user/login/"))
        .json(&json!({ "email": "ivanov@example.com", "password": PASSWORD }))
        .send()
        .await?;
    let tokens = expect_status(res, StatusCode::OK).await?;
    let access = tokens["data"]["access"].as_str().unwrap_or_default().to_string();
    let refresh = tokens["data"]["refresh"].as_str().unwrap_or_default().to_string();

    let res = server
        .client
        .post(server.url("/user/token/refresh/"))
        .json(&json!({ "refresh": refresh }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::OK).await?;
    let renewed = body["data"]["access"].as_str().unwrap_or_default().to_string();
    let res = server.get("/user/me/", &renewed).send().await?;
    expect_status(res, StatusCode::OK).await?;

    // the two token kinds are not interchangeable
    let res = server
        .client
        .post(server.url("/user/token/refresh/"))
        .json(&json!({ "refresh": access }))
        .send()
        .await?;
    expect_status(res, StatusCode::UNAUTHORIZED).await?;
    let res = server.get("/user/me/", &refresh).send().await?;
    expect_status(res, StatusCode::UNAUTHORIZED).await?;
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let res = server
        .client
        .post(server.url("/user/login/"))
        .header("Content-Type", "application/json")
        .body("{\"email\": ")
        .send()
        .await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}
