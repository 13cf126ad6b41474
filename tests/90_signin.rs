mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn signin_with_correct_credentials_returns_a_token() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    app.register(&client, "first1.last1@email.com", "First1 Last1")
        .await?;
    let res = client
        .post(format!("{}/api/v1/signin", app.base_url))
        .json(&json!({ "email": "first1.last1@email.com", "password": "ABC123!@#" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["message"], "Welcome to Real Estate Manager.");
    assert!(!body["data"]["token"].as_str().unwrap_or("").is_empty());
    Ok(())
}

#[tokio::test]
async fn signin_with_wrong_password_fails_with_exact_message() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    app.register(&client, "first1.last1@email.com", "First1 Last1")
        .await?;
    let res = client
        .post(format!("{}/api/v1/signin", app.base_url))
        .json(&json!({ "email": "first1.last1@email.com", "password": "password123" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Wrong password.");
    assert_eq!(body["help"], "Recover the password if necessary.");
    Ok(())
}

#[tokio::test]
async fn signin_with_unknown_email_is_not_found() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/signin", app.base_url))
        .json(&json!({ "email": "nonexistent", "password": "nonexistent" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "The user does not exist.");
    assert!(body.get("help").is_some());
    Ok(())
}

#[tokio::test]
async fn signin_with_missing_fields_lists_them() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/signin", app.base_url))
        .json(&json!({ "password": "password123" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Not all fields were provided.");
    assert_eq!(body["missing"], "email");
    Ok(())
}

#[tokio::test]
async fn issued_token_round_trips_the_identity() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    let token = app
        .register_and_signin(&client, "first1.last1@email.com", "First1 Last1")
        .await?;
    let payload = app.state.tokens.view_token(&token)?;
    assert_eq!(payload.email, "first1.last1@email.com");
    assert_eq!(payload.name, "First1 Last1");
    assert_eq!(payload.roles, vec!["basic".to_string()]);
    assert!(payload.expires > payload.created);
    Ok(())
}
