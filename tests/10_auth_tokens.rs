mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn protected_route_without_header_is_rejected() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/v1/roles", app.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "fail");
    assert_eq!(
        body["message"],
        "Header does not contain authorization token."
    );
    Ok(())
}

#[tokio::test]
async fn malformed_token_is_rejected_with_token_message() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/v1/roles", app.base_url))
        .header("Authorization", "definitely-not-a-token")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "There's a problem with the token.");
    assert!(body.get("exception").is_some(), "body: {body}");
    Ok(())
}

#[tokio::test]
async fn expired_token_fails_distinctly_from_malformed() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    let token = app.expired_token_for("old@user.com")?;
    let res = client
        .get(format!("{}/api/v1/roles", app.base_url))
        .header("Authorization", token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Expired token.");
    Ok(())
}

#[tokio::test]
async fn valid_token_opens_protected_routes() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    let token = app
        .register_and_signin(&client, "first1.last1@email.com", "First1 Last1")
        .await?;
    let res = client
        .get(format!("{}/api/v1/roles", app.base_url))
        .header("Authorization", token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "success");
    let titles: Vec<&str> = body["data"]["roles"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["title"].as_str())
        .collect();
    assert!(titles.contains(&"basic") && titles.contains(&"admin"));
    Ok(())
}

#[tokio::test]
async fn role_guard_rejects_non_admin_without_side_effects() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    let token = app
        .register_and_signin(&client, "plain@user.com", "Plain User")
        .await?;
    let res = client
        .post(format!("{}/api/v1/roles", app.base_url))
        .header("Authorization", &token)
        .json(&serde_json::json!({ "title": "treasurer" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Unauthorized.");

    // the wrapped operation never ran
    let roles = app.state.store.get_all("role").await?;
    assert!(roles.iter().all(|r| r.str_field("title") != "treasurer"));
    Ok(())
}

#[tokio::test]
async fn admin_passes_the_role_guard() -> Result<()> {
    let app = common::spawn_app().await?;
    let client = reqwest::Client::new();

    app.register(&client, "chair@board.com", "Board Chair").await?;
    let token = app.promote_to_admin(&client, "chair@board.com").await?;

    let res = client
        .post(format!("{}/api/v1/roles", app.base_url))
        .header("Authorization", &token)
        .json(&serde_json::json!({ "title": "treasurer" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED);
    let roles = app.state.store.get_all("role").await?;
    assert!(roles.iter().any(|r| r.str_field("title") == "treasurer"));
    Ok(())
}
