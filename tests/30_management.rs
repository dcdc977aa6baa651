mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn management_without_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;

    for path in ["/management/spots", "/management/spots/abc", "/management/location?lat=0&lon=0"] {
        let res = reqwest::get(server.url(path)).await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: Value = res.json().await?;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn management_with_garbage_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/management/spots"))
        .bearer_auth("not.a.jwt")
        .json(&json!({}))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn sign_in_rejects_malformed_json() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::Client::new()
        .post(server.url("/auth/sign-in"))
        .header("content-type", "application/json")
        .body("{\"email\": ")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "INVALID_JSON");
    Ok(())
}
