mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

async fn get_json(path: &str) -> Result<(StatusCode, Value)> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(server.url(path)).await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

#[tokio::test]
async fn unknown_country_code_is_rejected() -> Result<()> {
    let (status, body) = get_json("/spots?country_code=zz").await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields = body["field_errors"].as_array().expect("field_errors array");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0]["field"], "country_code");
    Ok(())
}

#[tokio::test]
async fn every_invalid_corner_is_reported() -> Result<()> {
    let (status, body) = get_json("/spots?ne_lat=91&ne_lon=10&sw_lat=0&sw_lon=-181").await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["field_errors"]
        .as_array()
        .expect("field_errors array")
        .iter()
        .filter_map(|f| f["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["ne_lat", "sw_lon"]);
    Ok(())
}

#[tokio::test]
async fn overlong_search_is_rejected() -> Result<()> {
    let query = "a".repeat(101);
    let (status, body) = get_json(&format!("/spots?query={}", query)).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"][0]["field"], "query");
    Ok(())
}

#[tokio::test]
async fn non_numeric_paging_is_a_bad_request() -> Result<()> {
    let (status, body) = get_json("/spots?limit=ten").await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    Ok(())
}
