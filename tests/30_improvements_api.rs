mod common;

use anyhow::Result;
use serde_json::{json, Value};

#[tokio::test]
async fn create_trims_and_lists_improvements() -> Result<()> {
    let server = common::spawn_server(false).await?;
    let client = common::client();

    let resp = client
        .post(server.url("/api/improvements"))
        .json(&json!({
            "problem": "  Wifi drops in the lab ",
            "solution": "Add a second access point",
            "submittedBy": " Kiran "
        }))
        .send()
        .await?;
    assert_eq!(resp.status(), 201);

    let created: Value = resp.json().await?;
    assert_eq!(created["problem"], "Wifi drops in the lab");
    assert_eq!(created["submittedBy"], "Kiran");

    let listed: Vec<Value> = client
        .get(server.url("/api/improvements"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(listed, vec![created]);
    Ok(())
}

#[tokio::test]
async fn every_field_is_required() -> Result<()> {
    let server = common::spawn_server(false).await?;
    let client = common::client();

    let resp = client
        .post(server.url("/api/improvements"))
        .json(&json!({ "problem": "   ", "solution": "s" }))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await?;
    assert!(body["field_errors"]["problem"].is_string());
    assert!(body["field_errors"]["submittedBy"].is_string());
    assert!(body["field_errors"].get("solution").is_none());

    let listed: Vec<Value> = client
        .get(server.url("/api/improvements"))
        .send()
        .await?
        .json()
        .await?;
    assert!(listed.is_empty());
    Ok(())
}

#[tokio::test]
async fn collections_are_independent() -> Result<()> {
    let server = common::spawn_server(false).await?;
    let client = common::client();

    let created: Value = client
        .post(server.url("/api/improvements"))
        .json(&json!({ "problem": "p", "solution": "s", "submittedBy": "b" }))
        .send()
        .await?
        .json()
        .await?;
    let id = created["_id"].as_str().unwrap();

    // An improvement id means nothing to the feedback collection
    let resp = client
        .delete(server.url(&format!("/api/feedback/{}", id)))
        .send()
        .await?;
    assert_eq!(resp.status(), 404);

    let resp = client
        .delete(server.url(&format!("/api/improvements/{}", id)))
        .send()
        .await?;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await?;
    assert_eq!(body["message"], "Improvement deleted successfully");
    Ok(())
}

#[tokio::test]
async fn update_unknown_improvement_is_404() -> Result<()> {
    let server = common::spawn_server(false).await?;

    let resp = common::client()
        .put(server.url(&format!("/api/improvements/{}", uuid::Uuid::new_v4())))
        .json(&json!({ "problem": "p", "solution": "s", "submittedBy": "b" }))
        .send()
        .await?;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"], "Improvement not found");
    Ok(())
}

#[tokio::test]
async fn array_body_is_rejected() -> Result<()> {
    let server = common::spawn_server(false).await?;
    let client = common::client();

    let resp = client
        .post(server.url("/api/improvements"))
        .json(&json!(["p", "s", "b"]))
        .send()
        .await?;
    assert_eq!(resp.status(), 400);

    let listed: Vec<Value> = client
        .get(server.url("/api/improvements"))
        .send()
        .await?
        .json()
        .await?;
    assert!(listed.is_empty());
    Ok(())
}
