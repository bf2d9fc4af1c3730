mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

#[tokio::test]
async fn test_categories_are_owner_scoped() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.user_token("alice@x.com").await?;
    let bob = server.user_token("bob@x.com").await?;

    let resp = server.post_json("/categories", &alice, json!({ "name": "Drinks" })).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let drinks: Value = resp.json().await?;
    let id = drinks["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(drinks["name"], "Drinks");
    assert!(drinks["userId"].is_string());

    let mine: Value = server.get("/categories", &alice).await?.json().await?;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    let theirs: Value = server.get("/categories", &bob).await?.json().await?;
    assert_eq!(theirs, json!([]));

    let path = format!("/categories/{}", id);
    assert_eq!(server.get(&path, &bob).await?.status(), StatusCode::NOT_FOUND);
    let resp = server.put_json(&path, &bob, json!({ "name": "Stolen" })).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(server.delete(&path, &bob).await?.status(), StatusCode::NOT_FOUND);

    let resp = server.put_json(&path, &alice, json!({ "name": "Beverages" })).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let renamed: Value = resp.json().await?;
    assert_eq!(renamed["name"], "Beverages");
    assert_eq!(renamed["id"], drinks["id"]);
    Ok(())
}

#[tokio::test]
async fn test_public_listing_shows_every_owner() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.user_token("alice@x.com").await?;
    let bob = server.user_token("bob@x.com").await?;

    server.post_json("/categories", &alice, json!({ "name": "Drinks" })).await?;
    server.post_json("/categories", &bob, json!({ "name": "Snacks" })).await?;

    let resp = server.client.get(server.url("/public/categories")).send().await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let all: Value = resp.json().await?;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_create_requires_name_and_bad_ids_are_not_found() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user_token("alice@x.com").await?;

    let resp = server.post_json("/categories", &token, json!({ "name": "  " })).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let resp = server.get("/categories/not-a-uuid", &token).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_delete_cascades_to_products() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.user_token("alice@x.com").await?;

    let drinks: Value = server
        .post_json("/categories", &token, json!({ "name": "Drinks" }))
        .await?
        .json()
        .await?;
    let category_id = drinks["id"].as_str().unwrap_or_default().to_string();

    for name in ["Tea", "Coffee"] {
        let resp = server
            .post_json(
                "/products",
                &token,
                json!({ "name": name, "description": "hot", "price": 2.5, "categoryId": category_id }),
            )
            .await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    server
        .post_json("/products", &token, json!({ "name": "Bread", "description": "fresh", "price": 1 }))
        .await?;

    let resp = server.delete(&format!("/categories/{}", category_id), &token).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert!(body["message"].is_string());

    let left: Value = server.get("/products", &token).await?.json().await?;
    let left = left.as_array().cloned().unwrap_or_default();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0]["name"], "Bread");
    assert!(left.iter().all(|p| p["categoryId"] != json!(category_id)));
    Ok(())
}
