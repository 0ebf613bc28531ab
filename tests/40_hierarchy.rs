mod common;

use anyhow::Result;
use common::{expect_status, id_of, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn node(server: &TestServer, token: &str, id: i64) -> Result<Value> {
    let res = server.get(&format!("/supply/nodes/{}/", id), token).send().await?;
    Ok(expect_status(res, StatusCode::OK).await?["data"].clone())
}

#[tokio::test]
async fn levels_follow_the_supplier_chain() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;

    let a = server.create_node(&token, "Alpha", None).await?;
    let b = server.create_node(&token, "Bravo", Some(id_of(&a))).await?;
    let c = server.create_node(&token, "Charlie", Some(id_of(&b))).await?;
    assert_eq!(a["level"], 0);
    assert_eq!(b["level"], 1);
    assert_eq!(c["level"], 2);

    let res = server.get("/supply/nodes/", &token).send().await?;
    let body = expect_status(res, StatusCode::OK).await?;
    let levels: Vec<i64> = body["data"]
        .as_array()
        .map(|nodes| nodes.iter().filter_map(|n| n["level"].as_i64()).collect())
        .unwrap_or_default();
    assert_eq!(levels, [0, 1, 2]);
    Ok(())
}

#[tokio::test]
async fn deleting_a_supplier_promotes_its_clients() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;

    let a = server.create_node(&token, "Alpha", None).await?;
    let b = server.create_node(&token, "Bravo", Some(id_of(&a))).await?;
    let c = server.create_node(&token, "Charlie", Some(id_of(&b))).await?;

    let res = server.delete(&format!("/supply/nodes/{}/delete/", id_of(&a)), &token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let b = node(&server, &token, id_of(&b)).await?;
    assert!(b["supplier"].is_null());
    assert_eq!(b["level"], 0);
    let c = node(&server, &token, id_of(&c)).await?;
    assert_eq!(c["supplier"], id_of(&b));
    assert_eq!(c["level"], 1);
    Ok(())
}

#[tokio::test]
async fn supplier_cycles_are_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;

    let a = server.create_node(&token, "Alpha", None).await?;
    let b = server.create_node(&token, "Bravo", Some(id_of(&a))).await?;
    let c = server.create_node(&token, "Charlie", Some(id_of(&b))).await?;
    let update = format!("/supply/nodes/{}/update/", id_of(&a));

    let res = server.patch(&update, &token, &json!({ "supplier": id_of(&c) })).send().await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["supplier"].is_string());

    let res = server.patch(&update, &token, &json!({ "supplier": id_of(&a) })).send().await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["field_errors"]["supplier"], "A node cannot be its own supplier.");

    // nothing changed
    assert!(node(&server, &token, id_of(&a)).await?["supplier"].is_null());
    Ok(())
}

#[tokio::test]
async fn detaching_and_reattaching_recomputes_levels() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;

    let a = server.create_node(&token, "Alpha", None).await?;
    let b = server.create_node(&token, "Bravo", Some(id_of(&a))).await?;
    let c = server.create_node(&token, "Charlie", Some(id_of(&b))).await?;
    let d = server.create_node(&token, "Delta", None).await?;

    let res = server
        .patch(&format!("/supply/nodes/{}/update/", id_of(&b)), &token, &json!({ "supplier": null }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["level"], 0);
    assert_eq!(node(&server, &token, id_of(&c)).await?["level"], 1);

    // moving the top of a chain below another root is not a cycle
    let res = server
        .patch(&format!("/supply/nodes/{}/update/", id_of(&d)), &token, &json!({ "supplier": id_of(&c) }))
        .send()
        .await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["level"], 2);
    Ok(())
}

#[tokio::test]
async fn put_without_supplier_keeps_the_current_one() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;

    let a = server.create_node(&token, "Alpha", None).await?;
    let b = server.create_node(&token, "Bravo", Some(id_of(&a))).await?;

    let mut full = common::node_body("Bravo", None);
    if let Some(body) = full.as_object_mut() {
        body.remove("supplier");
    }
    full["city"] = json!("Kazan");
    let res = server
        .put(&format!("/supply/nodes/{}/update/", id_of(&b)), &token, &full)
        .send()
        .await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["city"], "Kazan");
    assert_eq!(body["data"]["supplier"], id_of(&a));
    assert_eq!(body["data"]["level"], 1);
    Ok(())
}
