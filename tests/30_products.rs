mod common;

use anyhow::Result;
use common::{expect_status, id_of, TestServer};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn product_crud() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;
    let plant = server.create_node(&token, "Plant", None).await?;
    let shop = server.create_node(&token, "Shop", Some(id_of(&plant))).await?;

    let product = server.create_product(&token, "Smartphone", id_of(&plant)).await?;
    assert_eq!(product["release_date"], "2024-03-01");
    assert_eq!(product["owner"], id_of(&plant));
    let path = format!("/supply/products/{}/", id_of(&product));

    let res = server.get(&path, &token).send().await?;
    assert_eq!(expect_status(res, StatusCode::OK).await?["data"], product);

    let update = format!("/supply/products/{}/update/", id_of(&product));
    let res = server.patch(&update, &token, &json!({ "model": "X200" })).send().await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["model"], "X200");
    assert_eq!(body["data"]["name"], "Smartphone");

    let res = server
        .put(
            &update,
            &token,
            &json!({ "name": "Phone", "model": "X300", "release_date": "2025-01-31", "owner": id_of(&shop) }),
        )
        .send()
        .await?;
    let body = expect_status(res, StatusCode::OK).await?;
    assert_eq!(body["data"]["owner"], id_of(&shop));
    assert_eq!(body["data"]["release_date"], "2025-01-31");

    let res = server.delete(&format!("/supply/products/{}/delete/", id_of(&product)), &token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.get(&path, &token).send().await?;
    let body = expect_status(res, StatusCode::NOT_FOUND).await?;
    assert_eq!(body["code"], "PRODUCT_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn product_validation() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;

    let res = server
        .post(
            "/supply/products/create/",
            &token,
            &json!({ "name": "Phone", "model": "X", "release_date": "01.03.2024", "owner": 42 }),
        )
        .send()
        .await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(
        body["field_errors"]["release_date"],
        "Date has wrong format. Use one of these formats instead: YYYY-MM-DD."
    );

    let res = server
        .post(
            "/supply/products/create/",
            &token,
            &json!({ "name": "Phone", "model": "X", "release_date": "2024-03-01", "owner": 42 }),
        )
        .send()
        .await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    assert_eq!(body["field_errors"]["owner"], "Invalid pk \"42\" - object does not exist.");

    let res = server.post("/supply/products/create/", &token, &json!({})).send().await?;
    let body = expect_status(res, StatusCode::BAD_REQUEST).await?;
    for field in ["name", "model", "release_date", "owner"] {
        assert_eq!(body["field_errors"][field], "This field is required.", "{field}");
    }
    Ok(())
}

#[tokio::test]
async fn owner_filter_and_nested_listing() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;
    let plant = server.create_node(&token, "Plant", None).await?;
    let shop = server.create_node(&token, "Shop", Some(id_of(&plant))).await?;

    server.create_product(&token, "Laptop", id_of(&plant)).await?;
    server.create_product(&token, "Headphones", id_of(&plant)).await?;
    server.create_product(&token, "Watch", id_of(&shop)).await?;

    let res = server.get(&format!("/supply/products/?owner={}", id_of(&plant)), &token).send().await?;
    let body = expect_status(res, StatusCode::OK).await?;
    let names: Vec<&str> = body["data"]
        .as_array()
        .map(|items| items.iter().filter_map(|p| p["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, ["Headphones", "Laptop"]);

    let res = server.get(&format!("/supply/nodes/{}/products/", id_of(&plant)), &token).send().await?;
    let nested = expect_status(res, StatusCode::OK).await?;
    assert_eq!(nested["data"], body["data"]);

    let res = server.get("/supply/products/", &token).send().await?;
    let all = expect_status(res, StatusCode::OK).await?;
    assert_eq!(all["data"].as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn nested_lookup_distinguishes_missing_node_from_missing_product() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;
    let plant = server.create_node(&token, "Plant", None).await?;
    let shop = server.create_node(&token, "Shop", None).await?;
    let laptop = server.create_product(&token, "Laptop", id_of(&plant)).await?;

    let res = server
        .get(&format!("/supply/nodes/{}/products/{}/", id_of(&plant), id_of(&laptop)), &token)
        .send()
        .await?;
    assert_eq!(expect_status(res, StatusCode::OK).await?["data"], laptop);

    // product exists but belongs to another node
    let res = server
        .get(&format!("/supply/nodes/{}/products/{}/", id_of(&shop), id_of(&laptop)), &token)
        .send()
        .await?;
    let body = expect_status(res, StatusCode::NOT_FOUND).await?;
    assert_eq!(body["code"], "PRODUCT_NOT_FOUND");

    // node checked before product
    let res = server
        .get(&format!("/supply/nodes/999/products/{}/", id_of(&laptop)), &token)
        .send()
        .await?;
    let body = expect_status(res, StatusCode::NOT_FOUND).await?;
    assert_eq!(body["code"], "NODE_NOT_FOUND");

    let res = server.get("/supply/nodes/999/products/", &token).send().await?;
    let body = expect_status(res, StatusCode::NOT_FOUND).await?;
    assert_eq!(body["code"], "NODE_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn deleting_a_node_deletes_its_products() -> Result<()> {
    let server = TestServer::start().await?;
    let token = server.register_and_login("ivanov@example.com").await?;
    let plant = server.create_node(&token, "Plant", None).await?;
    let shop = server.create_node(&token, "Shop", None).await?;
    let laptop = server.create_product(&token, "Laptop", id_of(&plant)).await?;
    let watch = server.create_product(&token, "Watch", id_of(&shop)).await?;

    let res = server.delete(&format!("/supply/nodes/{}/delete/", id_of(&plant)), &token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.get(&format!("/supply/products/{}/", id_of(&laptop)), &token).send().await?;
    expect_status(res, StatusCode::NOT_FOUND).await?;
    let res = server.get(&format!("/supply/products/{}/", id_of(&watch)), &token).send().await?;
    expect_status(res, StatusCode::OK).await?;
    Ok(())
}
