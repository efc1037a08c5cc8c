mod common;

use std::time::Duration;

use common::*;

use http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

const RESOURCES_ROUTE: &str = "/api/v1/resources";

// Create tests

#[tokio::test]
async fn test_create_resource_with_defaults() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            RESOURCES_ROUTE,
            json!({"name": "Free Linux course", "url": "https://example.com/linux"}),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["ok"], true);

    let resource = &body["resource"];
    assert_eq!(resource["PartitionKey"], "general");
    assert_eq!(resource["category"], "general");
    assert_eq!(resource["name"], "Free Linux course");
    assert_eq!(resource["url"], "https://example.com/linux");
    assert_eq!(resource["tags"], "");
    assert_eq!(resource["notes"], "");

    let row_key = resource["RowKey"].as_str().unwrap();
    assert_eq!(row_key.len(), 21);
    assert!(row_key.chars().nth(8) == Some('T'));

    let created_at = resource["created_at"].as_str().unwrap();
    assert!(created_at.ends_with('Z'));
    assert_eq!(created_at.len(), 27);

    let rows = setup.resources.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_key, row_key);
    assert!(setup.resources.is_provisioned());
}

#[tokio::test]
async fn test_create_resource_normalizes_category() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            RESOURCES_ROUTE,
            json!({
                "name": "Refurbished laptops",
                "url": "https://example.com/laptops",
                "category": "  Hardware ",
                "notes": "Ships nationwide",
            }),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["resource"]["PartitionKey"], "hardware");
    assert_eq!(body["resource"]["category"], "hardware");
    assert_eq!(body["resource"]["notes"], "Ships nationwide");
}

#[tokio::test]
async fn test_create_resource_blank_category_is_general() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            RESOURCES_ROUTE,
            json!({"name": "n", "url": "u", "category": "   "}),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["resource"]["category"], "general");
}

#[tokio::test]
async fn test_create_resource_joins_tags() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            RESOURCES_ROUTE,
            json!({"name": "n", "url": "u", "tags": [" linux ", "", "free", null]}),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["resource"]["tags"], "linux,free");
}

#[tokio::test]
async fn test_create_resource_keeps_whitespace_tag_slot() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            RESOURCES_ROUTE,
            json!({"name": "n", "url": "u", "tags": ["a", "  ", "b"]}),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["resource"]["tags"], "a,,b");

    let response = setup
        .send_get_request(RESOURCES_ROUTE)
        .await
        .expect("Failed to send request");

    let body = parse_response_body(response).await;
    assert_eq!(body["resources"][0]["tags"], json!(["a", "b"]));
}

#[tokio::test]
async fn test_create_resource_keeps_string_tags() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(
            RESOURCES_ROUTE,
            json!({"name": "n", "url": "u", "tags": "a,b"}),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["resource"]["tags"], "a,b");
}

// Validation error tests

#[tokio::test]
async fn test_create_resource_missing_fields() {
    let setup = TestSetup::new();

    for payload in [
        json!({"name": "only a name"}),
        json!({"url": "https://example.com"}),
        json!({"name": "", "url": "https://example.com"}),
        json!({"name": "n", "url": ""}),
        json!({}),
    ] {
        let response = setup
            .send_post_request(RESOURCES_ROUTE, payload.clone())
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
        let body = parse_response_body(response).await;
        assert_eq!(
            body,
            json!({"ok": false, "error": "'name' and 'url' required"})
        );
    }

    assert!(setup.resources.rows().await.is_empty());
    assert!(!setup.resources.is_provisioned());
}

#[tokio::test]
async fn test_create_resource_invalid_json() {
    let setup = TestSetup::new();

    let response = setup
        .send_raw_post_request(RESOURCES_ROUTE, "application/json", "{not json")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body, json!({"ok": false, "error": "Invalid JSON"}));
    assert!(setup.resources.rows().await.is_empty());
}

#[tokio::test]
async fn test_create_resource_wrong_content_type() {
    let setup = TestSetup::new();

    let response = setup
        .send_raw_post_request(
            RESOURCES_ROUTE,
            "text/plain",
            json!({"name": "n", "url": "u"}).to_string(),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "Invalid JSON");
}

#[tokio::test]
async fn test_create_resource_wrong_field_type() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request(RESOURCES_ROUTE, json!({"name": 42, "url": "u"}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "Invalid JSON");
}

// List tests

#[tokio::test]
async fn test_list_resources_empty_creates_table() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request(RESOURCES_ROUTE)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body, json!({"ok": true, "resources": []}));
    assert!(setup.resources.is_provisioned());
}

#[tokio::test]
async fn test_list_resources_round_trips_tags() {
    let setup = TestSetup::new();

    setup
        .send_post_request(
            RESOURCES_ROUTE,
            json!({"name": "Tagged", "url": "https://example.com", "tags": ["x", "y", "z"]}),
        )
        .await
        .expect("Failed to send request");

    let response = setup
        .send_get_request(RESOURCES_ROUTE)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    let resource = &body["resources"][0];

    assert_eq!(resource["tags"], json!(["x", "y", "z"]));
    assert_eq!(resource["partition"], "general");
    assert_eq!(resource["category"], "general");
    assert!(resource["id"].is_string());
    assert!(resource["created_at"].is_string());
}

#[tokio::test]
async fn test_list_resources_newest_first_across_categories() {
    let setup = TestSetup::new();

    for (name, category) in [("first", "software"), ("second", "hardware"), ("third", "")] {
        let response = setup
            .send_post_request(
                RESOURCES_ROUTE,
                json!({"name": name, "url": "https://example.com", "category": category}),
            )
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);

        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let response = setup
        .send_get_request(RESOURCES_ROUTE)
        .await
        .expect("Failed to send request");

    let body = parse_response_body(response).await;
    let names: Vec<&str> = body["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|resource| resource["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["third", "second", "first"]);
}

// Storage error tests

#[tokio::test]
async fn test_resources_without_storage() {
    let setup = TestSetup::without_storage();

    let response = setup
        .send_post_request(RESOURCES_ROUTE, json!({"name": "n", "url": "u"}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(
        body,
        json!({"ok": false, "error": "Storage credentials are not configured"})
    );

    let response = setup
        .send_get_request(RESOURCES_ROUTE)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_resources_storage_failure() {
    let setup = TestSetup::unavailable();

    let response = setup
        .send_post_request(RESOURCES_ROUTE, json!({"name": "n", "url": "u"}))
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse_response_body(response).await;
    assert_eq!(body["ok"], false);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));

    let response = setup
        .send_get_request(RESOURCES_ROUTE)
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
