//! Integration tests for the favorites view.

use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::helpers::TestApp;

/// Each favorites root flattened to `depth:name` strings in pre-order.
fn outline(body: &Value) -> Vec<Vec<String>> {
    fn walk(node: &Value, depth: usize, out: &mut Vec<String>) {
        out.push(format!("{depth}:{}", node["entry"]["name"].as_str().unwrap_or("?")));
        for child in node["children"].as_array().into_iter().flatten() {
            walk(child, depth + 1, out);
        }
    }

    body["data"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|root| {
            let mut out = Vec::new();
            walk(root, 0, &mut out);
            out
        })
        .collect()
}

async fn star(app: &TestApp, id: &str, starred: bool) {
    let response = app
        .request(
            "PUT",
            &format!("/api/entries/{id}/star"),
            Some(json!({ "starred": starred })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["is_starred"], starred);
}

#[tokio::test]
async fn test_nothing_starred_gives_empty_view() {
    let app = TestApp::new().await;
    app.folder("Docs", None).await;

    let response = app.request("GET", "/api/favorites", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"], json!([]));
}

#[tokio::test]
async fn test_starred_folder_then_moving_a_file_out() {
    let app = TestApp::new().await;
    let f1 = app.folder("F1", None).await;
    let f2 = app.folder("F2", Some(&f1)).await;
    let a = app.file("A", Some(&f2)).await;
    app.file("elsewhere.md", None).await;
    star(&app, &f1, true).await;

    let before = app.request("GET", "/api/favorites", None).await;
    assert_eq!(outline(&before.body), vec![vec!["0:F1", "1:F2", "2:A"]]);

    let moved = app
        .request(
            "PUT",
            &format!("/api/entries/{a}/move"),
            Some(json!({ "parent_id": null })),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);

    let after = app.request("GET", "/api/favorites", None).await;
    assert_eq!(outline(&after.body), vec![vec!["0:F1", "1:F2"]]);
}

#[tokio::test]
async fn test_starred_leaf_is_a_childless_root() {
    let app = TestApp::new().await;
    let docs = app.folder("Docs", None).await;
    let cv = app.file("cv.pdf", Some(&docs)).await;
    app.file("other.pdf", Some(&docs)).await;
    star(&app, &cv, true).await;

    let response = app.request("GET", "/api/favorites", None).await;
    assert_eq!(outline(&response.body), vec![vec!["0:cv.pdf"]]);
}

#[tokio::test]
async fn test_unstarring_removes_from_view() {
    let app = TestApp::new().await;
    let f1 = app.folder("F1", None).await;
    app.file("inside.md", Some(&f1)).await;
    star(&app, &f1, true).await;
    star(&app, &f1, false).await;

    let response = app.request("GET", "/api/favorites", None).await;
    assert_eq!(response.body["data"], json!([]));
}

#[tokio::test]
async fn test_favorites_belong_to_their_owner() {
    let app = TestApp::new().await;
    let f1 = app.folder("F1", None).await;
    star(&app, &f1, true).await;

    let stranger = app
        .request_as(
            "GET",
            "/api/favorites",
            None,
            Some(citrus_core::types::OwnerId::new()),
        )
        .await;
    assert_eq!(stranger.status, StatusCode::OK);
    assert_eq!(stranger.body["data"], json!([]));
}
