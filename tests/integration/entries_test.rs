//! Integration tests for entry operations over HTTP.

use axum::http::StatusCode;
use serde_json::json;

use citrus_core::types::OwnerId;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_missing_identity_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.request_as("GET", "/api/entries", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_create_then_list_round_trip() {
    let app = TestApp::new().await;
    let docs = app.folder("Docs", None).await;
    app.file("zeta.md", Some(&docs)).await;
    app.file("alpha.md", Some(&docs)).await;
    app.file("loose.txt", None).await;

    let root = app.request("GET", "/api/entries", None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.names(), vec!["Docs", "loose.txt"]);

    let inside = app
        .request("GET", &format!("/api/entries?parent_id={docs}"), None)
        .await;
    assert_eq!(inside.names(), vec!["alpha.md", "zeta.md"]);
    assert!(
        inside.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|e| e["parent_id"] == json!(docs))
    );
}

#[tokio::test]
async fn test_create_validates_name_and_parent() {
    let app = TestApp::new().await;

    let blank = app
        .request("POST", "/api/entries", Some(json!({ "name": "   " })))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.error_code(), "INVALID_NAME");

    let file = app.file("note.md", None).await;
    let under_file = app
        .request(
            "POST",
            "/api/entries",
            Some(json!({ "name": "child", "parent_id": file })),
        )
        .await;
    assert_eq!(under_file.status, StatusCode::BAD_REQUEST);
    assert_eq!(under_file.error_code(), "INVALID_PARENT");

    let missing = app
        .request(
            "POST",
            "/api/entries",
            Some(json!({ "name": "child", "parent_id": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(missing.error_code(), "INVALID_PARENT");
}

#[tokio::test]
async fn test_entries_are_isolated_per_owner() {
    let app = TestApp::new().await;
    let docs = app.folder("Docs", None).await;
    let stranger = OwnerId::new();

    let listed = app
        .request_as("GET", "/api/entries", None, Some(stranger))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert!(listed.names().is_empty());

    let fetched = app
        .request_as("GET", &format!("/api/entries/{docs}"), None, Some(stranger))
        .await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);

    let nested = app
        .request_as(
            "POST",
            "/api/entries",
            Some(json!({ "name": "sneaky", "parent_id": docs })),
            Some(stranger),
        )
        .await;
    assert_eq!(nested.error_code(), "INVALID_PARENT");
}

#[tokio::test]
async fn test_rename_changes_only_the_name() {
    let app = TestApp::new().await;
    let docs = app.folder("Docs", None).await;
    let note = app.file("draft.md", Some(&docs)).await;
    app.request("POST", &format!("/api/entries/{note}/tags"), Some(json!({ "tag": "work" })))
        .await;

    let before = app.request("GET", &format!("/api/entries/{note}"), None).await;
    let renamed = app
        .request(
            "PUT",
            &format!("/api/entries/{note}/name"),
            Some(json!({ "name": "  final.md " })),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);

    let (old, new) = (&before.body["data"], &renamed.body["data"]);
    assert_eq!(new["name"], "final.md");
    for field in ["id", "parent_id", "is_folder", "is_starred", "tags", "created_at"] {
        assert_eq!(old[field], new[field], "{field} changed on rename");
    }

    let blank = app
        .request("PUT", &format!("/api/entries/{note}/name"), Some(json!({ "name": "" })))
        .await;
    assert_eq!(blank.error_code(), "INVALID_NAME");
}

#[tokio::test]
async fn test_move_into_own_subtree_is_rejected() {
    let app = TestApp::new().await;
    let a = app.folder("A", None).await;
    let b = app.folder("B", Some(&a)).await;
    let c = app.folder("C", Some(&b)).await;

    for target in [&a, &c] {
        let response = app
            .request(
                "PUT",
                &format!("/api/entries/{a}/move"),
                Some(json!({ "parent_id": target })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error_code(), "CYCLIC_MOVE");
    }

    let moved = app
        .request(
            "PUT",
            &format!("/api/entries/{c}/move"),
            Some(json!({ "parent_id": null })),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert!(moved.body["data"]["parent_id"].is_null());

    let root = app.request("GET", "/api/entries", None).await;
    assert_eq!(root.names(), vec!["A", "C"]);
}

#[tokio::test]
async fn test_breadcrumbs_and_subtree() {
    let app = TestApp::new().await;
    let a = app.folder("A", None).await;
    let b = app.folder("B", Some(&a)).await;
    let leaf = app.file("leaf.md", Some(&b)).await;

    let crumbs = app
        .request("GET", &format!("/api/entries/{leaf}/breadcrumbs"), None)
        .await;
    assert_eq!(crumbs.names(), vec!["A", "B", "leaf.md"]);

    let tree = app.request("GET", &format!("/api/entries/{a}/tree"), None).await;
    assert_eq!(tree.status, StatusCode::OK);
    let root = &tree.body["data"];
    assert_eq!(root["entry"]["name"], "A");
    assert_eq!(root["children"][0]["entry"]["name"], "B");
    assert_eq!(root["children"][0]["children"][0]["entry"]["name"], "leaf.md");
}

#[tokio::test]
async fn test_tags_are_case_insensitive() {
    let app = TestApp::new().await;
    let note = app.file("note.md", None).await;
    let path = format!("/api/entries/{note}/tags");

    let added = app.request("POST", &path, Some(json!({ "tag": "Work" }))).await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.body["data"]["tags"], json!(["work"]));

    let duplicate = app.request("POST", &path, Some(json!({ "tag": "WORK" }))).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.error_code(), "DUPLICATE_TAG");

    let removed = app.request("DELETE", &format!("{path}/WoRk"), None).await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["data"]["tags"], json!([]));

    let none_left = app.request("DELETE", &format!("{path}/work"), None).await;
    assert_eq!(none_left.status, StatusCode::NOT_FOUND);
    assert_eq!(none_left.error_code(), "TAG_NOT_FOUND");
}

#[tokio::test]
async fn test_list_filters_by_all_tags() {
    let app = TestApp::new().await;
    let both = app.file("both.md", None).await;
    let one = app.file("one.md", None).await;
    for (id, tag) in [(&both, "work"), (&both, "urgent"), (&one, "work")] {
        app.request(
            "POST",
            &format!("/api/entries/{id}/tags"),
            Some(json!({ "tag": tag })),
        )
        .await;
    }

    let work = app.request("GET", "/api/entries?tags=work", None).await;
    assert_eq!(work.names(), vec!["both.md", "one.md"]);

    let work_urgent = app
        .request("GET", "/api/entries?tags=Work,URGENT", None)
        .await;
    assert_eq!(work_urgent.names(), vec!["both.md"]);
}

#[tokio::test]
async fn test_delete_cascades_and_frees_content() {
    let app = TestApp::new().await;
    let docs = app.folder("Docs", None).await;
    let inner = app.folder("Inner", Some(&docs)).await;
    let uploaded = app.upload("notes.txt", b"hello citrus", Some(&inner), None).await;
    assert_eq!(uploaded.status, StatusCode::CREATED);
    let file_id = uploaded.body["data"]["id"].as_str().unwrap().to_string();
    let keep = app.file("keep.md", None).await;

    let deleted = app.request("DELETE", &format!("/api/entries/{docs}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["data"]["removed"], 3);

    for id in [&docs, &inner, &file_id] {
        let gone = app.request("GET", &format!("/api/entries/{id}"), None).await;
        assert_eq!(gone.status, StatusCode::NOT_FOUND);
    }
    let (status, _) = app.get_raw(&format!("/api/entries/{file_id}/content")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let root = app.request("GET", "/api/entries", None).await;
    assert_eq!(root.names(), vec!["keep.md"]);
    assert_eq!(root.body["data"][0]["id"], json!(keep));

    let again = app.request("DELETE", &format!("/api/entries/{docs}"), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_and_download_content() {
    let app = TestApp::new().await;
    let uploaded = app
        .upload("todo.md", b"# Today\n- buy lemons\n", None, Some("home, Errands"))
        .await;
    assert_eq!(uploaded.status, StatusCode::CREATED);
    let entry = &uploaded.body["data"];
    assert_eq!(entry["is_folder"], false);
    assert_eq!(entry["tags"], json!(["errands", "home"]));
    assert_eq!(entry["content"]["size_bytes"], 21);
    let id = entry["id"].as_str().unwrap();

    let (status, bytes) = app.get_raw(&format!("/api/entries/{id}/content")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"# Today\n- buy lemons\n");
}

#[tokio::test]
async fn test_create_cannot_reference_existing_payload() {
    let app = TestApp::new().await;
    let uploaded = app.upload("secret.txt", b"secret", None, None).await;
    let entry = &uploaded.body["data"];
    let id = entry["id"].as_str().unwrap().to_string();
    let stranger = OwnerId::new();

    let forged = app
        .request_as(
            "POST",
            "/api/entries",
            Some(json!({ "name": "copy.txt", "content": entry["content"].clone() })),
            Some(stranger),
        )
        .await;
    assert_eq!(forged.status, StatusCode::BAD_REQUEST);
    assert_eq!(forged.error_code(), "VALIDATION");

    let made_up = app
        .request(
            "POST",
            "/api/entries",
            Some(json!({
                "name": "ghost.bin",
                "content": { "blob_key": "missing", "content_type": "text/plain", "size_bytes": 9 }
            })),
        )
        .await;
    assert_eq!(made_up.status, StatusCode::BAD_REQUEST);

    let listed = app
        .request_as("GET", "/api/entries", None, Some(stranger))
        .await;
    assert!(listed.names().is_empty());
    let (status, bytes) = app.get_raw(&format!("/api/entries/{id}/content")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"secret");
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let app = TestApp::new().await;
    let data = vec![b'x'; crate::helpers::TEST_MAX_UPLOAD as usize + 1];

    let response = app.upload("big.bin", &data, None, None).await;
    assert!(response.status.is_client_error());

    let root = app.request("GET", "/api/entries", None).await;
    assert!(root.names().is_empty());
}

#[tokio::test]
async fn test_malformed_entry_id_is_bad_request() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/entries/not-an-id", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION");
}

#[tokio::test]
async fn test_health_reports_backends() {
    let app = TestApp::new().await;
    let response = app.request_as("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["store"]["backend"], "memory");
    assert_eq!(response.body["data"]["blobs"]["backend"], "memory");
}
