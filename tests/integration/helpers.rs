//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use citrus_core::config::{AppConfig, BlobProvider, StoreBackend};
use citrus_core::types::OwnerId;

/// Largest upload the test app accepts.
pub const TEST_MAX_UPLOAD: u64 = 4096;

/// Test application backed by the in-memory entry store and blob store.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Owner used by default in requests
    pub owner: OwnerId,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Memory;
        config.storage.provider = BlobProvider::Memory;
        config.storage.max_upload_size_bytes = TEST_MAX_UPLOAD;

        let state = citrus_api::build_state(config)
            .await
            .expect("Failed to build state");

        Self {
            router: citrus_api::build_app(state),
            owner: OwnerId::new(),
        }
    }

    /// Make a JSON request as the default owner
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        self.request_as(method, path, body, Some(self.owner)).await
    }

    /// Make a JSON request as `owner` (or anonymously)
    pub async fn request_as(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        owner: Option<OwnerId>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(owner) = owner {
            req = req.header("X-User-Id", owner.to_string());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload a file through the multipart endpoint as the default owner
    pub async fn upload(
        &self,
        file_name: &str,
        data: &[u8],
        parent_id: Option<&str>,
        tags: Option<&str>,
    ) -> TestResponse {
        let boundary = "citrus-test-boundary";
        let mut body: Vec<u8> = Vec::new();

        let mut text_field = |name: &str, value: &str| {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        };
        if let Some(parent_id) = parent_id {
            text_field("parent_id", parent_id);
        }
        if let Some(tags) = tags {
            text_field("tags", tags);
        }

        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/entries/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-User-Id", self.owner.to_string())
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Fetch raw bytes, for endpoints that do not answer with JSON
    pub async fn get_raw(&self, path: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .header("X-User-Id", self.owner.to_string())
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        (status, bytes.to_vec())
    }

    /// Create a folder and return its id
    pub async fn folder(&self, name: &str, parent_id: Option<&str>) -> String {
        self.create(serde_json::json!({
            "name": name,
            "is_folder": true,
            "parent_id": parent_id,
        }))
        .await
    }

    /// Create a content-less file entry and return its id
    pub async fn file(&self, name: &str, parent_id: Option<&str>) -> String {
        self.create(serde_json::json!({
            "name": name,
            "parent_id": parent_id,
        }))
        .await
    }

    async fn create(&self, body: Value) -> String {
        let response = self.request("POST", "/api/entries", Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["id"]
            .as_str()
            .expect("created entry has an id")
            .to_string()
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `error` code of a failed request
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or("")
    }

    /// Names of the entries in a `data` array
    pub fn names(&self) -> Vec<String> {
        self.body["data"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|e| e["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}
