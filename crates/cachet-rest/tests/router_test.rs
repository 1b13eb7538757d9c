//! End-to-end tests of the HTTP surface over in-memory stores and a
//! temporary upload directory.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cachet_config::{MissingDeletePolicy, ServerConfig};
use cachet_repository::{memory::InMemoryUserStore, BlobStore, FilesystemBlobStore};
use cachet_rest::{create_router_with_state, AppState};
use cachet_service::{memory::InMemoryCache, FileUploadGateway, UploadLimits, UserCacheGateway};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<InMemoryUserStore>,
    blobs: Arc<FilesystemBlobStore>,
    _dir: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_policy(MissingDeletePolicy::Ignore, 2).await
    }

    async fn with_policy(policy: MissingDeletePolicy, users: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryUserStore::with_users(users));
        let cache = Arc::new(InMemoryCache::new());
        let blobs = Arc::new(FilesystemBlobStore::new(dir.path().join("uploads")).await.unwrap());

        let user_gateway =
            UserCacheGateway::new(store.clone(), cache).with_missing_delete(policy);
        let upload_gateway = FileUploadGateway::new(blobs.clone(), UploadLimits::default());
        let state = AppState::new(Arc::new(user_gateway), Arc::new(upload_gateway), "uploads");

        Self {
            router: create_router_with_state(state, &ServerConfig::default()),
            store,
            blobs,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.get(uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_form(
        &self,
        uri: &str,
        form: &str,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        self.send(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn upload(
        &self,
        field: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        let boundary = "cachet-test-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let (status, _, body) = self
            .send(
                Request::post("/upload")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

#[tokio::test]
async fn test_json_listing_reports_store_then_cache() {
    let app = TestApp::new().await;

    let (status, first) = app.get_json("/json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["source"], "PostgreSQL");
    assert_eq!(first["users"].as_array().unwrap().len(), 2);
    assert_eq!(first["users"][0]["name"], "user0");

    let (_, second) = app.get_json("/json").await;
    assert_eq!(second["source"], "Redis");
    assert_eq!(second["users"], first["users"]);
}

#[tokio::test]
async fn test_create_from_form_redirects_and_invalidates() {
    let app = TestApp::new().await;
    app.get_json("/json").await;

    let (status, headers, _) = app.post_form("/users", "name=Ann&email=ann%40example.com").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");

    let (_, listing) = app.get_json("/json").await;
    assert_eq!(listing["source"], "PostgreSQL");
    assert_eq!(listing["users"][2]["email"], "ann@example.com");
}

#[tokio::test]
async fn test_create_from_json_body() {
    let app = TestApp::new().await;

    let (status, _, _) = app
        .send(
            Request::post("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"Bob","email":"bob@example.com"}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(app.store.snapshot().len(), 3);
}

#[tokio::test]
async fn test_create_with_blank_name_is_400() {
    let app = TestApp::new().await;

    let (status, _, body) = app.post_form("/users", "name=+&email=a%40b.c").await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(app.store.snapshot().len(), 2);
}

#[tokio::test]
async fn test_delete_redirects_and_invalidates() {
    let app = TestApp::new().await;
    app.get_json("/json").await;

    let (status, headers, _) = app.post_form("/users/delete/1", "").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/");

    let (_, listing) = app.get_json("/json").await;
    assert_eq!(listing["source"], "PostgreSQL");
    assert_eq!(listing["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_of_missing_id_still_redirects() {
    let app = TestApp::new().await;
    app.get_json("/json").await;

    let (status, _, _) = app.post_form("/users/delete/999", "").await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, listing) = app.get_json("/json").await;
    assert_eq!(listing["source"], "PostgreSQL");
}

#[tokio::test]
async fn test_delete_of_missing_id_is_404_under_not_found_policy() {
    let app = TestApp::with_policy(MissingDeletePolicy::NotFound, 1).await;

    let (status, _, body) = app.post_form("/users/delete/999", "").await;
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_with_non_numeric_id_is_400() {
    let app = TestApp::new().await;

    let (status, _, _) = app.post_form("/users/delete/abc", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_failure_is_500_without_backend_detail() {
    let app = TestApp::new().await;
    app.store.fail_reads(true);

    let (status, body) = app.get_json("/json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    assert_eq!(body["error"]["message"], "Internal server error");
}

#[tokio::test]
async fn test_write_failure_is_500() {
    let app = TestApp::new().await;
    app.store.fail_writes(true);

    let (status, _, _) = app.post_form("/users", "name=Ann&email=a%40b.c").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_upload_then_download_round_trip() {
    let app = TestApp::new().await;
    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

    let (status, body) = app.upload("myFile", "photo.png", "image/png", &data).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "File uploaded!");

    let path = body["file"].as_str().unwrap();
    let stored = path.strip_prefix("uploads/").unwrap();
    assert!(stored.starts_with("myFile-") && stored.ends_with(".png"));

    let (status, headers, downloaded) = app.get(&format!("/download/{stored}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    assert_eq!(downloaded, data);
}

#[tokio::test]
async fn test_upload_at_limit_is_accepted() {
    let app = TestApp::new().await;

    let (status, _) = app
        .upload("myFile", "doc.pdf", "application/pdf", &vec![0u8; 1_000_000])
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.blobs.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_upload_over_limit_is_400_and_not_stored() {
    let app = TestApp::new().await;

    let (status, body) = app
        .upload("myFile", "doc.pdf", "application/pdf", &vec![0u8; 1_000_001])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("too large"));
    assert!(app.blobs.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_over_body_limit_is_reported_as_too_large() {
    let app = TestApp::new().await;

    let (status, body) = app
        .upload("myFile", "x.png", "image/png", &vec![0u8; 2_000_000])
        .await;
    let message = body["message"].as_str().unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(message.contains("too large"), "{message}");
    assert!(message.contains("1000000"), "{message}");
    assert!(app.blobs.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_over_body_limit_with_bad_type_is_still_too_large() {
    let app = TestApp::new().await;

    let (status, body) = app
        .upload("myFile", "x.exe", "image/png", &vec![0u8; 2_000_000])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("too large"));
    assert!(app.blobs.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_type_mismatch_is_400() {
    let app = TestApp::new().await;

    let (status, body) = app.upload("myFile", "x.png", "application/pdf", b"%PDF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Unsupported file type"));

    let (status, _) = app.upload("myFile", "x.exe", "image/png", b"MZ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.blobs.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_is_400() {
    let app = TestApp::new().await;

    let (status, body) = app.upload("myFile", "", "application/octet-stream", b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file selected!");

    let (status, _, body) = app.post_form("/upload", "a=b").await;
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file selected!");
}

#[tokio::test]
async fn test_upload_under_unexpected_field_is_400() {
    let app = TestApp::new().await;

    let (status, _) = app.upload("other", "x.png", "image/png", b"png").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_missing_is_404() {
    let app = TestApp::new().await;

    let (status, body) = app.get_json("/download/myFile-0.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "File not found!");
}

#[tokio::test]
async fn test_download_traversal_is_404() {
    let app = TestApp::new().await;
    std::fs::write(app._dir.path().join("secret.txt"), b"secret").unwrap();

    let (status, body) = app.get_json("/download/..%2Fsecret.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "File not found!");
}

#[tokio::test]
async fn test_index_lists_users_and_files() {
    let app = TestApp::new().await;
    app.upload("myFile", "a.gif", "image/gif", b"GIF89a").await;

    let (status, headers, body) = app.get("/").await;
    let html = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    assert!(html.contains("user0@example.com"));
    assert!(html.contains("href=\"/download/myFile-"));
}

#[tokio::test]
async fn test_index_renders_when_store_is_down() {
    let app = TestApp::new().await;
    app.store.fail_reads(true);

    let (status, _, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("No users."));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new().await;

    let (status, body) = app.get_json("/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let (status, body) = app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
