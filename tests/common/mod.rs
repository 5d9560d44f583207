//! Shared helpers for the web API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use tempfile::TempDir;

use stash::web::WebServer;
use stash::{Config, Database};

pub const PASSWORD: &str = "correct-horse-1";

/// A running application over an in-memory database and a temporary
/// media directory.
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<Database>,
    _media: TempDir,
}

/// An account registered through the API, with a live access token.
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> HeaderValue {
        bearer(&self.token)
    }
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

pub fn test_config(media: &TempDir) -> Config {
    let mut config = Config::default();
    config.web.jwt_secret = "test-secret-key-for-testing-only".to_string();
    config.web.login_rate_limit = 10_000;
    config.web.api_rate_limit = 10_000;
    config.files.storage_path = media.path().to_string_lossy().into_owned();
    config.files.max_upload_size_mb = 1;
    config.logging.file = String::new();
    config
}

impl TestApp {
    pub async fn new() -> Self {
        let media = tempfile::tempdir().unwrap();
        Self::with_config(test_config(&media), media).await
    }

    pub async fn with_config(config: Config, media: TempDir) -> Self {
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let router = WebServer::new(&config, db.clone()).unwrap().router();
        let server = TestServer::new(router).unwrap();
        Self {
            server,
            db,
            _media: media,
        }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/accounts/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.server
            .post("/api/token")
            .json(&json!({ "email": email, "password": password }))
            .await
    }

    /// Register `username` and log in.
    pub async fn user(&self, username: &str) -> TestUser {
        let email = format!("{username}@example.com");
        let registered = self.register(username, &email, PASSWORD).await;
        registered.assert_status(axum::http::StatusCode::CREATED);
        let id = registered.json::<Value>()["data"]["id"].as_i64().unwrap();

        let login = self.login(&email, PASSWORD).await;
        login.assert_status_ok();
        let token = login.json::<Value>()["data"]["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        TestUser {
            id,
            username: username.to_string(),
            email,
            token,
        }
    }

    /// Create a folder and return its representation.
    pub async fn folder(&self, owner: &TestUser, body: Value) -> Value {
        let response = self
            .server
            .post("/api/folders")
            .add_header(AUTHORIZATION, owner.bearer())
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    pub async fn upload(&self, owner: &TestUser, folder_id: i64, filename: &str, content: &[u8]) -> TestResponse {
        let form = MultipartForm::new()
            .add_text("folder", folder_id.to_string())
            .add_part("file", Part::bytes(content.to_vec()).file_name(filename.to_string()));
        self.server
            .post("/api/files")
            .add_header(AUTHORIZATION, owner.bearer())
            .multipart(form)
            .await
    }

    pub async fn get_folder(&self, viewer: Option<&TestUser>, folder_id: i64) -> TestResponse {
        let mut request = self.server.get(&format!("/api/folders/{folder_id}"));
        if let Some(viewer) = viewer {
            request = request.add_header(AUTHORIZATION, viewer.bearer());
        }
        request.await
    }
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().unwrap()
}
