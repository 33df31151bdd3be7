#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use recipe_api::{
    db,
    middleware::auth::create_access_token,
    models::UserExtra,
    routes::AppState,
    services::accounts,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret";
pub const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub media: TempDir,
}

/// 인메모리 DB는 연결마다 따로 생기므로 연결을 하나로 고정합니다.
pub async fn spawn_app() -> TestApp {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open database");
    db::migrate(&pool).await.expect("Failed to run migrations");

    let media = tempfile::tempdir().expect("Failed to create media dir");
    let state = AppState {
        pool: pool.clone(),
        media_root: media.path().to_string_lossy().into_owned(),
        jwt_secret: JWT_SECRET.to_string(),
    };

    TestApp {
        router: recipe_api::app(state, MAX_UPLOAD_BYTES),
        pool,
        media,
    }
}

impl TestApp {
    /// 사용자를 만들고 그 사용자의 access 토큰을 돌려줍니다.
    pub async fn user_token(&self, email: &str) -> String {
        let user = accounts::create_user(&self.pool, Some(email), "testpass123", UserExtra::default())
            .await
            .unwrap();
        create_access_token(user.id, JWT_SECRET).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .uri(uri)
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn json(&self, method: &str, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> StatusCode {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .0
    }

    pub async fn upload(&self, uri: &str, token: &str, file_name: &str, data: &[u8]) -> (StatusCode, Value) {
        let boundary = "recipe-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

/// 10x10 PNG 바이트
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::new(10, 10);
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}
