//! # recipe-api 라이브러리 루트
//!
//! 바이너리(`main.rs`)와 통합 테스트(`tests/`)가 같은 라우터를 쓰도록
//! 모듈과 라우터 조립 함수를 라이브러리로 공개합니다.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use models::{Ingredient, Tag};
use routes::{auth, catalog, health_check, recipes, AppState};

/// 태그/재료 라우트. 두 종류가 같은 제네릭 핸들러를 타입만 바꿔 씁니다.
fn catalog_routes<T: models::CatalogItem>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(catalog::list_items::<T>).post(catalog::create_item::<T>))
        .route(
            &format!("{path}/{{id}}"),
            put(catalog::update_item::<T>)
                .patch(catalog::update_item::<T>)
                .delete(catalog::delete_item::<T>),
        )
}

/// 전체 애플리케이션 라우터를 조립합니다.
///
/// - `/api/v1/...`: JSON API
/// - `/media/...`: 업로드된 이미지 (읽기 전용 정적 파일)
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me).patch(auth::update_me));

    let recipe_routes = Router::new()
        .route("/recipes", get(recipes::list_recipes).post(recipes::create_recipe))
        .route(
            "/recipes/{id}",
            get(recipes::get_recipe)
                .put(recipes::replace_recipe)
                .patch(recipes::patch_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/recipes/{id}/upload-image", post(recipes::upload_image));

    let media_root = state.media_root.clone();

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(catalog_routes::<Tag>("/tags"))
        .merge(catalog_routes::<Ingredient>("/ingredients"))
        .merge(recipe_routes)
        .route("/health", get(health_check))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest_service("/media", ServeDir::new(media_root))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
