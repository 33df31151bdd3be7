//! # 태그/재료 API 라우트 핸들러
//!
//! 태그와 재료는 같은 계약을 가지므로 핸들러를 `T: CatalogItem`에 대해
//! 제네릭으로 한 번만 작성하고, 라우터에서 타입을 지정해 등록합니다.
//!
//! ```ignore
//! .route("/tags", get(catalog::list_items::<Tag>).post(catalog::create_item::<Tag>))
//! ```
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/{tags,ingredients} | `list_items` | 내 항목 목록 (`?assigned_only=1`) |
//! | POST | /api/v1/{tags,ingredients} | `create_item` | 새 항목 생성 |
//! | PUT/PATCH | /api/v1/{tags,ingredients}/{id} | `update_item` | 이름 변경 |
//! | DELETE | /api/v1/{tags,ingredients}/{id} | `delete_item` | 항목 삭제 |
//!
//! 모든 핸들러는 `AuthUser`를 받으므로 토큰이 없으면 핸들러가 실행되기 전에 401이 됩니다.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    db,
    error::AppError,
    middleware::{
        auth::AuthUser,
        extract::{ApiPath, ApiQuery},
        json::ApiJson,
    },
    models::*,
    routes::AppState,
};

/// 요청자의 항목 목록을 이름 내림차순으로 반환합니다.
///
/// `GET /api/v1/tags?assigned_only=1` → 레시피에 연결된 태그만
pub async fn list_items<T: CatalogItem>(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(query): ApiQuery<CatalogListQuery>,
) -> Result<Json<Vec<T>>, AppError> {
    let items = db::catalog::list_items::<T>(&state.pool, auth_user.user_id, query.assigned_only())
        .await?;
    Ok(Json(items))
}

/// 새 항목을 만들고 `201 Created`로 반환합니다. 소유자는 항상 요청자입니다.
pub async fn create_item<T: CatalogItem>(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiJson(req): ApiJson<CatalogItemRequest>,
) -> Result<(StatusCode, Json<T>), AppError> {
    let name = req.validate()?;
    let item = db::catalog::create_item::<T>(&state.pool, auth_user.user_id, &name).await?;

    tracing::info!(user_id = auth_user.user_id, "Created {} {}", T::LABEL, item);
    Ok((StatusCode::CREATED, Json(item)))
}

/// 이름을 변경합니다. 다른 사용자의 항목이면 404입니다.
pub async fn update_item<T: CatalogItem>(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<CatalogItemRequest>,
) -> Result<Json<T>, AppError> {
    let name = req.validate()?;
    let item = db::catalog::rename_item::<T>(&state.pool, auth_user.user_id, id, &name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(item))
}

/// 항목을 삭제합니다 → `204 No Content`
pub async fn delete_item<T: CatalogItem>(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    let deleted = db::catalog::delete_item::<T>(&state.pool, auth_user.user_id, id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    tracing::info!(user_id = auth_user.user_id, "Deleted {} {}", T::LABEL, id);
    Ok(StatusCode::NO_CONTENT)
}
