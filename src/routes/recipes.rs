//! # 레시피(Recipe) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/recipes`                   → 내 레시피 목록 (요약, `?tags=1,2&ingredients=3`)
//! - `POST   /api/v1/recipes`                   → 새 레시피 생성 (201, 요약)
//! - `GET    /api/v1/recipes/{id}`              → 단건 조회 (상세: 태그/재료 중첩)
//! - `PUT    /api/v1/recipes/{id}`              → 전체 수정 (요약)
//! - `PATCH  /api/v1/recipes/{id}`              → 부분 수정 (요약)
//! - `DELETE /api/v1/recipes/{id}`              → 삭제 (204)
//! - `POST   /api/v1/recipes/{id}/upload-image` → 이미지 업로드 (`{id, image}`)
//!
//! ## 응답 표현
//! 목록/생성/수정은 태그와 재료를 id 배열로 보여주는 **요약** 표현을,
//! 단건 조회는 `{id, name}` 객체로 펼친 **상세** 표현을 사용합니다.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
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
    services::images,
};

/// 업로드 multipart에서 이미지를 담는 필드 이름
const IMAGE_FIELD: &str = "image";

/// `GET /recipes`: 요청자의 레시피를 최신순으로 반환합니다.
pub async fn list_recipes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiQuery(query): ApiQuery<RecipeFilterQuery>,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    let filter = query.parse()?;
    let recipes = db::recipes::list_recipes(&state.pool, auth_user.user_id, &filter).await?;

    let mut summaries = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        summaries.push(db::recipes::summarize(&state.pool, recipe).await?);
    }
    Ok(Json(summaries))
}

/// `GET /recipes/{id}`: 상세 표현으로 반환합니다.
pub async fn get_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<RecipeDetail>, AppError> {
    let recipe = db::recipes::get_recipe(&state.pool, auth_user.user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(db::recipes::detail(&state.pool, recipe).await?))
}

/// `POST /recipes`: 새 레시피를 만듭니다.
///
/// 태그/재료 id는 전체 카탈로그에서 찾습니다 (`db::catalog::find_missing_ids` 참고).
pub async fn create_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiJson(req): ApiJson<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    let fields = req.validate_new()?;
    let recipe = db::recipes::create_recipe(&state.pool, auth_user.user_id, &fields).await?;

    tracing::info!(user_id = auth_user.user_id, recipe_id = recipe.id, "Created recipe {}", recipe);
    let summary = db::recipes::summarize(&state.pool, recipe).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// `PUT /recipes/{id}`: 필수 필드를 모두 받아 수정합니다.
pub async fn replace_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<RecipeRequest>,
) -> Result<Json<RecipeSummary>, AppError> {
    // 검증보다 존재 확인이 먼저입니다: 남의 레시피에는 항상 404
    db::recipes::get_recipe(&state.pool, auth_user.user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let fields = req.validate_new()?;
    save_changes(&state, auth_user, id, &fields).await
}

/// `PATCH /recipes/{id}`: 보낸 필드만 수정합니다.
pub async fn patch_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<RecipeRequest>,
) -> Result<Json<RecipeSummary>, AppError> {
    let current = db::recipes::get_recipe(&state.pool, auth_user.user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let fields = req.validate_patch(&current)?;
    save_changes(&state, auth_user, id, &fields).await
}

async fn save_changes(
    state: &AppState,
    auth_user: AuthUser,
    id: i64,
    fields: &RecipeFields,
) -> Result<Json<RecipeSummary>, AppError> {
    let recipe = db::recipes::update_recipe(&state.pool, auth_user.user_id, id, fields)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(db::recipes::summarize(&state.pool, recipe).await?))
}

/// `DELETE /recipes/{id}`: 레시피와 관계 행을 지우고, 저장된 이미지 파일도 정리합니다.
pub async fn delete_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    let recipe = db::recipes::get_recipe(&state.pool, auth_user.user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let deleted = db::recipes::delete_recipe(&state.pool, auth_user.user_id, id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    if let Some(image) = &recipe.image {
        images::remove_image(&state.media_root, image).await;
    }

    tracing::info!(user_id = auth_user.user_id, recipe_id = id, "Deleted recipe");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /recipes/{id}/upload-image`: multipart `image` 필드 하나를 받아 저장합니다.
///
/// 처리 순서:
/// 1. 레시피 소유 확인 (없으면 404)
/// 2. `image` 필드의 바이트를 읽고 실제 이미지인지 검증 (실패 시 400, 아무것도 저장하지 않음)
/// 3. `uploads/recipe/<uuid>.<ext>`에 파일 저장 후 DB에 경로 기록
/// 4. 이전 이미지 파일이 있으면 삭제
pub async fn upload_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecipeImage>, AppError> {
    let recipe = db::recipes::get_recipe(&state.pool, auth_user.user_id, id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut multipart =
        multipart.map_err(|_| AppError::field(IMAGE_FIELD, "No file was submitted."))?;
    let (file_name, data) = read_image_field(&mut multipart).await?;

    if let Err(message) = images::validate_image(&data) {
        tracing::warn!(recipe_id = id, "Rejected image upload: {}", message);
        return Err(AppError::field(IMAGE_FIELD, message));
    }

    let path = images::new_recipe_image_path(&file_name);
    images::save_image(&state.media_root, &path, &data).await?;

    let updated = match db::recipes::set_image(&state.pool, auth_user.user_id, id, &path).await {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            images::remove_image(&state.media_root, &path).await;
            return Err(AppError::NotFound);
        }
        Err(e) => {
            images::remove_image(&state.media_root, &path).await;
            return Err(e);
        }
    };

    if let Some(old) = recipe.image.as_deref().filter(|old| *old != path) {
        images::remove_image(&state.media_root, old).await;
    }

    tracing::info!(recipe_id = id, bytes = data.len(), "Stored recipe image at {}", path);
    Ok(Json(RecipeImage::from(&updated)))
}

/// multipart에서 `image` 필드를 찾아 (원본 파일 이름, 바이트)를 반환합니다.
async fn read_image_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(AppError::field(IMAGE_FIELD, "No file was submitted.")),
            Err(e) => return Err(multipart_error(e)),
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok((file_name, data.to_vec()));
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::field(IMAGE_FIELD, "The submitted file is too large.")
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}
