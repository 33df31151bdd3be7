use crate::{
    db::users as db_users,
    error::{AppError, FieldErrors},
    middleware::{
        auth::{
            create_access_token, create_refresh_token, hash_token, verify_refresh_token, AuthUser,
            REFRESH_TOKEN_DAYS,
        },
        json::ApiJson,
    },
    models::user::*,
    routes::AppState,
    services::accounts,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

pub const PASSWORD_MIN_LEN: usize = 5;

const EXPIRES_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// 회원가입 입력 검증. 문제가 있는 필드를 모두 모아서 돌려줍니다.
fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    match req.email.as_deref().map(str::trim) {
        None | Some("") => errors.add("email", "This field is required."),
        Some(email) if !email.contains('@') => errors.add("email", "Enter a valid email address."),
        Some(_) => {}
    }

    match req.password.as_deref() {
        None | Some("") => errors.add("password", "This field is required."),
        Some(password) if password.chars().count() < PASSWORD_MIN_LEN => errors.add(
            "password",
            format!("Ensure this field has at least {PASSWORD_MIN_LEN} characters."),
        ),
        Some(_) => {}
    }

    errors.into_result()
}

/// access/refresh 토큰 쌍을 발급하고 refresh 토큰은 해시만 저장합니다.
async fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let access_token = create_access_token(user.id, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    let refresh_token = create_refresh_token(user.id, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    let token_id = uuid::Uuid::now_v7().to_string();
    let token_hash = hash_token(&refresh_token);
    let expires_at = (Utc::now() + Duration::days(REFRESH_TOKEN_DAYS))
        .format(EXPIRES_AT_FORMAT)
        .to_string();

    db_users::store_refresh_token(&state.pool, &token_id, user.id, &token_hash, &expires_at).await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_registration(&req)?;

    let extra = UserExtra {
        name: req.name.unwrap_or_default().trim().to_string(),
        ..UserExtra::default()
    };
    let password = req.password.unwrap_or_default();
    let user = accounts::create_user(&state.pool, req.email.as_deref(), &password, extra).await?;

    let response = issue_tokens(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = accounts::authenticate(&state.pool, &req.email, &req.password).await?;

    tracing::debug!(user_id = user.id, "User logged in");
    Ok(Json(issue_tokens(&state, user).await?))
}

pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    verify_refresh_token(&req.refresh_token, &state.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let token_hash = hash_token(&req.refresh_token);
    let (_token_id, user_id, expires_at) = db_users::find_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    // 한 번 쓴 refresh 토큰은 결과와 상관없이 폐기
    db_users::delete_refresh_token(&state.pool, &token_hash).await?;

    let expires = chrono::NaiveDateTime::parse_from_str(&expires_at, EXPIRES_AT_FORMAT)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    Ok(Json(issue_tokens(&state, user).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}

/// `PATCH /auth/me`: 이름과 비밀번호만 바꿀 수 있습니다. 이메일은 고정입니다.
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ApiJson(req): ApiJson<UpdateMeRequest>,
) -> Result<Json<UserResponse>, AppError> {
    if let Some(password) = &req.password {
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AppError::field(
                "password",
                format!("Ensure this field has at least {PASSWORD_MIN_LEN} characters."),
            ));
        }
    }

    let user = db_users::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(name) = &req.name {
        db_users::update_name(&state.pool, user.id, name.trim()).await?;
    }
    if let Some(password) = &req.password {
        let password_hash = accounts::hash_password(password)?;
        db_users::update_password_hash(&state.pool, user.id, &password_hash).await?;
    }

    let user = db_users::find_by_id(&state.pool, user.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: Option<&str>, password: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: email.map(String::from),
            password: password.map(String::from),
            name: None,
        }
    }

    #[test]
    fn registration_collects_every_bad_field() {
        let err = validate_registration(&request(Some("nope"), Some("pw"))).unwrap_err();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert!(fields.get("email").is_some());
        assert!(fields.get("password").is_some());
    }

    #[test]
    fn registration_accepts_valid_input() {
        assert!(validate_registration(&request(Some("test@example.com"), Some("testpass123"))).is_ok());
        assert!(validate_registration(&request(None, Some("testpass123"))).is_err());
    }
}
