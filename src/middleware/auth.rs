use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::routes::AppState;

pub const ACCESS_TOKEN_MINUTES: i64 = 15;
pub const REFRESH_TOKEN_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
    /// 같은 초에 발급된 토큰끼리도 값이 겹치지 않게 합니다 (refresh 토큰 해시는 UNIQUE).
    pub jti: String,
    /// 토큰 종류. `AuthUser`는 access만, `/auth/refresh`는 refresh만 받습니다.
    pub typ: TokenKind,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// 인증된 요청자. 핸들러 인자에 두면 토큰 검증이 핸들러 실행 전에 끝납니다.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_access_token(token, &state.jwt_secret)?;
        let user_id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser { user_id })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authentication credentials were not provided",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authorization token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "expired_token",
                "Authorization token has expired",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn create_token(
    user_id: i64,
    secret: &str,
    kind: TokenKind,
    lifetime: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
        jti: uuid::Uuid::new_v4().to_string(),
        typ: kind,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn create_access_token(
    user_id: i64,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(user_id, secret, TokenKind::Access, Duration::minutes(ACCESS_TOKEN_MINUTES))
}

pub fn create_refresh_token(
    user_id: i64,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(user_id, secret, TokenKind::Refresh, Duration::days(REFRESH_TOKEN_DAYS))
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    verify_token(token, secret, TokenKind::Access)
}

pub fn verify_refresh_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    verify_token(token, secret, TokenKind::Refresh)
}

/// 서명과 만료를 확인한 뒤, 토큰 종류가 `kind`와 다르면 `InvalidToken`입니다.
fn verify_token(token: &str, secret: &str, kind: TokenKind) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.typ != kind {
        return Err(AuthError::InvalidToken);
    }
    Ok(token_data.claims)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips_user_id() {
        let token = create_access_token(42, "secret").unwrap();
        let claims = verify_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "42");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_access_token(42, "secret").unwrap();
        assert!(matches!(
            verify_access_token(&token, "other"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_kinds_are_not_interchangeable() {
        let access = create_access_token(42, "secret").unwrap();
        let refresh = create_refresh_token(42, "secret").unwrap();

        assert!(matches!(
            verify_access_token(&refresh, "secret"),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            verify_refresh_token(&access, "secret"),
            Err(AuthError::InvalidToken)
        ));
        assert_eq!(verify_refresh_token(&refresh, "secret").unwrap().typ, TokenKind::Refresh);
    }

    #[test]
    fn tokens_issued_together_differ() {
        let first = create_refresh_token(42, "secret").unwrap();
        let second = create_refresh_token(42, "secret").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn token_hash_is_hex_sha256() {
        assert_eq!(hash_token("abc").len(), 64);
        assert_eq!(hash_token("abc"), hash_token("abc"));
    }
}
