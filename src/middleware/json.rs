use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json`과 같지만, 파싱 실패 시 `AppError`(400 JSON 에러)로 거절합니다.
///
/// 문법 오류, Content-Type 누락, 타입 불일치 모두 `{"error": {...}}` 형식의 400이 됩니다.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
