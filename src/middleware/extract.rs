//! 경로/쿼리 추출자. 파싱 실패가 `{"error": {...}}` 형식의 400이 됩니다.

use axum::extract::FromRequestParts;

use crate::error::AppError;

/// `axum::extract::Path`와 같지만 rejection이 `AppError`입니다.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// `axum::extract::Query`와 같지만 rejection이 `AppError`입니다.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
