//! # 미들웨어/추출자 모듈
//!
//! - `auth`: JWT 발급·검증과 `AuthUser` 추출자
//! - `extract`: 에러 형식을 통일한 경로/쿼리 추출자 `ApiPath`, `ApiQuery`
//! - `json`: 에러 형식을 통일한 JSON 본문 추출자 `ApiJson`

pub mod auth;
pub mod extract;
pub mod json;
