//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 회원가입, 로그인, 토큰 갱신, 로그아웃, 내 정보
//! - `catalog`: 태그/재료 CRUD (하나의 제네릭 구현)
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `recipes`: 레시피 CRUD, 필터링, 이미지 업로드

pub mod auth;
pub mod catalog;
pub mod health;
pub mod recipes;

pub use health::*;

use sqlx::SqlitePool;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `SqlitePool`은 내부적으로 Arc를 사용하므로 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// 업로드 이미지 저장 루트 디렉토리
    pub media_root: String,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
}
