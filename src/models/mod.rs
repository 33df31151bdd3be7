//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `catalog`: 태그(Tag)와 재료(Ingredient): 같은 모양의 "카탈로그 항목"
//! - `recipe`: 레시피(Recipe)와 요약/상세/이미지 응답 표현
//! - `user`: 사용자(User)와 인증 요청/응답 구조체
//!
//! `pub use X::*;`로 재공개하므로 `crate::models::Tag`처럼 짧게 접근할 수 있습니다.

pub mod catalog;
pub mod recipe;
pub mod user;

pub use catalog::*;
pub use recipe::*;
pub use user::*;
