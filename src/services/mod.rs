//! # 서비스(비즈니스 로직) 모듈
//!
//! - `accounts`: 사용자 생성 규칙, 비밀번호 해싱/검증, 로그인 확인
//! - `images`: 레시피 이미지 검증, 저장 경로 생성, 파일 저장/삭제

pub mod accounts;
pub mod images;
