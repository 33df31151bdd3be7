//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 서비스(services/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `catalog`: 태그/재료 CRUD (제네릭) 및 레시피 관계 쿼리
//! - `recipes`: 레시피 CRUD, 필터링, 이미지 경로 기록
//! - `users`: 사용자 및 refresh 토큰 쿼리

pub mod catalog;
pub mod recipes;
pub mod users;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// SQLite 연결 풀을 만듭니다.
///
/// `create_if_missing`: 파일 DB가 없으면 새로 만듭니다.
/// `foreign_keys`: `ON DELETE CASCADE`가 동작하려면 켜져 있어야 합니다.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// `./migrations`의 SQL 파일을 컴파일 타임에 포함시켜 순서대로 실행합니다.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
