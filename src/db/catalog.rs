//! # 카탈로그(태그/재료) 데이터베이스 쿼리 모듈
//!
//! 태그와 재료는 테이블 이름만 다르고 쿼리 모양이 같으므로,
//! 모든 함수가 `T: CatalogItem`에 대해 제네릭입니다.
//! 호출 예: `db::catalog::list_items::<Tag>(&pool, user_id, false)`
//!
//! ## 소유자 범위(owner scope)
//! 목록/조회/수정/삭제 쿼리에는 항상 `WHERE user_id = ?`가 붙습니다.
//! 다른 사용자의 항목은 "존재하지 않는 것"처럼 보입니다 (`None` / `false`).
//!
//! 예외: `find_missing_ids`는 레시피에 연결할 id가 **전체 카탈로그**에
//! 존재하는지만 확인합니다 (소유자를 따지지 않음).

use crate::error::AppError;
use crate::models::CatalogItem;
use sqlx::{SqliteConnection, SqlitePool};

/// 소유자의 항목 목록을 이름 내림차순으로 조회합니다.
///
/// `assigned_only`가 참이면 하나 이상의 레시피에 연결된 항목만 반환합니다.
/// JOIN 대신 `EXISTS` 서브쿼리를 쓰므로 여러 레시피에 연결되어도 중복되지 않습니다.
pub async fn list_items<T: CatalogItem>(
    pool: &SqlitePool,
    user_id: i64,
    assigned_only: bool,
) -> Result<Vec<T>, AppError> {
    let mut sql = format!("SELECT id, user_id, name FROM {} t WHERE t.user_id = ?", T::TABLE);
    if assigned_only {
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM {} l WHERE l.{} = t.id)",
            T::LINK_TABLE,
            T::LINK_COLUMN
        ));
    }
    sql.push_str(" ORDER BY t.name DESC, t.id DESC");

    let items = sqlx::query_as::<_, T>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(items)
}

/// 소유자의 항목 하나를 조회합니다. 다른 사용자의 항목이면 `None`입니다.
pub async fn get_item<T: CatalogItem>(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
) -> Result<Option<T>, AppError> {
    let item = sqlx::query_as::<_, T>(&format!(
        "SELECT id, user_id, name FROM {} WHERE id = ? AND user_id = ?",
        T::TABLE
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(item)
}

pub async fn create_item<T: CatalogItem>(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
) -> Result<T, AppError> {
    let id = sqlx::query(&format!("INSERT INTO {} (user_id, name) VALUES (?, ?)", T::TABLE))
        .bind(user_id)
        .bind(name)
        .execute(pool)
        .await?
        .last_insert_rowid();

    get_item(pool, user_id, id)
        .await?
        .ok_or(AppError::Internal(format!("Failed to retrieve created {}", T::LABEL)))
}

/// 이름을 변경합니다.
///
/// ## 반환값
/// - `Ok(Some(T))`: 변경 성공
/// - `Ok(None)`: 해당 id가 없거나 다른 사용자의 항목
pub async fn rename_item<T: CatalogItem>(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    name: &str,
) -> Result<Option<T>, AppError> {
    let result = sqlx::query(&format!(
        "UPDATE {} SET name = ? WHERE id = ? AND user_id = ?",
        T::TABLE
    ))
    .bind(name)
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_item(pool, user_id, id).await
}

/// 항목을 삭제합니다. 관계 테이블의 행은 `ON DELETE CASCADE`로 함께 지워집니다.
pub async fn delete_item<T: CatalogItem>(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
) -> Result<bool, AppError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ? AND user_id = ?", T::TABLE))
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 레시피에 연결된 항목들을 객체로 조회합니다 (상세 응답용).
pub async fn items_for_recipe<T: CatalogItem>(
    pool: &SqlitePool,
    recipe_id: i64,
) -> Result<Vec<T>, AppError> {
    let items = sqlx::query_as::<_, T>(&format!(
        r#"
        SELECT t.id, t.user_id, t.name
        FROM {table} t
        JOIN {link} l ON l.{column} = t.id
        WHERE l.recipe_id = ?
        ORDER BY t.id
        "#,
        table = T::TABLE,
        link = T::LINK_TABLE,
        column = T::LINK_COLUMN,
    ))
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// 레시피에 연결된 항목 id만 조회합니다 (요약 응답용).
pub async fn ids_for_recipe<T: CatalogItem>(
    pool: &SqlitePool,
    recipe_id: i64,
) -> Result<Vec<i64>, AppError> {
    let rows: Vec<(i64,)> = sqlx::query_as(&format!(
        "SELECT {} FROM {} WHERE recipe_id = ? ORDER BY {}",
        T::LINK_COLUMN,
        T::LINK_TABLE,
        T::LINK_COLUMN
    ))
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// 주어진 id 중 카탈로그에 존재하지 않는 것들을 반환합니다.
///
/// TODO: 소유자 범위를 적용할지 결정되면 `user_id` 조건을 추가합니다.
/// 지금은 다른 사용자의 태그/재료 id도 통과합니다.
pub async fn find_missing_ids<T: CatalogItem>(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<Vec<i64>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT id FROM {} WHERE id IN ({placeholders})", T::TABLE);
    let mut query = sqlx::query_as::<_, (i64,)>(&sql);
    for id in ids {
        query = query.bind(*id);
    }
    let found: Vec<i64> = query
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|(id,)| id)
        .collect();

    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}

/// 레시피의 관계를 주어진 id 목록으로 통째로 교체합니다.
///
/// 트랜잭션 안에서 호출되어야 합니다 (`&mut *tx`).
pub async fn replace_links<T: CatalogItem>(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    ids: &[i64],
) -> Result<(), AppError> {
    sqlx::query(&format!("DELETE FROM {} WHERE recipe_id = ?", T::LINK_TABLE))
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    let insert = format!(
        "INSERT OR IGNORE INTO {} (recipe_id, {}) VALUES (?, ?)",
        T::LINK_TABLE,
        T::LINK_COLUMN
    );
    for id in ids {
        sqlx::query(&insert)
            .bind(recipe_id)
            .bind(*id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}
