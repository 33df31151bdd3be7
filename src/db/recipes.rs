//! # 레시피 데이터베이스 쿼리 모듈
//!
//! 모든 조회/수정/삭제는 `user_id`로 범위가 제한됩니다.
//! 레시피 행과 관계 테이블(`recipe_tags`, `recipe_ingredients`)을 함께 바꾸는
//! 생성/수정은 하나의 트랜잭션 안에서 실행됩니다.

use crate::db::catalog;
use crate::error::{AppError, FieldErrors};
use crate::models::*;
use sqlx::{SqliteConnection, SqlitePool};

const RECIPE_COLUMNS: &str = "id, user_id, title, time_minutes, price, link, image";

/// 소유자의 레시피를 최신순(id 내림차순)으로 조회합니다.
///
/// 필터 규칙:
/// - 한 필터 안의 id들은 OR (`tags=1,2` → 태그 1 또는 2가 붙은 레시피)
/// - 두 필터를 함께 주면 AND
///
/// `IN (SELECT ...)` 서브쿼리를 쓰므로 여러 태그에 걸려도 레시피가 중복되지 않습니다.
pub async fn list_recipes(
    pool: &SqlitePool,
    user_id: i64,
    filter: &RecipeFilter,
) -> Result<Vec<Recipe>, AppError> {
    let mut sql = format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE user_id = ?");
    let mut bindings: Vec<i64> = vec![user_id];

    if !filter.tags.is_empty() {
        sql.push_str(&format!(
            " AND id IN (SELECT recipe_id FROM recipe_tags WHERE tag_id IN ({}))",
            placeholders(filter.tags.len())
        ));
        bindings.extend(&filter.tags);
    }

    if !filter.ingredients.is_empty() {
        sql.push_str(&format!(
            " AND id IN (SELECT recipe_id FROM recipe_ingredients WHERE ingredient_id IN ({}))",
            placeholders(filter.ingredients.len())
        ));
        bindings.extend(&filter.ingredients);
    }

    sql.push_str(" ORDER BY id DESC");

    let mut query = sqlx::query_as::<_, Recipe>(&sql);
    for binding in bindings {
        query = query.bind(binding);
    }

    Ok(query.fetch_all(pool).await?)
}

pub async fn get_recipe(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
) -> Result<Option<Recipe>, AppError> {
    let recipe = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(recipe)
}

pub async fn create_recipe(
    pool: &SqlitePool,
    user_id: i64,
    fields: &RecipeFields,
) -> Result<Recipe, AppError> {
    let mut tx = pool.begin().await?;

    check_links(&mut tx, fields).await?;

    let id = sqlx::query(
        r#"
        INSERT INTO recipes (user_id, title, time_minutes, price, link)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&fields.title)
    .bind(fields.time_minutes)
    .bind(&fields.price)
    .bind(&fields.link)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    // 생성 시 tags/ingredients가 빠졌으면 빈 관계로 시작합니다.
    let tags = fields.tags.as_deref().unwrap_or_default();
    let ingredients = fields.ingredients.as_deref().unwrap_or_default();
    catalog::replace_links::<Tag>(&mut tx, id, tags).await?;
    catalog::replace_links::<Ingredient>(&mut tx, id, ingredients).await?;

    tx.commit().await?;

    get_recipe(pool, user_id, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created recipe".to_string()))
}

/// 레시피를 수정합니다.
///
/// `fields.tags`/`fields.ingredients`가 `None`이면 해당 관계는 그대로 둡니다.
///
/// ## 반환값
/// - `Ok(Some(Recipe))`: 수정 성공
/// - `Ok(None)`: 해당 id가 없거나 다른 사용자의 레시피
pub async fn update_recipe(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    fields: &RecipeFields,
) -> Result<Option<Recipe>, AppError> {
    let mut tx = pool.begin().await?;

    check_links(&mut tx, fields).await?;

    let result = sqlx::query(
        r#"
        UPDATE recipes
        SET title = ?, time_minutes = ?, price = ?, link = ?
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(&fields.title)
    .bind(fields.time_minutes)
    .bind(&fields.price)
    .bind(&fields.link)
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        // 트랜잭션은 drop 시 자동으로 롤백됩니다.
        return Ok(None);
    }

    if let Some(tags) = &fields.tags {
        catalog::replace_links::<Tag>(&mut tx, id, tags).await?;
    }
    if let Some(ingredients) = &fields.ingredients {
        catalog::replace_links::<Ingredient>(&mut tx, id, ingredients).await?;
    }

    tx.commit().await?;

    get_recipe(pool, user_id, id).await
}

pub async fn delete_recipe(pool: &SqlitePool, user_id: i64, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 레시피의 이미지 경로를 기록합니다.
pub async fn set_image(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    image: &str,
) -> Result<Option<Recipe>, AppError> {
    let result = sqlx::query("UPDATE recipes SET image = ? WHERE id = ? AND user_id = ?")
        .bind(image)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_recipe(pool, user_id, id).await
}

/// 요약 표현: 태그/재료를 id 배열로
pub async fn summarize(pool: &SqlitePool, recipe: Recipe) -> Result<RecipeSummary, AppError> {
    let tags = catalog::ids_for_recipe::<Tag>(pool, recipe.id).await?;
    let ingredients = catalog::ids_for_recipe::<Ingredient>(pool, recipe.id).await?;
    Ok(RecipeSummary::new(recipe, tags, ingredients))
}

/// 상세 표현: 태그/재료를 객체로 중첩
pub async fn detail(pool: &SqlitePool, recipe: Recipe) -> Result<RecipeDetail, AppError> {
    let tags = catalog::items_for_recipe::<Tag>(pool, recipe.id).await?;
    let ingredients = catalog::items_for_recipe::<Ingredient>(pool, recipe.id).await?;
    Ok(RecipeDetail::new(recipe, tags, ingredients))
}

/// 연결하려는 태그/재료 id가 모두 존재하는지 확인합니다.
async fn check_links(conn: &mut SqliteConnection, fields: &RecipeFields) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    if let Some(tags) = &fields.tags {
        for id in catalog::find_missing_ids::<Tag>(conn, tags).await? {
            errors.add("tags", format!("Invalid pk \"{id}\" - object does not exist."));
        }
    }
    if let Some(ingredients) = &fields.ingredients {
        for id in catalog::find_missing_ids::<Ingredient>(conn, ingredients).await? {
            errors.add("ingredients", format!("Invalid pk \"{id}\" - object does not exist."));
        }
    }

    errors.into_result()
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
