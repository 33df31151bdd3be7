//! # 카탈로그 항목(태그/재료) 모델 정의
//!
//! 태그(Tag)와 재료(Ingredient)는 `{ id, name, 소유자 }`라는 같은 모양을 가지며,
//! 레시피와 다대다(N:M) 관계로 연결됩니다.
//!
//! 두 타입의 차이는 "어떤 테이블에 저장되는가"뿐이므로,
//! `CatalogItem` 트레이트로 테이블 이름을 상수로 노출하고
//! DB 쿼리(`db::catalog`)와 라우트 핸들러(`routes::catalog`)는
//! 이 트레이트에 대해 제네릭으로 한 번만 작성합니다.
//!
//! ```text
//! tags        ←── recipe_tags        ──→ recipes
//! ingredients ←── recipe_ingredients ──→ recipes
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;

use crate::error::FieldErrors;

/// 이름 필드의 최대 길이
pub const NAME_MAX_LEN: usize = 255;

/// 태그와 재료가 공유하는 저장소 정보
///
/// 연관 상수(associated const)는 SQL 문자열 조립에만 쓰이며,
/// 사용자 입력이 아니므로 `format!`으로 SQL에 넣어도 안전합니다.
/// 값(이름, id 등)은 항상 `.bind()`로 바인딩합니다.
pub trait CatalogItem:
    for<'r> sqlx::FromRow<'r, SqliteRow> + Serialize + fmt::Display + Send + Unpin + 'static
{
    /// 엔티티 테이블 (예: "tags")
    const TABLE: &'static str;
    /// 레시피와의 관계 테이블 (예: "recipe_tags")
    const LINK_TABLE: &'static str;
    /// 관계 테이블에서 이 엔티티를 가리키는 컬럼 (예: "tag_id")
    const LINK_COLUMN: &'static str;
    /// 로그/에러 메시지용 단수 이름 (예: "tag")
    const LABEL: &'static str;
}

/// 태그 엔티티: DB의 `tags` 테이블 한 행(row)에 대응합니다.
///
/// `user_id`는 응답에 노출하지 않습니다 (`skip_serializing`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub name: String,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl CatalogItem for Tag {
    const TABLE: &'static str = "tags";
    const LINK_TABLE: &'static str = "recipe_tags";
    const LINK_COLUMN: &'static str = "tag_id";
    const LABEL: &'static str = "tag";
}

/// 재료 엔티티: DB의 `ingredients` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub name: String,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl CatalogItem for Ingredient {
    const TABLE: &'static str = "ingredients";
    const LINK_TABLE: &'static str = "recipe_ingredients";
    const LINK_COLUMN: &'static str = "ingredient_id";
    const LABEL: &'static str = "ingredient";
}

/// 태그/재료 생성·수정 요청 본문: `{ "name": "..." }`
///
/// 필드가 빠지면 serde 에러가 아니라 `{"name": ["This field is required."]}` 필드 에러가 됩니다.
#[derive(Debug, Deserialize)]
pub struct CatalogItemRequest {
    pub name: Option<String>,
}

impl CatalogItemRequest {
    /// 검증을 통과하면 앞뒤 공백을 제거한 이름을 반환합니다.
    pub fn validate(&self) -> Result<String, crate::error::AppError> {
        let mut errors = FieldErrors::new();
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();

        match &self.name {
            None => errors.add("name", "This field is required."),
            Some(_) if name.is_empty() => errors.add("name", "This field may not be blank."),
            Some(_) if name.chars().count() > NAME_MAX_LEN => errors.add(
                "name",
                format!("Ensure this field has no more than {NAME_MAX_LEN} characters."),
            ),
            Some(_) => {}
        }

        errors.into_result()?;
        Ok(name.to_string())
    }
}

/// 목록 조회 쿼리 파라미터: `GET /tags?assigned_only=1`
#[derive(Debug, Default, Deserialize)]
pub struct CatalogListQuery {
    pub assigned_only: Option<String>,
}

impl CatalogListQuery {
    /// `assigned_only`가 참으로 해석되는지 여부
    ///
    /// `1`, `true`, `yes`, `on`(대소문자 무시)과 0이 아닌 정수를 참으로 봅니다.
    /// 그 밖의 값이나 누락은 거짓입니다.
    pub fn assigned_only(&self) -> bool {
        let Some(raw) = self.assigned_only.as_deref().map(str::trim) else {
            return false;
        };
        if let Ok(n) = raw.parse::<i64>() {
            return n != 0;
        }
        matches!(raw.to_ascii_lowercase().as_str(), "true" | "yes" | "on")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(raw: Option<&str>) -> CatalogListQuery {
        CatalogListQuery {
            assigned_only: raw.map(str::to_string),
        }
    }

    #[test]
    fn display_is_name() {
        let tag = Tag { id: 1, user_id: 1, name: "Vegan".into() };
        let ingredient = Ingredient { id: 1, user_id: 1, name: "Cucumber".into() };

        assert_eq!(tag.to_string(), "Vegan");
        assert_eq!(ingredient.to_string(), "Cucumber");
    }

    #[test]
    fn assigned_only_truthiness() {
        assert!(query(Some("1")).assigned_only());
        assert!(query(Some("TRUE")).assigned_only());
        assert!(query(Some("2")).assigned_only());
        assert!(!query(Some("0")).assigned_only());
        assert!(!query(Some("nope")).assigned_only());
        assert!(!query(None).assigned_only());
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = CatalogItemRequest { name: Some("   ".into()) }.validate().unwrap_err();
        match err {
            crate::error::AppError::Validation(fields) => {
                assert_eq!(fields.get("name").unwrap(), ["This field may not be blank."]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn name_is_trimmed() {
        let name = CatalogItemRequest { name: Some("  Dessert ".into()) }.validate().unwrap();
        assert_eq!(name, "Dessert");
    }
}
