//! # 레시피 모델 정의
//!
//! ## 구조체 역할
//! - `Recipe`: DB의 `recipes` 테이블 한 행
//! - `RecipeSummary`: 목록/생성/수정 응답: 태그·재료를 id 배열로 표현
//! - `RecipeDetail`: 단건 조회 응답: 태그·재료를 `{id, name}` 객체로 중첩
//! - `RecipeImage`: 이미지 업로드 응답: `{id, image}`만 노출
//! - `RecipeRequest`: 생성(POST)/전체 수정(PUT)/부분 수정(PATCH) 요청 본문
//! - `RecipeFilter`: 목록 조회 쿼리 파라미터 (`?tags=1,2&ingredients=3`)

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, FieldErrors};
use crate::models::catalog::{Ingredient, Tag, NAME_MAX_LEN};

/// 업로드된 미디어 파일이 공개되는 URL 접두사
pub const MEDIA_URL: &str = "/media";

/// 가격의 정수부 최대 자릿수 (전체 5자리 중 소수 2자리를 뺀 값)
const PRICE_MAX_WHOLE_DIGITS: u32 = 3;
const PRICE_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub time_minutes: i64,
    /// 소수 둘째 자리까지 정규화된 문자열 ("5.00")
    pub price: String,
    pub link: String,
    /// 미디어 루트 기준 상대 경로 (예: "uploads/recipe/<uuid>.jpg")
    pub image: Option<String>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

impl Recipe {
    /// 저장된 상대 경로를 공개 URL로 바꿉니다.
    pub fn image_url(&self) -> Option<String> {
        self.image.as_deref().map(media_url)
    }
}

pub fn media_url(path: &str) -> String {
    format!("{MEDIA_URL}/{path}")
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<i64>,
    pub tags: Vec<i64>,
    pub time_minutes: i64,
    pub price: String,
    pub link: String,
}

impl RecipeSummary {
    pub fn new(recipe: Recipe, tags: Vec<i64>, ingredients: Vec<i64>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            ingredients,
            tags,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    pub tags: Vec<Tag>,
    pub time_minutes: i64,
    pub price: String,
    pub link: String,
    pub image: Option<String>,
}

impl RecipeDetail {
    pub fn new(recipe: Recipe, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        let image = recipe.image_url();
        Self {
            id: recipe.id,
            title: recipe.title,
            ingredients,
            tags,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            image,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeImage {
    pub id: i64,
    pub image: Option<String>,
}

impl From<&Recipe> for RecipeImage {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            image: recipe.image_url(),
        }
    }
}

/// 레시피 생성/수정 요청 본문
///
/// 모든 필드가 `Option`입니다. 필수 여부는 serde가 아니라
/// `validate_new`(POST/PUT)와 `validate_patch`(PATCH)가 판단합니다.
/// `tags`/`ingredients`가 `None`이면 기존 연결을 건드리지 않습니다.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i64>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

/// 검증을 통과한 레시피 필드. DB 계층은 이 타입만 받습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: String,
    pub time_minutes: i64,
    pub price: String,
    pub link: String,
    pub tags: Option<Vec<i64>>,
    pub ingredients: Option<Vec<i64>>,
}

impl RecipeRequest {
    /// POST/PUT용 검증: title, time_minutes, price는 필수입니다.
    pub fn validate_new(self) -> Result<RecipeFields, AppError> {
        let mut errors = FieldErrors::new();

        let title = match self.title {
            Some(title) => check_title(title, &mut errors),
            None => {
                errors.add("title", "This field is required.");
                String::new()
            }
        };
        let time_minutes = match self.time_minutes {
            Some(minutes) => check_minutes(minutes, &mut errors),
            None => {
                errors.add("time_minutes", "This field is required.");
                0
            }
        };
        let price = match self.price {
            Some(price) => check_price(price, &mut errors),
            None => {
                errors.add("price", "This field is required.");
                String::new()
            }
        };
        let link = check_link(self.link.unwrap_or_default(), &mut errors);

        errors.into_result()?;
        Ok(RecipeFields {
            title,
            time_minutes,
            price,
            link,
            tags: self.tags.map(dedup_ids),
            ingredients: self.ingredients.map(dedup_ids),
        })
    }

    /// PATCH용 검증: 보낸 필드만 검증하고, 빠진 필드는 `current` 값을 유지합니다.
    pub fn validate_patch(self, current: &Recipe) -> Result<RecipeFields, AppError> {
        let mut errors = FieldErrors::new();

        let title = match self.title {
            Some(title) => check_title(title, &mut errors),
            None => current.title.clone(),
        };
        let time_minutes = match self.time_minutes {
            Some(minutes) => check_minutes(minutes, &mut errors),
            None => current.time_minutes,
        };
        let price = match self.price {
            Some(price) => check_price(price, &mut errors),
            None => current.price.clone(),
        };
        let link = match self.link {
            Some(link) => check_link(link, &mut errors),
            None => current.link.clone(),
        };

        errors.into_result()?;
        Ok(RecipeFields {
            title,
            time_minutes,
            price,
            link,
            tags: self.tags.map(dedup_ids),
            ingredients: self.ingredients.map(dedup_ids),
        })
    }
}

fn check_title(title: String, errors: &mut FieldErrors) -> String {
    let title = title.trim().to_string();
    if title.is_empty() {
        errors.add("title", "This field may not be blank.");
    } else if title.chars().count() > NAME_MAX_LEN {
        errors.add(
            "title",
            format!("Ensure this field has no more than {NAME_MAX_LEN} characters."),
        );
    }
    title
}

fn check_minutes(minutes: i64, errors: &mut FieldErrors) -> i64 {
    if minutes < 0 {
        errors.add("time_minutes", "Ensure this value is greater than or equal to 0.");
    }
    minutes
}

fn check_link(link: String, errors: &mut FieldErrors) -> String {
    let link = link.trim().to_string();
    if link.chars().count() > NAME_MAX_LEN {
        errors.add(
            "link",
            format!("Ensure this field has no more than {NAME_MAX_LEN} characters."),
        );
    }
    link
}

fn check_price(price: Decimal, errors: &mut FieldErrors) -> String {
    match normalize_price(price) {
        Ok(normalized) => normalized,
        Err(message) => {
            errors.add("price", message);
            String::new()
        }
    }
}

/// 가격을 `max_digits=5, decimal_places=2` 규칙으로 검증하고 "5.00" 형태로 만듭니다.
pub fn normalize_price(price: Decimal) -> Result<String, String> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }

    let normalized = price.normalize();
    if normalized.scale() > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
        ));
    }
    if normalized.trunc() >= Decimal::from(10_i64.pow(PRICE_MAX_WHOLE_DIGITS)) {
        return Err(format!(
            "Ensure that there are no more than {PRICE_MAX_WHOLE_DIGITS} digits before the decimal point."
        ));
    }

    let mut fixed = normalized;
    fixed.rescale(PRICE_DECIMAL_PLACES);
    Ok(fixed.to_string())
}

/// 같은 id가 여러 번 와도 관계는 한 번만 저장합니다. 순서는 처음 등장 순서를 유지합니다.
fn dedup_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// 목록 필터: `GET /recipes?tags=1,2&ingredients=3`
#[derive(Debug, Default, Deserialize)]
pub struct RecipeFilterQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

/// 파싱이 끝난 필터. 빈 목록은 "필터 없음"과 같습니다.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

impl RecipeFilterQuery {
    pub fn parse(&self) -> Result<RecipeFilter, AppError> {
        let mut errors = FieldErrors::new();
        let tags = parse_id_list("tags", self.tags.as_deref(), &mut errors);
        let ingredients = parse_id_list("ingredients", self.ingredients.as_deref(), &mut errors);
        errors.into_result()?;
        Ok(RecipeFilter { tags, ingredients })
    }
}

/// "1,2, 3" → `[1, 2, 3]`. 빈 조각은 무시합니다.
fn parse_id_list(field: &str, raw: Option<&str>, errors: &mut FieldErrors) -> Vec<i64> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => errors.add(field, format!("\"{part}\" is not a valid id.")),
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn recipe() -> Recipe {
        Recipe {
            id: 7,
            user_id: 1,
            title: "Steak and mushroom sauce".into(),
            time_minutes: 5,
            price: "5.00".into(),
            link: String::new(),
            image: None,
        }
    }

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    #[test]
    fn display_is_title() {
        assert_eq!(recipe().to_string(), "Steak and mushroom sauce");
    }

    #[test]
    fn price_is_normalized_to_two_places() {
        assert_eq!(normalize_price(dec("5")).unwrap(), "5.00");
        assert_eq!(normalize_price(dec("12.5")).unwrap(), "12.50");
        assert_eq!(normalize_price(dec("999.99")).unwrap(), "999.99");
        assert_eq!(normalize_price(dec("4.500")).unwrap(), "4.50");
    }

    #[test]
    fn price_out_of_range_is_rejected() {
        assert!(normalize_price(dec("1000")).is_err());
        assert!(normalize_price(dec("1.234")).is_err());
        assert!(normalize_price(dec("-1")).is_err());
    }

    #[test]
    fn missing_required_fields_are_reported_together() {
        let err = RecipeRequest::default().validate_new().unwrap_err();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert!(fields.get("title").is_some());
        assert!(fields.get("time_minutes").is_some());
        assert!(fields.get("price").is_some());
        assert!(fields.get("link").is_none());
    }

    #[test]
    fn patch_keeps_unsent_fields() {
        let req = RecipeRequest {
            title: Some("Chicken tikka".into()),
            tags: Some(vec![3, 3, 1]),
            ..Default::default()
        };
        let fields = req.validate_patch(&recipe()).unwrap();

        assert_eq!(fields.title, "Chicken tikka");
        assert_eq!(fields.time_minutes, 5);
        assert_eq!(fields.price, "5.00");
        assert_eq!(fields.tags, Some(vec![3, 1]));
        assert_eq!(fields.ingredients, None);
    }

    #[test]
    fn filter_ids_are_parsed() {
        let query = RecipeFilterQuery {
            tags: Some("1, 2,".into()),
            ingredients: None,
        };
        assert_eq!(
            query.parse().unwrap(),
            RecipeFilter { tags: vec![1, 2], ingredients: vec![] }
        );
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let query = RecipeFilterQuery {
            tags: None,
            ingredients: Some("1,abc".into()),
        };
        assert!(query.parse().is_err());
    }

    #[test]
    fn image_url_is_under_media() {
        let mut r = recipe();
        r.image = Some("uploads/recipe/abc.png".into());
        assert_eq!(r.image_url().as_deref(), Some("/media/uploads/recipe/abc.png"));
    }
}
