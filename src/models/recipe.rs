//! # 레시피 모델 정의
//!
//! ## 구조체 역할
//! - `Recipe`: `recipes` 테이블 한 행
//! - `RecipeRead`: 상세/목록 응답. 태그, 작성자, 재료가 중첩된 전체 표현
//! - `RecipeShort`: 즐겨찾기/장바구니/구독 응답에 쓰이는 축약 표현
//! - `RecipeWriteRequest`: 생성(`POST`)과 수정(`PATCH`)에 공통으로 쓰는 요청 본문
//! - `RecipeQuery`: 목록 필터 쿼리

use super::{PageParams, Tag, UserProfile};
use crate::services::images::image_url;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    /// 미디어 디렉토리 기준 상대 경로 (예: "recipes/images/0190....png")
    pub image: String,
    pub created_at: String,
}

/// 레시피에 포함된 재료 한 줄 (재료 정보 + 수량)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct RecipeIngredientRead {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeRead {
    pub id: i64,
    pub tags: Vec<Tag>,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientRead>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    /// 이미지의 전체 URL (MEDIA_URL + 상대 경로)
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeShort {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

impl RecipeShort {
    pub fn new(recipe: Recipe, media_url: &str) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            image: image_url(media_url, &recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

/// 요청 본문의 `ingredients` 항목: `{ "id": 1, "amount": 10 }`
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: i64,
}

/// 레시피 생성/수정 요청
///
/// `image`는 `data:image/png;base64,...` 형식입니다.
/// 생성 시에는 필수이고, 수정 시 생략하면 기존 이미지를 유지합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeWriteRequest {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i64>,
    pub image: Option<String>,
    pub name: String,
    pub text: String,
    #[serde(default = "default_cooking_time")]
    pub cooking_time: i64,
}

fn default_cooking_time() -> i64 {
    1
}

/// 검증을 마친 레시피 입력. DB 계층은 이 타입만 받습니다.
#[derive(Debug, Clone)]
pub struct RecipeInput {
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i64>,
}

/// `GET /api/recipes/` 필터 쿼리
///
/// `tags`는 `?tags=breakfast&tags=lunch`처럼 여러 번 올 수 있어
/// axum-extra의 `Query`로 파싱합니다.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Option<i64>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl RecipeQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// 쿼리 문자열의 불리언 값을 해석합니다. "1", "true", "True"만 참입니다.
pub fn query_flag(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "True"))
}

/// DB 조회에 넘기는 레시피 목록 필터
#[derive(Debug, Default, Clone)]
pub struct RecipeFilter {
    pub tag_slugs: Vec<String>,
    pub author_id: Option<i64>,
    /// Some(user_id)이면 해당 사용자의 즐겨찾기만
    pub favorited_by: Option<i64>,
    /// Some(user_id)이면 해당 사용자의 장바구니만
    pub in_cart_of: Option<i64>,
}

impl RecipeFilter {
    /// 쿼리를 필터로 바꿉니다. 즐겨찾기/장바구니 필터는 로그인한 경우에만 적용됩니다.
    pub fn from_query(query: &RecipeQuery, viewer_id: Option<i64>) -> Self {
        Self {
            tag_slugs: query
                .tags
                .iter()
                .filter(|slug| !slug.is_empty())
                .cloned()
                .collect(),
            author_id: query.author,
            favorited_by: viewer_id.filter(|_| query_flag(query.is_favorited.as_deref())),
            in_cart_of: viewer_id.filter(|_| query_flag(query.is_in_shopping_cart.as_deref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_numeric_and_word_forms() {
        assert!(query_flag(Some("1")));
        assert!(query_flag(Some("true")));
        assert!(!query_flag(Some("0")));
        assert!(!query_flag(Some("false")));
        assert!(!query_flag(None));
    }

    #[test]
    fn anonymous_viewer_ignores_personal_filters() {
        let query = RecipeQuery {
            tags: vec!["lunch".into(), String::new()],
            is_favorited: Some("1".into()),
            is_in_shopping_cart: Some("1".into()),
            ..Default::default()
        };

        let anonymous = RecipeFilter::from_query(&query, None);
        assert_eq!(anonymous.tag_slugs, vec!["lunch".to_string()]);
        assert_eq!(anonymous.favorited_by, None);
        assert_eq!(anonymous.in_cart_of, None);

        let signed_in = RecipeFilter::from_query(&query, Some(7));
        assert_eq!(signed_in.favorited_by, Some(7));
        assert_eq!(signed_in.in_cart_of, Some(7));
    }
}
