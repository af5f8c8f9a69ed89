use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// 재료 생성/전체 교체 요청 (관리자 전용)
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientRequest {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateIngredientRequest {
    pub name: Option<String>,
    pub measurement_unit: Option<String>,
}

/// `GET /api/ingredients/?name=...` 쿼리
#[derive(Debug, Default, Deserialize)]
pub struct IngredientQuery {
    /// 이름 접두사 (대소문자 무시)
    pub name: Option<String>,
}
