use serde::Serialize;

/// 쇼핑 리스트 한 줄: 같은 (이름, 단위)의 재료 수량 합계
#[derive(Debug, Clone, Serialize, sqlx::FromRow, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}
