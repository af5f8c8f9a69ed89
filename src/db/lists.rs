//! # 즐겨찾기 / 장바구니 쿼리 모듈
//!
//! 두 목록은 (사용자, 레시피) 쌍 하나로 이루어진 같은 모양의 테이블이라
//! `RecipeList`로 테이블을 고르고 나머지 쿼리는 공유합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeList {
    Favorites,
    ShoppingCart,
}

impl RecipeList {
    fn table(self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "cart_entries",
        }
    }

    /// 에러 메시지에 쓰는 목록 이름
    pub fn label(self) -> &'static str {
        match self {
            RecipeList::Favorites => "favorites",
            RecipeList::ShoppingCart => "shopping cart",
        }
    }
}

pub async fn contains(
    pool: &SqlitePool,
    list: RecipeList,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool, AppError> {
    let (exists,): (i64,) = sqlx::query_as(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = ? AND recipe_id = ?)",
        list.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_one(pool)
    .await?;

    Ok(exists != 0)
}

/// 목록에 레시피를 추가합니다.
///
/// 이미 있으면 `Conflict`. 확인과 INSERT 사이에 다른 요청이 먼저 넣은 경우도
/// UNIQUE 위반을 같은 `Conflict`로 바꿔 돌려줍니다.
pub async fn add(
    pool: &SqlitePool,
    list: RecipeList,
    user_id: i64,
    recipe_id: i64,
) -> Result<(), AppError> {
    let already = || AppError::Conflict(format!("Recipe is already in {}", list.label()));

    if contains(pool, list, user_id, recipe_id).await? {
        return Err(already());
    }

    let result = sqlx::query(&format!(
        "INSERT INTO {} (user_id, recipe_id) VALUES (?, ?)",
        list.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await;

    match result.map_err(AppError::from) {
        Ok(_) => Ok(()),
        Err(e) if e.is_unique_violation() => Err(already()),
        Err(e) => Err(e),
    }
}

/// 목록에서 레시피를 뺍니다. 실제로 지운 행이 있으면 true.
pub async fn remove(
    pool: &SqlitePool,
    list: RecipeList,
    user_id: i64,
    recipe_id: i64,
) -> Result<bool, AppError> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = ? AND recipe_id = ?",
        list.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// 장바구니에 담긴 모든 레시피의 재료를 (이름, 단위)별로 합산합니다.
///
/// ```sql
/// cart_entries → recipe_ingredients → ingredients
///   GROUP BY name, measurement_unit
/// ```
///
/// 같은 재료라도 단위가 다르면 별도의 줄이 됩니다.
pub async fn shopping_list(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ShoppingListItem>, AppError> {
    let items = sqlx::query_as::<_, ShoppingListItem>(
        r#"
        SELECT i.name, i.measurement_unit, SUM(ri.amount) AS total_amount
        FROM cart_entries c
        JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE c.user_id = ?
        GROUP BY i.name, i.measurement_unit
        ORDER BY i.name, i.measurement_unit
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}
