use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 재료 목록을 이름순으로 조회합니다.
///
/// `name_prefix`가 있으면 대소문자를 무시한 접두사 검색을 합니다.
/// 입력의 `%`, `_`는 LIKE 와일드카드로 해석되지 않도록 이스케이프합니다.
pub async fn list_ingredients(
    pool: &SqlitePool,
    name_prefix: Option<&str>,
) -> Result<Vec<Ingredient>, AppError> {
    let prefix = name_prefix.filter(|p| !p.is_empty());

    // SQLite LIKE는 ASCII만 대소문자를 무시합니다. 비ASCII 접두사는 Rust에서 거릅니다.
    if let Some(prefix) = prefix.filter(|p| p.is_ascii()) {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE name LIKE ? ESCAPE '\'
            ORDER BY name
            "#,
        )
        .bind(format!("{}%", escape_like(prefix)))
        .fetch_all(pool)
        .await?;

        return Ok(ingredients);
    }

    let ingredients = sqlx::query_as::<_, Ingredient>(
        "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(match prefix {
        Some(prefix) => {
            let lowered = prefix.to_lowercase();
            ingredients
                .into_iter()
                .filter(|i| i.name.to_lowercase().starts_with(&lowered))
                .collect()
        }
        None => ingredients,
    })
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub async fn get_ingredient(pool: &SqlitePool, id: i64) -> Result<Option<Ingredient>, AppError> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(ingredient)
}

pub async fn create_ingredient(
    pool: &SqlitePool,
    req: &IngredientRequest,
) -> Result<Ingredient, AppError> {
    let result = sqlx::query("INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?)")
        .bind(&req.name)
        .bind(&req.measurement_unit)
        .execute(pool)
        .await?;

    get_ingredient(pool, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created ingredient".to_string()))
}

/// 이미 같은 (이름, 단위)가 있으면 아무것도 하지 않습니다. 새로 추가되면 true.
pub async fn insert_ingredient_if_missing(
    pool: &SqlitePool,
    req: &IngredientRequest,
) -> Result<bool, AppError> {
    let result =
        sqlx::query("INSERT OR IGNORE INTO ingredients (name, measurement_unit) VALUES (?, ?)")
            .bind(&req.name)
            .bind(&req.measurement_unit)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_ingredient(
    pool: &SqlitePool,
    id: i64,
    req: &UpdateIngredientRequest,
) -> Result<Option<Ingredient>, AppError> {
    if get_ingredient(pool, id).await?.is_none() {
        return Ok(None);
    }

    sqlx::query(
        r#"
        UPDATE ingredients
        SET name = COALESCE(?, name),
            measurement_unit = COALESCE(?, measurement_unit)
        WHERE id = ?
        "#,
    )
    .bind(&req.name)
    .bind(&req.measurement_unit)
    .bind(id)
    .execute(pool)
    .await?;

    get_ingredient(pool, id).await
}

pub async fn delete_ingredient(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM ingredients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
