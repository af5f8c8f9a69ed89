//! # 레시피 데이터베이스 쿼리 모듈
//!
//! 레시피 조회/필터링과, 레시피 + 재료/태그 관계를 한 트랜잭션으로 쓰는 함수들입니다.
//!
//! ## 쓰기 경로
//! 1. 알 수 없는 재료/태그 ID 확인
//! 2. (작성자, 이름) 중복 확인
//! 3. `recipes` 행 INSERT 또는 UPDATE
//! 4. 기존 `recipe_ingredients`, `recipe_tags` 삭제 후 요청 순서대로 다시 INSERT
//!
//! 중간에 하나라도 실패하면 트랜잭션이 롤백되어 아무 행도 남지 않습니다.

use crate::error::{AppError, ValidationErrors};
use crate::models::*;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashSet;

const DUPLICATE_NAME: &str = "You already have a recipe with this name";

const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.text, r.cooking_time, r.image, r.created_at";

/// 필터 조건을 `WHERE 1 = 1` 뒤에 이어 붙입니다.
///
/// - 태그: 주어진 slug 중 하나라도 달려 있으면 포함 (OR)
/// - 즐겨찾기/장바구니: EXISTS 서브쿼리
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &RecipeFilter) {
    if !filter.tag_slugs.is_empty() {
        builder.push(
            " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = r.id AND t.slug IN (",
        );
        let mut slugs = builder.separated(", ");
        for slug in &filter.tag_slugs {
            slugs.push_bind(slug.clone());
        }
        slugs.push_unseparated("))");
    }

    if let Some(author_id) = filter.author_id {
        builder.push(" AND r.author_id = ").push_bind(author_id);
    }

    if let Some(user_id) = filter.favorited_by {
        builder
            .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
            .push_bind(user_id)
            .push(")");
    }

    if let Some(user_id) = filter.in_cart_of {
        builder
            .push(" AND EXISTS (SELECT 1 FROM cart_entries c WHERE c.recipe_id = r.id AND c.user_id = ")
            .push_bind(user_id)
            .push(")");
    }
}

/// 필터에 맞는 레시피를 등록순(오래된 것 먼저)으로 조회합니다.
pub async fn list_recipes(
    pool: &SqlitePool,
    filter: &RecipeFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Recipe>, AppError> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM recipes r WHERE 1 = 1",
        RECIPE_COLUMNS
    ));
    push_filters(&mut builder, filter);
    builder
        .push(" ORDER BY r.created_at, r.id LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let recipes = builder.build_query_as::<Recipe>().fetch_all(pool).await?;
    Ok(recipes)
}

pub async fn count_recipes(pool: &SqlitePool, filter: &RecipeFilter) -> Result<i64, AppError> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM recipes r WHERE 1 = 1");
    push_filters(&mut builder, filter);

    let (count,): (i64,) = builder.build_query_as().fetch_one(pool).await?;
    Ok(count)
}

pub async fn get_recipe(pool: &SqlitePool, id: i64) -> Result<Option<Recipe>, AppError> {
    let recipe = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {} FROM recipes r WHERE r.id = ?",
        RECIPE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(recipe)
}

/// 레시피의 재료를 요청에 들어온 순서(관계 행 ID 순)대로 조회합니다.
pub async fn get_recipe_ingredients(
    pool: &SqlitePool,
    recipe_id: i64,
) -> Result<Vec<RecipeIngredientRead>, AppError> {
    let ingredients = sqlx::query_as::<_, RecipeIngredientRead>(
        r#"
        SELECT i.id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?
        ORDER BY ri.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(ingredients)
}

/// 작성자의 레시피 중 최신 `limit`개 (구독 응답용). `limit`이 None이면 전부.
pub async fn list_author_recipes(
    pool: &SqlitePool,
    author_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Recipe>, AppError> {
    // SQLite에서 LIMIT -1은 제한 없음입니다.
    let recipes = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {} FROM recipes r WHERE r.author_id = ? ORDER BY r.created_at DESC, r.id DESC LIMIT ?",
        RECIPE_COLUMNS
    ))
    .bind(author_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

pub async fn count_author_recipes(pool: &SqlitePool, author_id: i64) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// 새 레시피와 재료/태그 관계를 하나의 트랜잭션으로 저장합니다.
///
/// `image`는 이미 디스크에 저장된 파일의 상대 경로입니다.
pub async fn create_recipe(
    pool: &SqlitePool,
    author_id: i64,
    input: &RecipeInput,
    image: &str,
) -> Result<Recipe, AppError> {
    let mut tx = pool.begin().await?;

    check_references(&mut tx, input).await?;
    check_name_available(&mut tx, author_id, &input.name, None).await?;

    let result = sqlx::query(
        r#"
        INSERT INTO recipes (author_id, name, text, cooking_time, image)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(author_id)
    .bind(&input.name)
    .bind(&input.text)
    .bind(input.cooking_time)
    .bind(image)
    .execute(&mut *tx)
    .await
    .map_err(name_conflict)?;

    let recipe_id = result.last_insert_rowid();
    insert_relations(&mut tx, recipe_id, input).await?;

    tx.commit().await?;

    get_recipe(pool, recipe_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created recipe".to_string()))
}

/// 레시피를 수정합니다. 재료/태그 관계는 요청 내용으로 통째로 교체됩니다.
///
/// `image`가 None이면 기존 이미지 경로를 유지합니다.
///
/// ## 반환값
/// - `Ok(Some(Recipe))`: 수정 성공
/// - `Ok(None)`: 해당 ID의 레시피가 존재하지 않음
pub async fn update_recipe(
    pool: &SqlitePool,
    recipe_id: i64,
    input: &RecipeInput,
    image: Option<&str>,
) -> Result<Option<Recipe>, AppError> {
    let mut tx = pool.begin().await?;

    let author_id: Option<(i64,)> = sqlx::query_as("SELECT author_id FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some((author_id,)) = author_id else {
        return Ok(None);
    };

    check_references(&mut tx, input).await?;
    check_name_available(&mut tx, author_id, &input.name, Some(recipe_id)).await?;

    sqlx::query(
        r#"
        UPDATE recipes
        SET name = ?, text = ?, cooking_time = ?, image = COALESCE(?, image)
        WHERE id = ?
        "#,
    )
    .bind(&input.name)
    .bind(&input.text)
    .bind(input.cooking_time)
    .bind(image)
    .bind(recipe_id)
    .execute(&mut *tx)
    .await
    .map_err(name_conflict)?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;
    insert_relations(&mut tx, recipe_id, input).await?;

    tx.commit().await?;

    get_recipe(pool, recipe_id).await
}

/// 레시피를 삭제합니다. 관계/즐겨찾기/장바구니 행은 CASCADE로 삭제됩니다.
pub async fn delete_recipe(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 동시 요청이 같은 (작성자, 이름)을 먼저 저장한 경우도 같은 검증 에러로 바꿉니다.
fn name_conflict(err: sqlx::Error) -> AppError {
    let err = AppError::from(err);
    if err.is_unique_violation() {
        AppError::Validation(ValidationErrors::single("name", DUPLICATE_NAME))
    } else {
        err
    }
}

async fn check_name_available(
    conn: &mut SqliteConnection,
    author_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    let (taken,): (i64,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM recipes WHERE author_id = ? AND name = ? AND id IS NOT ?)",
    )
    .bind(author_id)
    .bind(name)
    .bind(exclude_id)
    .fetch_one(&mut *conn)
    .await?;

    if taken != 0 {
        return Err(AppError::Validation(ValidationErrors::single(
            "name",
            DUPLICATE_NAME,
        )));
    }
    Ok(())
}

/// 요청에 들어온 재료/태그 ID가 모두 존재하는지 확인합니다.
async fn check_references(conn: &mut SqliteConnection, input: &RecipeInput) -> Result<(), AppError> {
    let ingredient_ids: Vec<i64> = input.ingredients.iter().map(|item| item.id).collect();
    let missing_ingredients = missing_ids(conn, "ingredients", &ingredient_ids).await?;
    let missing_tags = missing_ids(conn, "tags", &input.tags).await?;

    let mut errors = ValidationErrors::new();
    for id in missing_ingredients {
        errors.add("ingredients", format!("Ingredient with id {} does not exist", id));
    }
    for id in missing_tags {
        errors.add("tags", format!("Tag with id {} does not exist", id));
    }
    errors.into_result()
}

/// `table`에 없는 ID를 요청 순서대로 돌려줍니다. `table`은 상수 테이블 이름만 받습니다.
async fn missing_ids(
    conn: &mut SqliteConnection,
    table: &'static str,
    ids: &[i64],
) -> Result<Vec<i64>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT id FROM {} WHERE id IN (", table));
    let mut list = builder.separated(", ");
    for id in ids {
        list.push_bind(*id);
    }
    list.push_unseparated(")");

    let found: HashSet<i64> = builder
        .build_query_as::<(i64,)>()
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .map(|(id,)| id)
        .collect();

    Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
}

async fn insert_relations(
    conn: &mut SqliteConnection,
    recipe_id: i64,
    input: &RecipeInput,
) -> Result<(), AppError> {
    if !input.ingredients.is_empty() {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ",
        );
        builder.push_values(&input.ingredients, |mut row, item| {
            row.push_bind(recipe_id)
                .push_bind(item.id)
                .push_bind(item.amount);
        });
        builder.build().execute(&mut *conn).await?;
    }

    if !input.tags.is_empty() {
        let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
        builder.push_values(&input.tags, |mut row, tag_id| {
            row.push_bind(recipe_id).push_bind(*tag_id);
        });
        builder.build().execute(&mut *conn).await?;
    }

    Ok(())
}
