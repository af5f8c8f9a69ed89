//! # 태그 데이터베이스 쿼리 모듈
//!
//! 태그 CRUD와 레시피-태그 관계 조회를 담당합니다.
//!
//! ## 테이블 구조
//! - `tags`: 태그 엔티티 (id, name, color, slug)
//! - `recipe_tags`: 레시피와 태그의 다대다(N:M) 관계 테이블

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 모든 태그를 이름순으로 조회합니다.
pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<Tag>, AppError> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(tags)
}

pub async fn get_tag(pool: &SqlitePool, id: i64) -> Result<Option<Tag>, AppError> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(tag)
}

/// 새 태그를 생성합니다. 값은 라우트 계층에서 이미 검증/정규화된 상태여야 합니다.
///
/// `INSERT OR IGNORE`가 아니므로 이름이나 slug가 겹치면 UNIQUE 에러가 올라옵니다.
pub async fn create_tag(
    pool: &SqlitePool,
    name: &str,
    color: &str,
    slug: &str,
) -> Result<Tag, AppError> {
    let result = sqlx::query("INSERT INTO tags (name, color, slug) VALUES (?, ?, ?)")
        .bind(name)
        .bind(color)
        .bind(slug)
        .execute(pool)
        .await?;

    get_tag(pool, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created tag".to_string()))
}

/// 태그 정보를 부분 업데이트합니다.
///
/// ## 반환값
/// - `Ok(Some(Tag))`: 업데이트 성공
/// - `Ok(None)`: 해당 ID의 태그가 존재하지 않음
pub async fn update_tag(
    pool: &SqlitePool,
    id: i64,
    name: Option<&str>,
    color: Option<&str>,
    slug: Option<&str>,
) -> Result<Option<Tag>, AppError> {
    if get_tag(pool, id).await?.is_none() {
        return Ok(None);
    }

    sqlx::query(
        r#"
        UPDATE tags
        SET name = COALESCE(?, name),
            color = COALESCE(?, color),
            slug = COALESCE(?, slug)
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(color)
    .bind(slug)
    .bind(id)
    .execute(pool)
    .await?;

    get_tag(pool, id).await
}

/// 태그를 삭제합니다. `recipe_tags`의 관계 행은 CASCADE로 함께 삭제됩니다.
pub async fn delete_tag(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM tags WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 이름 또는 slug가 이미 쓰이고 있는지 확인합니다. `exclude_id`는 수정 중인 자기 자신입니다.
pub async fn find_tag_conflicts(
    pool: &SqlitePool,
    name: Option<&str>,
    slug: Option<&str>,
    exclude_id: Option<i64>,
) -> Result<(bool, bool), AppError> {
    let (name_taken, slug_taken): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            EXISTS(SELECT 1 FROM tags WHERE name = ? AND id IS NOT ?),
            EXISTS(SELECT 1 FROM tags WHERE slug = ? AND id IS NOT ?)
        "#,
    )
    .bind(name)
    .bind(exclude_id)
    .bind(slug)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;

    Ok((name_taken != 0, slug_taken != 0))
}

/// 특정 레시피에 연결된 모든 태그를 조회합니다.
///
/// ```sql
/// tags ←── recipe_tags ──→ recipes
/// ```
pub async fn get_recipe_tags(pool: &SqlitePool, recipe_id: i64) -> Result<Vec<Tag>, AppError> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.color, t.slug
        FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;

    #[tokio::test]
    async fn partial_update_changes_only_given_fields() {
        let pool = test_pool().await;
        let tag = create_tag(&pool, "Breakfast", "#ffa500", "breakfast").await.unwrap();

        let updated = update_tag(&pool, tag.id, Some("Morning"), None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Morning");
        assert_eq!(updated.color, "#ffa500");
        assert_eq!(updated.slug, "breakfast");

        assert!(update_tag(&pool, 999, Some("x"), None, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn conflicts_ignore_the_tag_itself() {
        let pool = test_pool().await;
        let tag = create_tag(&pool, "Lunch", "#008000", "lunch").await.unwrap();

        let (name_taken, slug_taken) =
            find_tag_conflicts(&pool, Some("Lunch"), Some("lunch"), None).await.unwrap();
        assert!(name_taken && slug_taken);

        let (name_taken, slug_taken) =
            find_tag_conflicts(&pool, Some("Lunch"), Some("lunch"), Some(tag.id)).await.unwrap();
        assert!(!name_taken && !slug_taken);
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_unique_violation() {
        let pool = test_pool().await;
        create_tag(&pool, "Dinner", "#0000ff", "dinner").await.unwrap();
        let err = create_tag(&pool, "Supper", "#0000ff", "dinner").await.unwrap_err();
        assert!(err.is_unique_violation());
    }
}
