use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

pub async fn is_subscribed(
    pool: &SqlitePool,
    subscriber_id: i64,
    author_id: i64,
) -> Result<bool, AppError> {
    let (exists,): (i64,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE subscriber_id = ? AND subscribing_id = ?)",
    )
    .bind(subscriber_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;

    Ok(exists != 0)
}

/// 구독을 만듭니다. 자기 자신이나 이미 구독한 작성자면 `Conflict`입니다.
pub async fn subscribe(pool: &SqlitePool, subscriber_id: i64, author_id: i64) -> Result<(), AppError> {
    if subscriber_id == author_id {
        return Err(AppError::Conflict("You cannot subscribe to yourself".to_string()));
    }

    let already = || AppError::Conflict("You are already subscribed to this user".to_string());
    if is_subscribed(pool, subscriber_id, author_id).await? {
        return Err(already());
    }

    let result = sqlx::query("INSERT INTO subscriptions (subscriber_id, subscribing_id) VALUES (?, ?)")
        .bind(subscriber_id)
        .bind(author_id)
        .execute(pool)
        .await;

    match result.map_err(AppError::from) {
        Ok(_) => Ok(()),
        Err(e) if e.is_unique_violation() => Err(already()),
        Err(e) => Err(e),
    }
}

pub async fn unsubscribe(pool: &SqlitePool, subscriber_id: i64, author_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = ? AND subscribing_id = ?")
        .bind(subscriber_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 구독한 작성자 목록. 최근에 구독한 순서입니다.
pub async fn list_subscribed_authors(
    pool: &SqlitePool,
    subscriber_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, AppError> {
    let authors = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.email, u.first_name, u.last_name,
               u.password_hash, u.role, u.created_at
        FROM subscriptions s
        JOIN users u ON u.id = s.subscribing_id
        WHERE s.subscriber_id = ?
        ORDER BY s.added_at DESC, s.rowid DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(subscriber_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(authors)
}

pub async fn count_subscriptions(pool: &SqlitePool, subscriber_id: i64) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = ?")
        .bind(subscriber_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
