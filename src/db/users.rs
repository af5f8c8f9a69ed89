use crate::error::AppError;
use crate::models::user::*;
use sqlx::SqlitePool;

pub async fn create_user(
    pool: &SqlitePool,
    req: &RegisterRequest,
    password_hash: &str,
    role: Role,
) -> Result<User, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, first_name, last_name, password_hash, role)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&req.username)
    .bind(&req.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(password_hash)
    .bind(role)
    .execute(pool)
    .await?;

    find_by_id(pool, result.last_insert_rowid())
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, first_name, last_name, password_hash, role, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, first_name, last_name, password_hash, role, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, first_name, last_name, password_hash, role, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn list_users(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, first_name, last_name, password_hash, role, created_at
        FROM users
        ORDER BY username
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64, AppError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    req: &UpdateProfileRequest,
) -> Result<Option<User>, AppError> {
    if find_by_id(pool, id).await?.is_none() {
        return Ok(None);
    }

    // COALESCE: 요청에 없는 필드(NULL)는 기존 값을 유지합니다.
    sqlx::query(
        r#"
        UPDATE users
        SET email = COALESCE(?, email),
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name)
        WHERE id = ?
        "#,
    )
    .bind(&req.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id).await
}

pub async fn set_password_hash(
    pool: &SqlitePool,
    id: i64,
    password_hash: &str,
) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn set_role(pool: &SqlitePool, id: i64, role: Role) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(role)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// 사용자를 삭제합니다. 레시피, 구독, 즐겨찾기, 장바구니, 토큰은 CASCADE로 함께 삭제됩니다.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn store_token(pool: &SqlitePool, user_id: i64, token_hash: &str) -> Result<(), AppError> {
    sqlx::query("INSERT INTO auth_tokens (token_hash, user_id) VALUES (?, ?)")
        .bind(token_hash)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// 토큰 해시로 토큰 소유자를 찾습니다. 폐기된 토큰이면 None입니다.
pub async fn find_token_owner(pool: &SqlitePool, token_hash: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.username, u.email, u.first_name, u.last_name,
               u.password_hash, u.role, u.created_at
        FROM auth_tokens t
        JOIN users u ON u.id = t.user_id
        WHERE t.token_hash = ?
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// 발급 후 `ttl_days`일이 지난 토큰 행을 지웁니다. 지운 행 수를 돌려줍니다.
///
/// 만료된 JWT는 검증 단계에서 이미 거부되므로 행만 남아 있던 것들입니다.
pub async fn prune_expired_tokens(pool: &SqlitePool, ttl_days: i64) -> Result<u64, AppError> {
    let result = sqlx::query(
        "DELETE FROM auth_tokens \
         WHERE created_at < strftime('%Y-%m-%dT%H:%M:%fZ', 'now', printf('-%d days', ?))",
    )
    .bind(ttl_days)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_token(pool: &SqlitePool, token_hash: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM auth_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{register, test_pool};

    #[tokio::test]
    async fn users_are_listed_by_username() {
        let pool = test_pool().await;
        register(&pool, "zoe", Role::User).await;
        register(&pool, "adam", Role::User).await;

        let users = list_users(&pool, 10, 0).await.unwrap();
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["adam", "zoe"]);
        assert_eq!(count_users(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn profile_update_keeps_missing_fields() {
        let pool = test_pool().await;
        let user = register(&pool, "cook", Role::User).await;

        let req = UpdateProfileRequest {
            email: None,
            first_name: Some("Ivan".to_string()),
            last_name: None,
        };
        let updated = update_profile(&pool, user.id, &req).await.unwrap().unwrap();
        assert_eq!(updated.first_name, "Ivan");
        assert_eq!(updated.email, user.email);
    }

    #[tokio::test]
    async fn revoked_tokens_have_no_owner() {
        let pool = test_pool().await;
        let user = register(&pool, "cook", Role::User).await;

        store_token(&pool, user.id, "abc").await.unwrap();
        let owner = find_token_owner(&pool, "abc").await.unwrap().unwrap();
        assert_eq!(owner.id, user.id);

        delete_token(&pool, "abc").await.unwrap();
        assert!(find_token_owner(&pool, "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_tokens_are_pruned() {
        let pool = test_pool().await;
        let user = register(&pool, "cook", Role::User).await;

        store_token(&pool, user.id, "fresh").await.unwrap();
        sqlx::query(
            "INSERT INTO auth_tokens (token_hash, user_id, created_at) \
             VALUES ('stale', ?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '-8 days'))",
        )
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

        assert_eq!(prune_expired_tokens(&pool, 7).await.unwrap(), 1);
        assert!(find_token_owner(&pool, "stale").await.unwrap().is_none());
        assert!(find_token_owner(&pool, "fresh").await.unwrap().is_some());
    }
}
