//! # 토큰 로그인/로그아웃
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | POST | /api/auth/token/login/ | 이메일 + 비밀번호 → `{ "auth_token": ... }` |
//! | POST | /api/auth/token/logout/ | 제시한 토큰을 폐기 (204) |

use crate::{
    db::users as db_users,
    error::AppError,
    extract::JsonBody,
    middleware::auth::{create_token, hash_token, AuthUser},
    models::user::*,
    routes::AppState,
    services::passwords,
};
use axum::{extract::State, http::StatusCode, Json};

const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    // 이메일이 없는 경우와 비밀번호가 틀린 경우를 구분하지 않습니다.
    let user = db_users::find_by_email(&state.pool, req.email.trim())
        .await?
        .ok_or(AppError::BadRequest(INVALID_CREDENTIALS.to_string()))?;

    if !passwords::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::BadRequest(INVALID_CREDENTIALS.to_string()));
    }

    let auth_token = create_token(user.id, &state.jwt_secret, state.token_ttl_days)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    db_users::store_token(&state.pool, user.id, &hash_token(&auth_token)).await?;
    let pruned = db_users::prune_expired_tokens(&state.pool, state.token_ttl_days).await?;
    if pruned > 0 {
        tracing::debug!(pruned, "Expired auth tokens removed");
    }

    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(TokenResponse { auth_token }))
}

/// 지금 요청에 쓰인 토큰만 폐기합니다. 다른 기기의 토큰은 그대로입니다.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    db_users::delete_token(&state.pool, &auth.token_hash).await?;
    Ok(StatusCode::NO_CONTENT)
}
