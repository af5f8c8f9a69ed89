//! # 토큰 인증
//!
//! `Authorization: Token <jwt>` 또는 `Authorization: Bearer <jwt>` 헤더를 읽어
//! 서명/만료를 확인한 뒤, 토큰 해시가 `auth_tokens`에 살아 있는지 확인합니다.
//! 로그아웃하면 레지스트리에서 지워지므로 서명이 유효해도 더 이상 통과하지 못합니다.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::db;
use crate::error::AppError;
use crate::models::User;
use crate::routes::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// 인증된 사용자. 핸들러 인자에 넣으면 인증이 필수가 됩니다.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// 제시된 토큰의 SHA-256 (로그아웃 시 이 행을 지웁니다)
    pub token_hash: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = parse_authorization(auth_header).ok_or(AuthError::InvalidToken)?;
        let claims = verify_token(token, &state.jwt_secret)?;

        let token_hash = hash_token(token);
        let user = db::users::find_token_owner(&state.pool, &token_hash)
            .await
            .map_err(AuthError::Internal)?
            .filter(|user| user.id.to_string() == claims.sub)
            .ok_or(AuthError::RevokedToken)?;

        Ok(AuthUser { user, token_hash })
    }
}

/// 로그인은 선택. 헤더가 없으면 익명(None), 헤더가 있는데 틀리면 401입니다.
#[derive(Debug, Clone)]
pub struct Viewer(pub Option<AuthUser>);

impl Viewer {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|auth| auth.user.id)
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(Viewer(None));
        }
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(Viewer(Some(user)))
    }
}

fn parse_authorization(header: &str) -> Option<&str> {
    header
        .strip_prefix("Token ")
        .or_else(|| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    RevokedToken,
    Internal(AppError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authentication credentials were not provided",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authorization token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "expired_token",
                "Authorization token has expired",
            ),
            AuthError::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Authorization token is no longer valid",
            ),
            AuthError::Internal(err) => return err.into_response(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// 새 토큰을 발급합니다. `jti`가 매번 달라서 같은 초에 두 번 로그인해도 해시가 겹치지 않습니다.
pub fn create_token(
    user_id: i64,
    secret: &str,
    ttl_days: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        jti: uuid::Uuid::now_v7().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(ttl_days)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
