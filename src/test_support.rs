//! 테스트 공용 도우미: 메모리 DB, 시드 데이터, 라우터 호출

use crate::db;
use crate::middleware::auth::{create_token, hash_token};
use crate::models::*;
use crate::routes::{build_router, AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret";

/// 1x1 PNG data URL
pub const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// 테스트마다 새 메모리 DB. 연결이 하나뿐이어야 같은 DB를 계속 봅니다.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

/// 비밀번호 검증이 필요 없는 테스트용 사용자 (`{username}@example.com`)
pub async fn register(pool: &SqlitePool, username: &str, role: Role) -> User {
    let req = RegisterRequest {
        email: format!("{}@example.com", username),
        username: username.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        password: String::new(),
    };
    db::users::create_user(pool, &req, "not-a-real-hash", role)
        .await
        .unwrap()
}

pub async fn ingredient(pool: &SqlitePool, name: &str, unit: &str) -> Ingredient {
    let req = IngredientRequest {
        name: name.to_string(),
        measurement_unit: unit.to_string(),
    };
    db::create_ingredient(pool, &req).await.unwrap()
}

pub async fn tag(pool: &SqlitePool, name: &str, slug: &str) -> Tag {
    db::create_tag(pool, name, "#ff0000", slug).await.unwrap()
}

pub fn recipe_input(name: &str, ingredients: &[(i64, i64)], tags: &[i64]) -> RecipeInput {
    RecipeInput {
        name: name.to_string(),
        text: format!("How to make {}", name),
        cooking_time: 10,
        ingredients: ingredients
            .iter()
            .map(|&(id, amount)| IngredientAmount { id, amount })
            .collect(),
        tags: tags.to_vec(),
    }
}

/// 라우터 전체를 서버 없이 호출하는 테스트 앱
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub media: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = test_pool().await;
        let media = tempfile::tempdir().unwrap();
        let state = AppState {
            pool: pool.clone(),
            jwt_secret: TEST_SECRET.to_string(),
            media_path: media.path().to_string_lossy().into_owned(),
            media_url: "/media/".to_string(),
            page_size: 6,
            token_ttl_days: 7,
        };

        Self {
            router: build_router(state),
            pool,
            media,
        }
    }

    /// 사용자를 만들고 바로 쓸 수 있는 토큰을 발급합니다.
    pub async fn user(&self, username: &str, role: Role) -> (User, String) {
        let user = register(&self.pool, username, role).await;
        let token = self.token_for(&user).await;
        (user, token)
    }

    pub async fn token_for(&self, user: &User) -> String {
        let token = create_token(user.id, TEST_SECRET, 7).unwrap();
        db::users::store_token(&self.pool, user.id, &hash_token(&token))
            .await
            .unwrap();
        token
    }

    /// 요청을 보내고 상태 코드, 헤더, 본문 바이트를 돌려줍니다.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }

    /// JSON 요청/응답. 본문이 비어 있으면 `Value::Null`입니다.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = self.send_raw(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }
}
