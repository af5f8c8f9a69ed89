//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 라우터 조립을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 토큰 로그인/로그아웃
//! - `users`: 회원가입, 프로필, 비밀번호 변경, 구독
//! - `tags`, `ingredients`: 참조 데이터 (쓰기는 관리자 전용)
//! - `recipes`: 레시피 CRUD와 목록 필터
//! - `lists`: 즐겨찾기/장바구니 토글, 쇼핑 리스트 다운로드
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod auth;
pub mod health;
pub mod ingredients;
pub mod lists;
pub mod recipes;
pub mod tags;
pub mod users;

use crate::config::Config;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// SqlitePool은 내부적으로 Arc라서 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 레시피 이미지 저장 디렉토리
    pub media_path: String,
    /// 이미지 URL 접두사 (항상 `/`로 끝남)
    pub media_url: String,
    /// 목록 API의 기본 페이지 크기
    pub page_size: u32,
    pub token_ttl_days: i64,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            media_path: config.media_path.clone(),
            media_url: config.media_url.clone(),
            page_size: config.page_size,
            token_ttl_days: config.token_ttl_days,
        }
    }
}

/// `/api` 아래의 모든 라우트
///
/// 경로는 끝에 `/`가 붙은 형태를 씁니다 (예: `/recipes/{id}/`).
/// `/users/me/`처럼 고정된 경로는 `/users/{id}/`보다 먼저 매칭됩니다.
fn api_routes() -> Router<AppState> {
    Router::new()
        // 인증
        .route("/auth/token/login/", post(auth::login))
        .route("/auth/token/logout/", post(auth::logout))
        // 사용자
        .route("/users/", get(users::list_users).post(users::register))
        .route("/users/me/", get(users::me).patch(users::update_me))
        .route("/users/set_password/", post(users::set_password))
        .route("/users/subscriptions/", get(users::list_subscriptions))
        .route("/users/{id}/", get(users::get_user).delete(users::delete_user))
        .route(
            "/users/{id}/subscribe/",
            post(users::subscribe).delete(users::unsubscribe),
        )
        // 태그
        .route("/tags/", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/tags/{id}/",
            get(tags::get_tag)
                .patch(tags::update_tag)
                .delete(tags::delete_tag),
        )
        // 재료
        .route(
            "/ingredients/",
            get(ingredients::list_ingredients).post(ingredients::create_ingredient),
        )
        .route(
            "/ingredients/{id}/",
            get(ingredients::get_ingredient)
                .patch(ingredients::update_ingredient)
                .delete(ingredients::delete_ingredient),
        )
        // 레시피
        .route(
            "/recipes/",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipes/download_shopping_cart/",
            get(lists::download_shopping_cart),
        )
        .route(
            "/recipes/{id}/",
            get(recipes::get_recipe)
                .patch(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/{id}/favorite/",
            post(lists::add_favorite).delete(lists::remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart/",
            post(lists::add_to_cart).delete(lists::remove_from_cart),
        )
}

/// 전체 애플리케이션 라우터를 만듭니다.
///
/// - `/api/...`: JSON API
/// - `/health`: 헬스체크
/// - `MEDIA_URL`(기본 `/media/`): 업로드된 레시피 이미지
pub fn build_router(state: AppState) -> Router {
    // 개발 환경 기준으로 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes());

    // MEDIA_URL이 다른 호스트(CDN 등)를 가리키면 여기서는 서빙하지 않습니다.
    let media_prefix = state.media_url.trim_end_matches('/');
    if media_prefix.starts_with('/') && media_prefix.len() > 1 {
        app = app.nest_service(media_prefix, ServeDir::new(&state.media_path));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
