//! # Jubang 웹 서버 진입점
//!
//! 레시피 공유 서비스의 백엔드 API 서버입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성과 마이그레이션
//! 4. 이미지 저장 디렉토리 생성
//! 5. (선택) 재료/태그 초기 데이터와 관리자 계정 준비
//! 6. 라우터 조립 후 HTTP 서버 시작

// ── 모듈 선언 ──
mod config;
mod db;
mod error;
mod extract;
mod middleware;
mod models;
mod routes;
mod services;
mod validators;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use config::Config;
use routes::{build_router, AppState};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 시스템 환경변수만으로 동작합니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 초기화 ──
    // RUST_LOG가 없으면 jubang, tower_http, axum을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jubang=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting Jubang server on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 + 마이그레이션 ──
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let pruned = db::users::prune_expired_tokens(&pool, config.token_ttl_days).await?;
    tracing::info!(pruned, "Expired auth tokens removed");

    // ── 5단계: 이미지 저장 디렉토리 생성 ──
    let media_path = Path::new(&config.media_path);
    if !media_path.exists() {
        tokio::fs::create_dir_all(media_path).await?;
        tracing::info!("Created media directory: {}", config.media_path);
    }

    // ── 6단계: 초기 데이터 ──
    // 이미 있는 재료/태그는 건너뛰므로 재시작해도 중복되지 않습니다.
    if let Some(fixtures_path) = &config.fixtures_path {
        services::fixtures::load_fixtures(&pool, Path::new(fixtures_path)).await?;
    }
    if let Some(admin) = &config.admin {
        let user = services::fixtures::ensure_admin(&pool, admin).await?;
        tracing::info!(user_id = user.id, "Admin account ready");
    }

    // ── 7단계: 라우터 조립 ──
    let state = AppState::new(pool, &config);
    let app = build_router(state);

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
