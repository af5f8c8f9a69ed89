//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: 인증 토큰 서명에 사용할 비밀키 (필수)
//! - `MEDIA_PATH`: 레시피 이미지 저장 디렉토리
//! - `MEDIA_URL`: 이미지 응답 URL 접두사
//! - `HOST` / `PORT`: 서버 바인딩 주소
//! - `PAGE_SIZE`: 목록 API의 기본 페이지 크기
//! - `TOKEN_TTL_DAYS`: 인증 토큰 유효 기간(일)
//! - `FIXTURES_PATH`: 시작 시 불러올 재료/태그 JSON 디렉토리 (선택)
//! - `ADMIN_EMAIL` / `ADMIN_USERNAME` / `ADMIN_PASSWORD`: 관리자 계정 부트스트랩 (선택)

use std::env;

/// 시작 시 보장할 관리자 계정 정보
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 필요한 값만 `AppState`로 복사되어 핸들러에 전달됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/jubang.db?mode=rwc")
    pub database_url: String,
    /// 토큰 서명/검증용 비밀키
    pub jwt_secret: String,
    /// 업로드 이미지가 저장되는 디렉토리
    pub media_path: String,
    /// 이미지 URL 접두사 (기본값: "/media/")
    pub media_url: String,
    pub host: String,
    pub port: u16,
    /// `limit` 쿼리가 없을 때의 페이지 크기
    pub page_size: u32,
    pub token_ttl_days: i64,
    pub fixtures_path: Option<String>,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            media_path: env::var("MEDIA_PATH").unwrap_or_else(|_| "data/media".to_string()),
            media_url: normalize_media_url(
                env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string()),
            ),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(6),
            token_ttl_days: env::var("TOKEN_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
            fixtures_path: env::var("FIXTURES_PATH").ok().filter(|p| !p.is_empty()),
            // 세 값이 모두 있을 때만 부트스트랩을 수행합니다.
            admin: match (
                env::var("ADMIN_EMAIL"),
                env::var("ADMIN_USERNAME"),
                env::var("ADMIN_PASSWORD"),
            ) {
                (Ok(email), Ok(username), Ok(password)) => Some(AdminBootstrap {
                    email,
                    username,
                    password,
                }),
                _ => None,
            },
        })
    }
}

/// `MEDIA_URL`이 항상 `/`로 끝나도록 맞춥니다. (이미지 경로를 그대로 이어붙이기 위함)
fn normalize_media_url(url: String) -> String {
    if url.ends_with('/') {
        url
    } else {
        format!("{}/", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_url_gets_trailing_slash() {
        assert_eq!(normalize_media_url("/media".to_string()), "/media/");
        assert_eq!(normalize_media_url("/media/".to_string()), "/media/");
    }
}
