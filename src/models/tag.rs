//! # 태그 모델 정의
//!
//! 태그는 레시피를 분류하는 라벨입니다 (예: 아침, 점심, 저녁).
//!
//! ## 구조체 역할
//! - `Tag`: 데이터베이스에 저장된 태그 (응답용)
//! - `CreateTagRequest`: 새 태그 생성 시 요청 본문 (관리자 전용)
//! - `UpdateTagRequest`: 태그 수정 시 요청 본문 (부분 업데이트)

use serde::{Deserialize, Serialize};

/// 태그 엔티티. DB의 `tags` 테이블 한 행(row)에 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    /// `#rrggbb` 형식의 색상 코드. 이름 있는 CSS 색상이어야 합니다.
    pub color: String,
    /// URL에 쓰이는 식별자 (예: "breakfast")
    pub slug: String,
}

/// 태그 생성 요청: `POST /api/tags/`
///
/// `slug`가 없으면 이름으로부터 자동 생성합니다.
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
    pub slug: Option<String>,
}

/// 태그 수정 요청: `PATCH /api/tags/{id}/`
///
/// 모든 필드가 Option: 보낸 필드만 변경합니다.
#[derive(Debug, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    pub color: Option<String>,
    pub slug: Option<String>,
}

/// 검증과 정규화를 마친 새 태그 값
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}
