//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `user`: 사용자, 인증 요청/응답
//! - `tag`, `ingredient`: 관리자가 관리하는 참조 데이터
//! - `recipe`: 레시피와 레시피-재료/태그 표현
//! - `subscription`: 작성자 구독 응답
//! - `shopping`: 쇼핑 리스트 집계 결과
//! - `pagination`: 목록 응답 봉투
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Recipe`처럼 짧게 접근합니다.

pub mod ingredient;
pub mod pagination;
pub mod recipe;
pub mod shopping;
pub mod subscription;
pub mod tag;
pub mod user;

pub use ingredient::*;
pub use pagination::*;
pub use recipe::*;
pub use shopping::*;
pub use subscription::*;
pub use tag::*;
pub use user::*;
