//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `users`: 사용자, 인증 토큰 레지스트리
//! - `tags`, `ingredients`: 참조 데이터 CRUD
//! - `recipes`: 레시피 조회/필터링과 트랜잭션 쓰기
//! - `lists`: 즐겨찾기/장바구니 토글과 쇼핑 리스트 집계
//! - `subscriptions`: 작성자 구독

pub mod ingredients;
pub mod lists;
pub mod recipes;
pub mod subscriptions;
pub mod tags;
pub mod users;

// 이름이 겹치지 않는 모듈만 재공개합니다.
// users/lists/subscriptions는 `db::lists::add`처럼 모듈 경로로 부릅니다.
pub use ingredients::*;
pub use recipes::*;
pub use tags::*;
