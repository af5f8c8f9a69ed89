//! 라우트와 DB 사이의 부가 작업들
//!
//! - `images`: base64 이미지 디코딩, 저장, 삭제
//! - `passwords`: Argon2id 해싱/검증
//! - `shopping_list`: 쇼핑 리스트 줄 만들기와 PDF 렌더링
//! - `fixtures`: 시작 시 참조 데이터 로딩과 관리자 계정 보장

pub mod fixtures;
pub mod images;
pub mod passwords;
pub mod shopping_list;
