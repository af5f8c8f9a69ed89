//! 요청 추출기와 권한 확인
//!
//! - `auth`: 토큰 인증 (`AuthUser`, `Viewer`)
//! - `permissions`: 관리자/작성자 권한

pub mod auth;
pub mod permissions;

pub use auth::{AuthUser, Viewer};
pub use permissions::*;
