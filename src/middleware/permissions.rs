//! 인증 이후의 권한 확인. 인증 자체(401)는 `auth` 추출기가 담당하고,
//! 여기서는 로그인한 사용자가 해당 작업을 할 수 있는지(403)만 봅니다.

use crate::error::AppError;
use crate::models::User;

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// 리소스 작성자 본인이거나 관리자인지 확인합니다.
pub fn require_owner_or_admin(user: &User, owner_id: i64) -> Result<(), AppError> {
    if user.id == owner_id || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
