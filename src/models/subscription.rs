use super::{RecipeShort, User};
use serde::{Deserialize, Serialize};

/// 구독 목록/구독 생성 응답: 구독한 작성자 + 최근 레시피 일부 + 전체 레시피 수
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

impl Subscription {
    pub fn new(author: User, recipes: Vec<RecipeShort>, recipes_count: i64) -> Self {
        Self {
            email: author.email,
            id: author.id,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            is_subscribed: true,
            recipes,
            recipes_count,
        }
    }
}

/// `GET /api/users/subscriptions/`, `POST /api/users/:id/subscribe/` 쿼리
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// 작성자마다 함께 보여줄 레시피 최대 개수
    pub recipes_limit: Option<u32>,
}
