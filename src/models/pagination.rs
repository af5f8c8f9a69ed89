//! # 페이지네이션
//!
//! 페이지 번호 방식: `?page=2&limit=6`.
//! 응답은 `{ "count", "next", "previous", "results" }` 봉투로 감쌉니다.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// 한 페이지에 허용하는 최대 항목 수
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// 정규화된 페이지 요청 (page ≥ 1, 1 ≤ size ≤ MAX_PAGE_SIZE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(params: PageParams, default_size: u32) -> Self {
        Self {
            page: params.page.unwrap_or(1).max(1),
            size: params
                .limit
                .unwrap_or(default_size)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// 전체 개수 기준으로 마지막 페이지를 넘었는지 확인합니다.
    /// 결과가 0건이어도 1페이지는 항상 유효합니다.
    pub fn check_in_range(&self, count: i64) -> Result<(), AppError> {
        if self.page > 1 && self.offset() >= count {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// `path`와 원래 쿼리 문자열로 next/previous 링크를 만듭니다.
    pub fn new(
        results: Vec<T>,
        count: i64,
        request: PageRequest,
        path: &str,
        query: Option<&str>,
    ) -> Self {
        let has_next = request.offset() + i64::from(request.size) < count;
        Self {
            count,
            next: has_next.then(|| page_link(path, query, request.page + 1)),
            previous: (request.page > 1).then(|| page_link(path, query, request.page - 1)),
            results,
        }
    }
}

/// 기존 쿼리 문자열에서 `page`만 바꾼 링크를 만듭니다. 나머지 파라미터는 그대로 둡니다.
fn page_link(path: &str, query: Option<&str>, page: u32) -> String {
    let mut pairs: Vec<&str> = query
        .unwrap_or("")
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.starts_with("page=") && *pair != "page")
        .collect();
    let page_pair = format!("page={}", page);
    pairs.push(&page_pair);
    format!("{}?{}", path, pairs.join("&"))
}
