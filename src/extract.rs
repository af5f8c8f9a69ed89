//! # 요청 추출자
//!
//! axum 기본 `Json`/`Query`는 역직렬화에 실패하면 422 `text/plain`을 돌려줍니다.
//! 여기 추출자들은 같은 일을 하되 실패를 `AppError::Validation`으로 바꿔서
//! 다른 입력 검증 에러와 같은 `{ "error": { ..., "fields": {...} } }` 봉투로 응답합니다.
//!
//! 응답 쪽은 그대로 `axum::Json`을 씁니다.

use crate::error::{AppError, ValidationErrors};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

/// 특정 필드에 묶을 수 없는 에러의 키
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// JSON 요청 본문
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// 단일 값 쿼리 문자열
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// `?tags=a&tags=b`처럼 같은 키가 반복되는 쿼리 문자열
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum_extra::extract::Query), rejection(AppError))]
pub struct MultiQuery<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => deserialize_errors(&e.body_text()),
            JsonRejection::JsonSyntaxError(e) => {
                AppError::Validation(ValidationErrors::single(
                    NON_FIELD_ERRORS,
                    strip_position(detail(&e.body_text())),
                ))
            }
            other => AppError::Validation(ValidationErrors::single(
                NON_FIELD_ERRORS,
                other.body_text(),
            )),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        deserialize_errors(&rejection.body_text())
    }
}

impl From<axum_extra::extract::QueryRejection> for AppError {
    fn from(rejection: axum_extra::extract::QueryRejection) -> Self {
        deserialize_errors(&rejection.body_text())
    }
}

/// 역직렬화 에러 문장을 필드별 에러로 나눕니다.
///
/// 입력 예:
/// - `Failed to deserialize ...: cooking_time: invalid type: string "abc", expected i64 at line 1 column 20`
/// - `Failed to deserialize ...: missing field `username` at line 1 column 24`
fn deserialize_errors(body: &str) -> AppError {
    let detail = detail(body);

    let (field, message) = match detail.split_once(": ") {
        Some((path, rest)) if !path.contains(char::is_whitespace) && !path.starts_with('?') => {
            (top_level_field(path).to_string(), rest)
        }
        _ => match backticked_after(detail, "missing field ")
            .or_else(|| backticked_after(detail, "unknown field "))
        {
            Some(name) => (name.to_string(), detail),
            None => (NON_FIELD_ERRORS.to_string(), detail),
        },
    };

    AppError::Validation(ValidationErrors::single(&field, strip_position(message)))
}

/// `"<고정 문구>: <serde 에러>"`에서 serde 에러 부분
fn detail(body: &str) -> &str {
    body.split_once(": ").map_or(body, |(_, rest)| rest)
}

/// `ingredients[0].amount` → `ingredients`
fn top_level_field(path: &str) -> &str {
    path.split(['.', '[']).next().unwrap_or(path)
}

/// `` missing field `name` `` 같은 문장에서 백틱 안의 이름
fn backticked_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let rest = &text[text.find(marker)? + marker.len()..];
    rest.strip_prefix('`')?.split('`').next()
}

/// serde_json이 붙이는 ` at line N column M` 꼬리를 뗍니다.
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(index) => message[..index].to_string(),
        None => message.to_string(),
    }
}
