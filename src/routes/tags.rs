//! # 태그 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/tags/ | `list_tags` | 전체 태그 목록 (페이지네이션 없음) |
//! | POST | /api/tags/ | `create_tag` | 새 태그 생성 (관리자) |
//! | GET | /api/tags/{id}/ | `get_tag` | 단일 태그 |
//! | PATCH | /api/tags/{id}/ | `update_tag` | 태그 수정 (관리자) |
//! | DELETE | /api/tags/{id}/ | `delete_tag` | 태그 삭제 (관리자) |

use crate::{
    db,
    error::{AppError, ValidationErrors},
    extract::JsonBody,
    middleware::{require_admin, AuthUser},
    models::*,
    routes::AppState,
    validators,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<Tag>>, AppError> {
    let tags = db::list_tags(&state.pool).await?;
    Ok(Json(tags))
}

pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Tag>, AppError> {
    let tag = db::get_tag(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(tag))
}

/// 이름/slug 중복을 필드별 검증 에러로 바꿉니다.
async fn check_conflicts(
    state: &AppState,
    name: Option<&str>,
    slug: Option<&str>,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    let (name_taken, slug_taken) =
        db::find_tag_conflicts(&state.pool, name, slug, exclude_id).await?;

    let mut errors = ValidationErrors::new();
    if name_taken {
        errors.add("name", "A tag with this name already exists.");
    }
    if slug_taken {
        errors.add("slug", "A tag with this slug already exists.");
    }
    errors.into_result()
}

/// `POST /api/tags/` + `{ "name", "color", "slug"? }` → 201
pub async fn create_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    require_admin(&auth.user)?;

    let tag = validators::validate_new_tag(&req).map_err(AppError::Validation)?;
    check_conflicts(&state, Some(&tag.name), Some(&tag.slug), None).await?;

    let created = db::create_tag(&state.pool, &tag.name, &tag.color, &tag.slug).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/tags/{id}/`: 보낸 필드만 변경
pub async fn update_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<UpdateTagRequest>,
) -> Result<Json<Tag>, AppError> {
    require_admin(&auth.user)?;

    let req = validators::validate_tag_update(&req).map_err(AppError::Validation)?;
    check_conflicts(&state, req.name.as_deref(), req.slug.as_deref(), Some(id)).await?;

    let tag = db::update_tag(
        &state.pool,
        id,
        req.name.as_deref(),
        req.color.as_deref(),
        req.slug.as_deref(),
    )
    .await?
    .ok_or(AppError::NotFound)?;
    Ok(Json(tag))
}

/// `DELETE /api/tags/{id}/` → 204. 레시피에서도 떨어져 나갑니다.
pub async fn delete_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_admin(&auth.user)?;

    let deleted = db::delete_tag(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::models::Role;
    use crate::test_support::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn only_admins_create_tags() {
        let app = TestApp::new().await;
        let (_, user_token) = app.user("cook", Role::User).await;
        let (_, admin_token) = app.user("boss", Role::Admin).await;
        let body = json!({ "name": "Breakfast", "color": "#FFA500" });

        let (status, _) = app.post("/api/tags/", None, body.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.post("/api/tags/", Some(&user_token), body.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, tag) = app.post("/api/tags/", Some(&admin_token), body.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(tag["slug"], "breakfast");
        assert_eq!(tag["color"], "#ffa500");

        let (status, err) = app.post("/api/tags/", Some(&admin_token), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"]["fields"]["name"].is_array());
        assert!(err["error"]["fields"]["slug"].is_array());

        let (status, list) = app.get("/api/tags/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn admin_updates_and_deletes() {
        let app = TestApp::new().await;
        let (_, token) = app.user("boss", Role::Admin).await;
        let (_, tag) = app
            .post(
                "/api/tags/",
                Some(&token),
                json!({ "name": "Lunch", "color": "#008000", "slug": "lunch" }),
            )
            .await;
        let uri = format!("/api/tags/{}/", tag["id"]);

        let (status, updated) = app
            .send(Method::PATCH, &uri, Some(&token), Some(json!({ "name": "Dinner" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Dinner");
        assert_eq!(updated["slug"], "lunch");

        let (status, _) = app
            .send(Method::PATCH, &uri, Some(&token), Some(json!({ "color": "#010203" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.delete(&uri, Some(&token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.get(&uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
