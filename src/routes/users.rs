//! # 사용자 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 권한 |
//! |--------|------|--------|------|
//! | POST | /api/users/ | `register` | 누구나 |
//! | GET | /api/users/ | `list_users` | 누구나 (페이지네이션) |
//! | GET | /api/users/{id}/ | `get_user` | 누구나 |
//! | DELETE | /api/users/{id}/ | `delete_user` | 관리자 |
//! | GET, PATCH | /api/users/me/ | `me`, `update_me` | 로그인 |
//! | POST | /api/users/set_password/ | `set_password` | 로그인 |
//! | GET | /api/users/subscriptions/ | `list_subscriptions` | 로그인 |
//! | POST, DELETE | /api/users/{id}/subscribe/ | `subscribe`, `unsubscribe` | 로그인 |

use crate::{
    db,
    error::{AppError, ValidationErrors},
    extract::{JsonBody, QueryParams},
    middleware::{require_admin, AuthUser, Viewer},
    models::*,
    routes::AppState,
    services::passwords,
    validators,
};
use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    Json,
};

/// 회원가입
///
/// `POST /api/users/` → 201 `{ email, id, username, first_name, last_name }`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserCreated>), AppError> {
    let req = RegisterRequest {
        email: req.email.trim().to_string(),
        username: req.username.trim().to_string(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        password: req.password,
    };

    let mut errors = ValidationErrors::new();
    if let Err(e) = validators::validate_username(&req.username) {
        errors.add("username", e);
    } else if db::users::find_by_username(&state.pool, &req.username).await?.is_some() {
        errors.add("username", "A user with that username already exists.");
    }
    if let Err(e) = validators::validate_email(&req.email) {
        errors.add("email", e);
    } else if db::users::find_by_email(&state.pool, &req.email).await?.is_some() {
        errors.add("email", "A user with that email already exists.");
    }
    check_name_lengths(&mut errors, Some(&req.first_name), Some(&req.last_name));
    for problem in validators::validate_password(&req.password, &req.username, &req.email) {
        errors.add("password", problem);
    }
    errors.into_result()?;

    let password_hash = passwords::hash_password(&req.password)?;
    let user = db::users::create_user(&state.pool, &req, &password_hash, Role::User)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                AppError::Validation(ValidationErrors::single(
                    "username",
                    "A user with that username or email already exists.",
                ))
            } else {
                e
            }
        })?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

fn check_name_lengths(errors: &mut ValidationErrors, first: Option<&str>, last: Option<&str>) {
    for (field, value) in [("first_name", first), ("last_name", last)] {
        if let Some(value) = value {
            if value.chars().count() > validators::NAME_MAX_LENGTH {
                errors.add(
                    field,
                    format!(
                        "Ensure this field has no more than {} characters.",
                        validators::NAME_MAX_LENGTH
                    ),
                );
            }
        }
    }
}

/// 조회하는 사람 기준으로 `is_subscribed`를 붙인 프로필
pub(crate) async fn profile_for(
    state: &AppState,
    user: User,
    viewer_id: Option<i64>,
) -> Result<UserProfile, AppError> {
    let is_subscribed = match viewer_id {
        Some(viewer_id) => db::subscriptions::is_subscribed(&state.pool, viewer_id, user.id).await?,
        None => false,
    };
    Ok(UserProfile::new(user, is_subscribed))
}

/// `GET /api/users/?page=&limit=`, 사용자 이름순
pub async fn list_users(
    State(state): State<AppState>,
    viewer: Viewer,
    OriginalUri(uri): OriginalUri,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Page<UserProfile>>, AppError> {
    let request = PageRequest::new(params, state.page_size);
    let count = db::users::count_users(&state.pool).await?;
    request.check_in_range(count)?;

    let users = db::users::list_users(&state.pool, request.limit(), request.offset()).await?;
    let mut profiles = Vec::with_capacity(users.len());
    for user in users {
        profiles.push(profile_for(&state, user, viewer.user_id()).await?);
    }

    Ok(Json(Page::new(profiles, count, request, uri.path(), uri.query())))
}

pub async fn get_user(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(profile_for(&state, user, viewer.user_id()).await?))
}

/// 사용자 삭제 (관리자 전용). 레시피와 관계 행은 CASCADE로 함께 삭제됩니다.
///
/// 레시피 이미지 파일은 남습니다.
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_admin(&auth.user)?;

    if !db::users::delete_user(&state.pool, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(user_id = id, admin_id = auth.user.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/users/me/`: 자기 자신은 구독할 수 없으므로 `is_subscribed`는 항상 false
pub async fn me(auth: AuthUser) -> Json<UserProfile> {
    Json(UserProfile::new(auth.user, false))
}

pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let req = UpdateProfileRequest {
        email: req.email.map(|e| e.trim().to_string()),
        first_name: req.first_name.map(|n| n.trim().to_string()),
        last_name: req.last_name.map(|n| n.trim().to_string()),
    };

    let mut errors = ValidationErrors::new();
    if let Some(email) = req.email.as_deref() {
        if let Err(e) = validators::validate_email(email) {
            errors.add("email", e);
        } else if db::users::find_by_email(&state.pool, email)
            .await?
            .is_some_and(|other| other.id != auth.user.id)
        {
            errors.add("email", "A user with that email already exists.");
        }
    }
    check_name_lengths(&mut errors, req.first_name.as_deref(), req.last_name.as_deref());
    errors.into_result()?;

    let user = db::users::update_profile(&state.pool, auth.user.id, &req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(UserProfile::new(user, false)))
}

/// `POST /api/users/set_password/` → 204
pub async fn set_password(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<SetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    if !passwords::verify_password(&req.current_password, &auth.user.password_hash)? {
        return Err(AppError::Validation(ValidationErrors::single(
            "current_password",
            "Invalid password.",
        )));
    }

    let mut errors = ValidationErrors::new();
    for problem in
        validators::validate_password(&req.new_password, &auth.user.username, &auth.user.email)
    {
        errors.add("new_password", problem);
    }
    errors.into_result()?;

    let password_hash = passwords::hash_password(&req.new_password)?;
    db::users::set_password_hash(&state.pool, auth.user.id, &password_hash).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 구독 응답 하나를 만듭니다. `recipes_limit`이 있으면 최신 레시피를 그만큼만 붙입니다.
async fn subscription_for(
    state: &AppState,
    author: User,
    recipes_limit: Option<u32>,
) -> Result<Subscription, AppError> {
    let recipes =
        db::list_author_recipes(&state.pool, author.id, recipes_limit.map(i64::from)).await?;
    let count = db::count_author_recipes(&state.pool, author.id).await?;
    let recipes = recipes
        .into_iter()
        .map(|recipe| RecipeShort::new(recipe, &state.media_url))
        .collect();
    Ok(Subscription::new(author, recipes, count))
}

/// `GET /api/users/subscriptions/?page=&limit=&recipes_limit=`, 최근 구독 순
pub async fn list_subscriptions(
    State(state): State<AppState>,
    auth: AuthUser,
    OriginalUri(uri): OriginalUri,
    QueryParams(query): QueryParams<SubscriptionQuery>,
) -> Result<Json<Page<Subscription>>, AppError> {
    let request = PageRequest::new(
        PageParams {
            page: query.page,
            limit: query.limit,
        },
        state.page_size,
    );
    let count = db::subscriptions::count_subscriptions(&state.pool, auth.user.id).await?;
    request.check_in_range(count)?;

    let authors = db::subscriptions::list_subscribed_authors(
        &state.pool,
        auth.user.id,
        request.limit(),
        request.offset(),
    )
    .await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in authors {
        results.push(subscription_for(&state, author, query.recipes_limit).await?);
    }

    Ok(Json(Page::new(results, count, request, uri.path(), uri.query())))
}

/// `POST /api/users/{id}/subscribe/` → 201
///
/// 자기 자신이나 이미 구독한 작성자는 400, 없는 사용자는 404입니다.
pub async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    QueryParams(query): QueryParams<SubscriptionQuery>,
) -> Result<(StatusCode, Json<Subscription>), AppError> {
    let author = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    db::subscriptions::subscribe(&state.pool, auth.user.id, author.id).await?;

    let subscription = subscription_for(&state, author, query.recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// `DELETE /api/users/{id}/subscribe/` → 204, 구독이 없으면 404
pub async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !db::subscriptions::unsubscribe(&state.pool, auth.user.id, id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::db;
    use crate::models::Role;
    use crate::services::passwords;
    use crate::test_support::{ingredient, tag, TestApp};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn registration_validates_and_creates() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post(
                "/api/users/",
                None,
                json!({
                    "email": "ivan@example.com",
                    "username": "ivan.petrov",
                    "first_name": "Ivan",
                    "last_name": "Petrov",
                    "password": "Borscht-Recipe-9"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "ivan.petrov");
        assert!(body["id"].is_i64());
        assert!(body.get("password").is_none());

        let (status, body) = app
            .post(
                "/api/users/",
                None,
                json!({
                    "email": "ivan@example.com",
                    "username": "bad name!",
                    "password": "12345678"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = &body["error"]["fields"];
        assert!(fields["username"].is_array());
        assert!(fields["email"].is_array());
        assert!(fields["password"].is_array());
    }

    #[tokio::test]
    async fn registration_without_username_names_the_field() {
        let app = TestApp::new().await;

        let (status, body) = app
            .post(
                "/api/users/",
                None,
                json!({ "email": "ivan@example.com", "password": "Borscht-Recipe-9" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(
            body["error"]["fields"]["username"],
            json!(["missing field `username`"])
        );

        let (status, body) = app.get("/api/users/?limit=many", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["fields"]["limit"].is_array());
    }

    #[tokio::test]
    async fn users_list_is_paginated() {
        let app = TestApp::new().await;
        for name in ["anna", "boris", "vera"] {
            app.user(name, Role::User).await;
        }

        let (status, body) = app.get("/api/users/?limit=2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["results"][0]["username"], "anna");
        assert_eq!(body["next"], "/api/users/?limit=2&page=2");
        assert!(body["previous"].is_null());

        let (status, _) = app.get("/api/users/?limit=2&page=3", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn profile_update_and_password_change() {
        let app = TestApp::new().await;
        let (cook, token) = app.user("cook", Role::User).await;
        let hash = passwords::hash_password("Old-Secret-12").unwrap();
        db::users::set_password_hash(&app.pool, cook.id, &hash)
            .await
            .unwrap();

        let (status, body) = app
            .send(
                Method::PATCH,
                "/api/users/me/",
                Some(&token),
                Some(json!({ "first_name": "Chef" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["first_name"], "Chef");
        assert_eq!(body["is_subscribed"], false);

        let (status, body) = app
            .post(
                "/api/users/set_password/",
                Some(&token),
                json!({ "new_password": "Another-Pass-77", "current_password": "x" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["fields"]["current_password"].is_array());

        let (status, body) = app
            .post(
                "/api/users/set_password/",
                Some(&token),
                json!({ "new_password": "123", "current_password": "Old-Secret-12" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["fields"]["new_password"].is_array());

        let (status, _) = app
            .post(
                "/api/users/set_password/",
                Some(&token),
                json!({ "new_password": "Another-Pass-77", "current_password": "Old-Secret-12" }),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let stored = db::users::find_by_id(&app.pool, cook.id).await.unwrap().unwrap();
        assert!(passwords::verify_password("Another-Pass-77", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn only_admins_delete_users() {
        let app = TestApp::new().await;
        let (victim, victim_token) = app.user("victim", Role::User).await;
        let (_, admin_token) = app.user("boss", Role::Admin).await;

        let uri = format!("/api/users/{}/", victim.id);
        let (status, _) = app.delete(&uri, Some(&victim_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app.delete(&uri, Some(&admin_token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app.get(&uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn subscription_flow() {
        let app = TestApp::new().await;
        let (reader, token) = app.user("reader", Role::User).await;
        let (author, author_token) = app.user("author", Role::User).await;
        let salt = ingredient(&app.pool, "Salt", "g").await;
        let lunch = tag(&app.pool, "Lunch", "lunch").await;

        for name in ["Soup", "Stew", "Pie"] {
            let (status, _) = app
                .post(
                    "/api/recipes/",
                    Some(&author_token),
                    json!({
                        "name": name,
                        "text": "Cook it",
                        "cooking_time": 5,
                        "image": crate::test_support::PIXEL_PNG,
                        "ingredients": [{ "id": salt.id, "amount": 1 }],
                        "tags": [lunch.id]
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let self_uri = format!("/api/users/{}/subscribe/", reader.id);
        let (status, _) = app.post(&self_uri, Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/api/users/{}/subscribe/?recipes_limit=2", author.id);
        let (status, body) = app.post(&uri, Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["is_subscribed"], true);
        assert_eq!(body["recipes_count"], 3);
        assert_eq!(body["recipes"].as_array().unwrap().len(), 2);

        let (status, _) = app.post(&uri, Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = app.get("/api/users/subscriptions/", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["results"][0]["username"], "author");

        let (_, profile) = app
            .get(&format!("/api/users/{}/", author.id), Some(&token))
            .await;
        assert_eq!(profile["is_subscribed"], true);

        let uri = format!("/api/users/{}/subscribe/", author.id);
        let (status, _) = app.delete(&uri, Some(&token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.delete(&uri, Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.post("/api/users/9999/subscribe/", Some(&token), json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
