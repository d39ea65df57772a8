//! Account routes: registration, login, token refresh, the user resource and
//! user statistics.

use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Map, Value};

use super::auth::{public_record, CurrentUser, USER_MODEL};
use super::crud::{object_body, ItemId};
use super::response::{ApiError, ApiResponse};
use super::AppState;
use crate::password::{hash_password, verify_password};
use crate::store::{record_id, Record};

pub(crate) fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/users", get(list_users))
        .route("/api/users/search", get(search_user))
        .route("/api/stats/users", get(user_stats))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Ages reported individually by the user statistics route.
const STAT_AGES: [i64; 5] = [18, 25, 30, 35, 40];

fn required_str<'a>(body: &'a serde_json::Map<String, Value>, field: &str) -> Result<&'a str, ApiError> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("Field {} is required", field)))
}

fn token_for(state: &AppState, user: &Record) -> Result<String, ApiError> {
    let id = record_id(user).ok_or_else(|| ApiError::internal("stored user has no id"))?;
    let email = user.get("email").and_then(Value::as_str);
    Ok(state.tokens.issue(id, email)?)
}

async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, ApiError> {
    let body = object_body(body).map_err(|_| ApiError::validation("Field name is required"))?;
    let name = required_str(&body, "name")?;
    let email = required_str(&body, "email")?;
    let password = required_str(&body, "password")?;

    // Check-then-insert: two concurrent registrations can both pass this.
    if state
        .store
        .first(USER_MODEL, "email", &Value::from(email))?
        .is_some()
    {
        return Err(ApiError::conflict("Email already in use"));
    }

    let mut user = Record::new();
    user.insert("name".to_string(), Value::from(name));
    user.insert("email".to_string(), Value::from(email));
    user.insert("password".to_string(), Value::from(hash_password(password)?));
    user.insert("age".to_string(), body.get("age").cloned().unwrap_or(Value::Null));
    user.insert("created_at".to_string(), Value::from(Utc::now().to_rfc3339()));
    user.insert("is_active".to_string(), Value::Bool(true));

    let user = state.store.save(USER_MODEL, user)?;
    let token = token_for(&state, &user)?;
    tracing::info!(user_id = ?record_id(&user), "User registered");

    Ok(ApiResponse::ok(json!({
        "token": token,
        "user": public_record(user),
    }))
    .with_message("User created")
    .created())
}

async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, ApiError> {
    let missing = || ApiError::validation("Email and password are required");
    let body = object_body(body).map_err(|_| missing())?;
    let email = required_str(&body, "email").map_err(|_| missing())?;
    let password = required_str(&body, "password").map_err(|_| missing())?;

    let invalid = || ApiError::unauthorized("Invalid email or password");
    let user = state
        .store
        .first(USER_MODEL, "email", &Value::from(email))?
        .ok_or_else(invalid)?;
    let hash = user.get("password").and_then(Value::as_str).unwrap_or_default();
    if !verify_password(hash, password) {
        return Err(invalid());
    }

    let token = token_for(&state, &user)?;
    Ok(ApiResponse::ok(json!({
        "token": token,
        "user": public_record(user),
    }))
    .with_message("Logged in"))
}

async fn me(user: CurrentUser) -> ApiResponse {
    ApiResponse::ok(json!({ "user": user.public() }))
}

async fn refresh(State(state): State<AppState>, user: CurrentUser) -> Result<ApiResponse, ApiError> {
    let token = token_for(&state, &user.record)?;
    Ok(ApiResponse::ok(json!({ "token": token })).with_message("Token refreshed"))
}

async fn list_users(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ApiResponse, ApiError> {
    let mut users = state.store.all(USER_MODEL)?;

    for field in ["name", "email"] {
        if let Some(wanted) = params.get(field).filter(|v| !v.is_empty()) {
            users.retain(|u| u.get(field).and_then(Value::as_str) == Some(wanted.as_str()));
        }
    }
    if let Some(age) = params.get("age").filter(|v| !v.is_empty()) {
        let age: i64 = age
            .parse()
            .map_err(|_| ApiError::validation("age must be an integer"))?;
        users.retain(|u| u.get("age").and_then(Value::as_i64) == Some(age));
    }

    let count = users.len();
    let users: Vec<Record> = users.into_iter().map(public_record).collect();
    Ok(ApiResponse::ok(json!({ "users": users, "count": count })))
}

async fn search_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<ApiResponse, ApiError> {
    let email = params
        .get("email")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation("email query parameter is required"))?;

    let user = state
        .store
        .first(USER_MODEL, "email", &Value::from(email.as_str()))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::ok(json!({ "user": public_record(user) })))
}

async fn user_stats(State(state): State<AppState>, _user: CurrentUser) -> Result<ApiResponse, ApiError> {
    let total_users = state.store.count(USER_MODEL)?;

    // Ages with no users are left out.
    let mut users_by_age = Map::new();
    for age in STAT_AGES {
        let count = state.store.count_where(USER_MODEL, "age", &Value::from(age))?;
        if count > 0 {
            users_by_age.insert(age.to_string(), Value::from(count));
        }
    }

    Ok(ApiResponse::ok(json!({
        "total_users": total_users,
        "users_by_age": users_by_age,
    })))
}

async fn get_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    ItemId(id): ItemId,
) -> Result<ApiResponse, ApiError> {
    let user = state
        .store
        .get(USER_MODEL, id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::ok(json!({ "user": public_record(user) })))
}

async fn update_user(
    State(state): State<AppState>,
    current: CurrentUser,
    ItemId(id): ItemId,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, ApiError> {
    if current.id != id {
        return Err(ApiError::forbidden("Not allowed"));
    }

    let mut user = state
        .store
        .get(USER_MODEL, id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let body = object_body(body)?;

    if let Some(email) = body.get("email") {
        let taken = state
            .store
            .first(USER_MODEL, "email", email)?
            .is_some_and(|other| record_id(&other) != Some(id));
        if taken {
            return Err(ApiError::conflict("Email already in use"));
        }
        user.insert("email".to_string(), email.clone());
    }
    for field in ["name", "age"] {
        if let Some(value) = body.get(field) {
            user.insert(field.to_string(), value.clone());
        }
    }
    if let Some(password) = body.get("password").and_then(Value::as_str) {
        user.insert("password".to_string(), Value::from(hash_password(password)?));
    }

    let user = state.store.save(USER_MODEL, user)?;
    Ok(ApiResponse::ok(json!({ "user": public_record(user) })).with_message("User updated"))
}

async fn delete_user(
    State(state): State<AppState>,
    current: CurrentUser,
    ItemId(id): ItemId,
) -> Result<ApiResponse, ApiError> {
    if current.id != id {
        return Err(ApiError::forbidden("Not allowed"));
    }
    if !state.store.delete(USER_MODEL, id)? {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(ApiResponse::message("User deleted"))
}
