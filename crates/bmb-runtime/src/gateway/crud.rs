//! The five generic routes mounted for every registered model.
//!
//! List fetches the whole collection and pages it in memory. Create and
//! update copy request keys onto the record with no per-route allow-list;
//! the only filter is what the model declares.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::routing::get;
use axum::{Extension, Json, Router};
use bmb_core::{ModelDescriptor, PageRequest};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::auth::{public_record, CurrentUser, USER_MODEL};
use super::response::{ApiError, ApiResponse};
use super::AppState;
use crate::password::hash_password;
use crate::store::{record_id, Record};

/// Routes for one model under its base path.
///
/// The descriptor is resolved once here; handlers never look models up by name.
pub fn model_routes(model: Arc<ModelDescriptor>) -> Router<AppState> {
    let base = model.base_path();
    let item = format!("{}/{{id}}", base);

    Router::new()
        .route(&base, get(list_items).post(create_item))
        .route(&item, get(get_item).put(update_item).delete(delete_item))
        .layer(Extension(model))
}

/// Integer `{id}` path segment. Anything else is a JSON 404.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ItemId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for ItemId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i64>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|_| ApiError::not_found("Resource not found"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    page: Option<String>,
    page_size: Option<String>,
}

fn parse_count(name: &str, raw: Option<&str>) -> Result<Option<usize>, ApiError> {
    match raw {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(|n| Some(n.max(0) as usize))
            .map_err(|_| ApiError::validation(format!("{} must be an integer", name))),
    }
}

/// The request body as a non-empty JSON object.
pub(crate) fn object_body(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    match body {
        Ok(Json(Value::Object(map))) if !map.is_empty() => Ok(map),
        _ => Err(ApiError::validation("Request body is required")),
    }
}

fn item_response(record: Record) -> Value {
    json!({ "item": public_record(record) })
}

/// Value stored for a writable key. User passwords are hashed on the way in.
fn stored_value(model: &ModelDescriptor, key: &str, value: Value) -> Result<Value, ApiError> {
    if model.name == USER_MODEL && key == "password" {
        if let Value::String(plain) = &value {
            return Ok(Value::String(hash_password(plain)?));
        }
    }
    Ok(value)
}

/// Reject a record whose `unique` fields collide with another stored record.
fn check_unique(state: &AppState, model: &ModelDescriptor, record: &Record) -> Result<(), ApiError> {
    let id = record_id(record);
    for field in model.unique_fields() {
        let Some(value) = record.get(&field.name).filter(|v| !v.is_null()) else {
            continue;
        };
        let taken = state
            .store
            .first(&model.name, &field.name, value)?
            .is_some_and(|other| record_id(&other) != id);
        if taken {
            return Err(ApiError::conflict(format!("{} already in use", field.name)));
        }
    }
    Ok(())
}

fn not_found(model: &ModelDescriptor) -> ApiError {
    ApiError::not_found(format!("{} not found", model.name))
}

async fn list_items(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelDescriptor>>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse, ApiError> {
    let page = PageRequest::new(
        parse_count("page", query.page.as_deref())?,
        parse_count("page_size", query.page_size.as_deref())?,
        &state.pagination,
    );

    let items = state.store.all(&model.name)?;
    let pagination = page.info(items.len());
    let items: Vec<Record> = page
        .slice(&items)
        .iter()
        .cloned()
        .map(public_record)
        .collect();

    Ok(ApiResponse::ok(json!({
        "items": items,
        "pagination": pagination,
    })))
}

async fn get_item(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelDescriptor>>,
    _user: CurrentUser,
    ItemId(id): ItemId,
) -> Result<ApiResponse, ApiError> {
    let record = state
        .store
        .get(&model.name, id)?
        .ok_or_else(|| not_found(&model))?;
    Ok(ApiResponse::ok(item_response(record)))
}

async fn create_item(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelDescriptor>>,
    _user: CurrentUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, ApiError> {
    let body = object_body(body)?;

    // A model with no declared fields accepts any key.
    let open = model.fields.is_empty();
    let mut record = Record::new();
    for (key, value) in body {
        if key != "id" && (open || model.has_field(&key)) {
            let value = stored_value(&model, &key, value)?;
            record.insert(key, value);
        }
    }

    check_unique(&state, &model, &record)?;
    let saved = state.store.save(&model.name, record)?;
    tracing::debug!(model = %model.name, "Created record");

    Ok(ApiResponse::ok(item_response(saved))
        .with_message(format!("{} created", model.name))
        .created())
}

async fn update_item(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelDescriptor>>,
    _user: CurrentUser,
    ItemId(id): ItemId,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse, ApiError> {
    let body = object_body(body)?;
    let mut record = state
        .store
        .get(&model.name, id)?
        .ok_or_else(|| not_found(&model))?;

    for (key, value) in body {
        if key != "id" && (record.contains_key(&key) || model.has_field(&key)) {
            let value = stored_value(&model, &key, value)?;
            record.insert(key, value);
        }
    }

    check_unique(&state, &model, &record)?;
    let saved = state.store.save(&model.name, record)?;
    Ok(ApiResponse::ok(item_response(saved)).with_message(format!("{} updated", model.name)))
}

async fn delete_item(
    State(state): State<AppState>,
    Extension(model): Extension<Arc<ModelDescriptor>>,
    _user: CurrentUser,
    ItemId(id): ItemId,
) -> Result<ApiResponse, ApiError> {
    if !state.store.delete(&model.name, id)? {
        return Err(not_found(&model));
    }
    Ok(ApiResponse::message(format!("{} deleted", model.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmb_core::FieldDef;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("page", None).unwrap(), None);
        assert_eq!(parse_count("page", Some("3")).unwrap(), Some(3));
        assert_eq!(parse_count("page", Some("-2")).unwrap(), Some(0));
        assert!(parse_count("page", Some("two")).is_err());
    }

    #[test]
    fn test_object_body() {
        assert!(object_body(Ok(Json(json!({"a": 1})))).is_ok());
        assert!(object_body(Ok(Json(json!({})))).is_err());
        assert!(object_body(Ok(Json(json!([1, 2])))).is_err());
    }

    #[test]
    fn test_user_password_is_hashed() {
        let user = ModelDescriptor::new(USER_MODEL).with_field(FieldDef::new("password", "string"));
        let stored = stored_value(&user, "password", json!("secret")).unwrap();
        assert_ne!(stored, json!("secret"));

        let other = ModelDescriptor::new("Vault");
        assert_eq!(
            stored_value(&other, "password", json!("secret")).unwrap(),
            json!("secret")
        );
    }
}
