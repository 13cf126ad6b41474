use axum::extract::{Json, Path, State};
use serde_json::{json, Map, Value};

use crate::access::{self, update_resource};
use crate::error::{ApiError, Failure};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::validate_required_fields;

/// GET /api/v1/roles
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let roles = access::get_all(state.store.as_ref(), "role")
        .await
        .map_err(|err| match err {
            ApiError::NotFound(_) => ApiError::NotFound(Failure::new(
                "There are no roles in the system.",
                "Ensure roles are seeded.",
            )),
            other => other,
        })?;
    let roles: Vec<Value> = roles.iter().map(|r| r.to_value()).collect();
    Ok(ApiResponse::success(json!({ "roles": roles })))
}

/// GET /api/v1/roles/:role_id
pub async fn show(State(state): State<AppState>, Path(role_id): Path<i64>) -> ApiResult<Value> {
    let role = access::get_one(state.store.as_ref(), "role", role_id).await?;
    Ok(ApiResponse::success(json!({ "role": role.to_value() })))
}

/// GET /api/v1/roles/:role_id/users - every user carrying the role's title.
pub async fn users(State(state): State<AppState>, Path(role_id): Path<i64>) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let role = access::get_one(store, "role", role_id).await?;
    let title = role.str_field("title").to_string();
    let holders: Vec<Value> = store
        .get_all("user")
        .await?
        .iter()
        .filter(|u| {
            u.field("roles")
                .and_then(Value::as_array)
                .map(|roles| roles.iter().any(|r| r.as_str() == Some(title.as_str())))
                .unwrap_or(false)
        })
        .map(|u| u.to_value_without(&["password"]))
        .collect();
    if holders.is_empty() {
        return Err(ApiError::NotFound(Failure::new(
            "The role has no users.",
            "Have an admin add users to the role.",
        )));
    }
    Ok(ApiResponse::success(
        json!({ "role": role.to_value(), "users": holders }),
    ))
}

/// POST /api/v1/roles - admin only.
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Value> {
    if let Err(missing) = validate_required_fields(&["title"], &payload, false) {
        return Err(ApiError::Validation { missing });
    }
    let mut fields = Map::new();
    fields.insert("title".to_string(), payload["title"].clone());
    let role_id = state.store.save("role", fields).await?;
    Ok(ApiResponse::created(
        json!({ "message": format!("Role with id {role_id} was created.") }),
    ))
}

/// PUT /api/v1/roles/:role_id - admin only.
pub async fn update(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let role = access::get_one(store, "role", role_id).await?;
    update_resource(store, &payload, &role).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Role with id {role_id} was updated.") }),
    ))
}

/// DELETE /api/v1/roles/:role_id - admin only.
pub async fn remove(State(state): State<AppState>, Path(role_id): Path<i64>) -> ApiResult<Value> {
    let store = state.store.as_ref();
    access::get_one(store, "role", role_id).await?;
    store.delete("role", role_id).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Role with id {role_id} was deleted.") }),
    ))
}
