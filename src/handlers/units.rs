use axum::extract::{Json, Path, State};
use serde_json::{json, Map, Value};

use crate::access::{self, update_resource};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::validate_required_fields;

/// POST /api/v1/units
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Value> {
    if let Err(missing) = validate_required_fields(&["name"], &payload, false) {
        return Err(ApiError::Validation { missing });
    }
    let mut fields = Map::new();
    fields.insert("name".to_string(), payload["name"].clone());
    fields.insert("board_id".to_string(), Value::Null);
    fields.insert("estate_id".to_string(), payload.get("estate_id").cloned().unwrap_or(Value::Null));
    fields.insert("user_id".to_string(), Value::Null);
    let unit_id = state.store.save("unit", fields).await?;
    Ok(ApiResponse::created(
        json!({ "message": format!("Unit with id {unit_id} was created.") }),
    ))
}

/// GET /api/v1/units
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let units = access::get_all(state.store.as_ref(), "unit").await?;
    let units: Vec<Value> = units.iter().map(|u| u.to_value()).collect();
    Ok(ApiResponse::success(json!({ "units": units })))
}

/// GET /api/v1/units/:unit_id
pub async fn show(State(state): State<AppState>, Path(unit_id): Path<i64>) -> ApiResult<Value> {
    let unit = access::get_one(state.store.as_ref(), "unit", unit_id).await?;
    Ok(ApiResponse::success(json!({ "unit": unit.to_value() })))
}

/// PUT /api/v1/units/:unit_id
pub async fn update(
    State(state): State<AppState>,
    Path(unit_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let unit = access::get_one(store, "unit", unit_id).await?;
    update_resource(store, &payload, &unit).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Unit with id {unit_id} was updated.") }),
    ))
}

/// DELETE /api/v1/units/:unit_id
pub async fn remove(State(state): State<AppState>, Path(unit_id): Path<i64>) -> ApiResult<Value> {
    let store = state.store.as_ref();
    access::get_one(store, "unit", unit_id).await?;
    store.delete("unit", unit_id).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Unit with id {unit_id} was deleted.") }),
    ))
}
