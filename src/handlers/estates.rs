use axum::extract::{Json, Path, State};
use serde_json::{json, Map, Value};

use crate::access::{self, update_resource};
use crate::error::{ApiError, Failure};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::validate_required_fields;

/// POST /api/v1/estates - every estate starts with an empty payment record.
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Value> {
    if let Err(missing) = validate_required_fields(&["address"], &payload, false) {
        return Err(ApiError::Validation { missing });
    }
    let store = state.store.as_ref();

    let mut fields = Map::new();
    fields.insert("address".to_string(), payload["address"].clone());
    fields.insert("board_id".to_string(), Value::Null);
    fields.insert("payment_id".to_string(), Value::Null);
    let estate_id = store.save("estate", fields).await?;

    let mut payment = Map::new();
    payment.insert("balance".to_string(), json!(0.0));
    payment.insert("required".to_string(), json!(0.0));
    payment.insert("estate_id".to_string(), json!(estate_id));
    let payment_id = store.save("payment", payment).await?;

    let estate = access::get_one(store, "estate", estate_id).await?;
    let mut patch = Map::new();
    patch.insert("payment_id".to_string(), json!(payment_id));
    store.update(&estate, &patch).await?;

    Ok(ApiResponse::created(
        json!({ "message": format!("Estate with id {estate_id} was created.") }),
    ))
}

/// GET /api/v1/estates
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let estates = access::get_all(state.store.as_ref(), "estate").await?;
    let estates: Vec<Value> = estates.iter().map(|e| e.to_value()).collect();
    Ok(ApiResponse::success(json!({ "estates": estates })))
}

/// GET /api/v1/estates/:estate_id
pub async fn show(State(state): State<AppState>, Path(estate_id): Path<i64>) -> ApiResult<Value> {
    let estate = access::get_one(state.store.as_ref(), "estate", estate_id).await?;
    Ok(ApiResponse::success(json!({ "estate": estate.to_value() })))
}

/// PUT /api/v1/estates/:estate_id
pub async fn update(
    State(state): State<AppState>,
    Path(estate_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let estate = access::get_one(store, "estate", estate_id).await?;
    update_resource(store, &payload, &estate).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Estate with id {estate_id} was updated.") }),
    ))
}

/// DELETE /api/v1/estates/:estate_id
pub async fn remove(State(state): State<AppState>, Path(estate_id): Path<i64>) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let estate = access::get_one(store, "estate", estate_id).await?;
    if let Some(payment_id) = estate.i64_field("payment_id") {
        store.delete("payment", payment_id).await?;
    }
    store.delete("estate", estate_id).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Estate with id {estate_id} was deleted.") }),
    ))
}

/// GET /api/v1/estates/:estate_id/payment
pub async fn payment(State(state): State<AppState>, Path(estate_id): Path<i64>) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let estate = access::get_one(store, "estate", estate_id).await?;
    let payment_id = estate.i64_field("payment_id").ok_or_else(|| {
        ApiError::NotFound(Failure::new(
            "The estate has no payment record.",
            "Ensure the estate was fully created.",
        ))
    })?;
    let payment = access::get_one(store, "payment", payment_id).await?;
    Ok(ApiResponse::success(json!({ "payment": payment.to_value() })))
}
