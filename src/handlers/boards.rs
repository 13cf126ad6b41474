use axum::extract::{Json, Path, State};
use serde_json::{json, Map, Value};

use crate::access::{self, update_resource};
use crate::error::{ApiError, Failure};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::users::resolve_member_ids;

/// POST /api/v1/boards - the members list is required (it may be empty) and
/// every listed id must name an existing user.
pub async fn create(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> ApiResult<Value> {
    let payload = payload.map(|Json(p)| p).unwrap_or(Value::Null);
    let entries = match payload.get("members") {
        Some(Value::Array(entries)) => entries.clone(),
        _ => {
            return Err(ApiError::BadRequest(Failure::new(
                "Members list required.",
                "It can be empty if only oneself is a member.",
            )))
        }
    };
    let members = resolve_member_ids(state.store.as_ref(), &entries).await?;
    let mut fields = Map::new();
    fields.insert("members".to_string(), json!(members));
    fields.insert("estates_owned".to_string(), json!([]));
    fields.insert("units_owned".to_string(), json!([]));
    let board_id = state.store.save("board", fields).await?;
    Ok(ApiResponse::created(
        json!({ "message": format!("Board with id {board_id} was created.") }),
    ))
}

/// GET /api/v1/boards
pub async fn list(State(state): State<AppState>) -> ApiResult<Value> {
    let boards = access::get_all(state.store.as_ref(), "board").await?;
    let boards: Vec<Value> = boards.iter().map(|b| b.to_value()).collect();
    Ok(ApiResponse::success(json!({ "boards": boards })))
}

/// GET /api/v1/boards/:board_id
pub async fn show(State(state): State<AppState>, Path(board_id): Path<i64>) -> ApiResult<Value> {
    let board = access::get_one(state.store.as_ref(), "board", board_id).await?;
    Ok(ApiResponse::success(json!({ "board": board.to_value() })))
}

/// PUT /api/v1/boards/:board_id
pub async fn update(
    State(state): State<AppState>,
    Path(board_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let board = access::get_one(store, "board", board_id).await?;
    update_resource(store, &payload, &board).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Board with id {board_id} was updated.") }),
    ))
}

/// DELETE /api/v1/boards/:board_id
pub async fn remove(State(state): State<AppState>, Path(board_id): Path<i64>) -> ApiResult<Value> {
    let store = state.store.as_ref();
    access::get_one(store, "board", board_id).await?;
    store.delete("board", board_id).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Board with id {board_id} was deleted.") }),
    ))
}

/// GET /api/v1/boards/:board_id/members - resolve member ids to public
/// user views.
pub async fn members(State(state): State<AppState>, Path(board_id): Path<i64>) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let board = access::get_one(store, "board", board_id).await?;
    let ids: Vec<i64> = board
        .field("members")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    let mut members = Vec::with_capacity(ids.len());
    for id in ids {
        if let Ok(user) = access::get_one(store, "user", id).await {
            members.push(user.to_value_without(&["password"]));
        }
    }
    Ok(ApiResponse::success(json!({ "members": members })))
}
