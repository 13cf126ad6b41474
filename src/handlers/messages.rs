use axum::extract::{Extension, Json, Path, State};
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::access::update_resource;
use crate::error::{ApiError, Failure};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::store::Resource;
use crate::validation::validate_required_fields;

use super::conversations::conversation_of;

async fn messages_of(state: &AppState, conversation_id: i64) -> Result<Vec<Resource>, ApiError> {
    let mut messages: Vec<Resource> = state
        .store
        .get_all("message")
        .await?
        .into_iter()
        .filter(|m| m.i64_field("conversation_id") == Some(conversation_id))
        .collect();
    messages.sort_by_key(|m| m.i64_field("timestamp").unwrap_or_default());
    Ok(messages)
}

async fn message_of(
    state: &AppState,
    conversation_id: i64,
    message_id: i64,
) -> Result<Resource, ApiError> {
    messages_of(state, conversation_id)
        .await?
        .into_iter()
        .find(|m| m.id == message_id)
        .ok_or_else(|| {
            ApiError::NotFound(Failure::new(
                "The message does not exist.",
                "Ensure message_id is existent.",
            ))
        })
}

/// GET /api/v1/conversations/:conversation_id/messages
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(conversation_id): Path<i64>,
) -> ApiResult<Value> {
    conversation_of(state.store.as_ref(), auth_user.id, conversation_id).await?;
    let messages = messages_of(&state, conversation_id).await?;
    if messages.is_empty() {
        return Err(ApiError::NotFound(Failure::new(
            "The conversation has no messages.",
            "Send at least one message.",
        )));
    }
    let messages: Vec<Value> = messages.iter().map(|m| m.to_value()).collect();
    Ok(ApiResponse::success(json!({ "messages": messages })))
}

/// GET /api/v1/conversations/:conversation_id/messages/:message_id
pub async fn show(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
) -> ApiResult<Value> {
    conversation_of(state.store.as_ref(), auth_user.id, conversation_id).await?;
    let message = message_of(&state, conversation_id, message_id).await?;
    Ok(ApiResponse::success(json!({ "message": message.to_value() })))
}

/// PUT /api/v1/conversations/:conversation_id/messages/:message_id - edit a
/// message through the generic update helper; callers flip `edited` in the
/// same patch.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    conversation_of(state.store.as_ref(), auth_user.id, conversation_id).await?;
    let message = message_of(&state, conversation_id, message_id).await?;
    update_resource(state.store.as_ref(), &payload, &message).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Message with id {message_id} was updated.") }),
    ))
}

/// DELETE /api/v1/conversations/:conversation_id/messages/:message_id
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
) -> ApiResult<Value> {
    conversation_of(state.store.as_ref(), auth_user.id, conversation_id).await?;
    message_of(&state, conversation_id, message_id).await?;
    state.store.delete("message", message_id).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("Message with id {message_id} was deleted.") }),
    ))
}

/// POST /api/v1/conversations/:conversation_id/messages
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(conversation_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    conversation_of(state.store.as_ref(), auth_user.id, conversation_id).await?;
    if let Err(missing) = validate_required_fields(&["content"], &payload, false) {
        return Err(ApiError::Validation { missing });
    }
    let mut fields = Map::new();
    fields.insert("content".to_string(), payload["content"].clone());
    fields.insert("sender".to_string(), json!(auth_user.id));
    fields.insert("edited".to_string(), json!(false));
    fields.insert("timestamp".to_string(), json!(Utc::now().timestamp()));
    fields.insert("conversation_id".to_string(), json!(conversation_id));
    let message_id = state.store.save("message", fields).await?;
    Ok(ApiResponse::created(
        json!({ "message": format!("Message with id {message_id} was sent.") }),
    ))
}
