use axum::extract::{Extension, Json, Path, State};
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::error::{ApiError, Failure};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::store::{Resource, Store};

use super::users::resolve_member_ids;

fn is_participant(conversation: &Resource, user_id: i64) -> bool {
    conversation
        .field("participants")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().any(|id| id.as_i64() == Some(user_id)))
        .unwrap_or(false)
}

/// Conversations of the authenticated user, identified via the token
/// payload. An empty set is a Failure like everywhere else.
pub(crate) async fn conversations_of(
    store: &dyn Store,
    user_id: i64,
) -> Result<Vec<Resource>, ApiError> {
    let conversations: Vec<Resource> = store
        .get_all("conversation")
        .await?
        .into_iter()
        .filter(|c| is_participant(c, user_id))
        .collect();
    if conversations.is_empty() {
        return Err(ApiError::NotFound(Failure::new(
            "The user has no conversations.",
            "Open at least one conversation.",
        )));
    }
    Ok(conversations)
}

/// One conversation of the authenticated user.
pub(crate) async fn conversation_of(
    store: &dyn Store,
    user_id: i64,
    conversation_id: i64,
) -> Result<Resource, ApiError> {
    conversations_of(store, user_id)
        .await?
        .into_iter()
        .find(|c| c.id == conversation_id)
        .ok_or_else(|| {
            ApiError::NotFound(Failure::new(
                "The conversation does not exist.",
                "Ensure conversation_id is existent.",
            ))
        })
}

/// GET /api/v1/conversations
pub async fn list(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let conversations = conversations_of(state.store.as_ref(), auth_user.id).await?;
    let conversations: Vec<Value> = conversations.iter().map(|c| c.to_value()).collect();
    Ok(ApiResponse::success(
        json!({ "conversations": conversations }),
    ))
}

/// GET /api/v1/conversations/:conversation_id
pub async fn show(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(conversation_id): Path<i64>,
) -> ApiResult<Value> {
    let conversation =
        conversation_of(state.store.as_ref(), auth_user.id, conversation_id).await?;
    Ok(ApiResponse::success(
        json!({ "conversation": conversation.to_value() }),
    ))
}

/// POST /api/v1/conversations - the participants list is required (it may be
/// empty) and every listed id must name an existing user; the creator always
/// participates.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    payload: Option<Json<Value>>,
) -> ApiResult<Value> {
    let payload = payload.map(|Json(p)| p).unwrap_or(Value::Null);
    let entries = match payload.get("participants") {
        Some(Value::Array(entries)) => entries.clone(),
        _ => {
            return Err(ApiError::BadRequest(Failure::new(
                "Participants list required.",
                "It can be empty if conversing with oneself.",
            )))
        }
    };
    let mut participants = resolve_member_ids(state.store.as_ref(), &entries).await?;
    if !participants.contains(&auth_user.id) {
        participants.push(auth_user.id);
    }
    let mut fields = Map::new();
    fields.insert(
        "title".to_string(),
        payload.get("title").cloned().unwrap_or(Value::Null),
    );
    fields.insert("participants".to_string(), json!(participants));
    fields.insert("timestamp".to_string(), json!(Utc::now().timestamp()));
    fields.insert("board_id".to_string(), Value::Null);
    let conversation_id = state.store.save("conversation", fields).await?;
    Ok(ApiResponse::created(json!({
        "message": format!("Conversation with id {conversation_id} was created."),
    })))
}
