use axum::extract::{Json, State};
use serde_json::{json, Value};

use crate::auth::{digest, Identity};
use crate::error::{ApiError, Failure};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::validate_required_fields;

use super::users::find_user_by_email;

/// POST /api/v1/signin - authenticate and receive a token.
pub async fn signin(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    if let Err(missing) = validate_required_fields(&["email", "password"], &payload, false) {
        return Err(ApiError::Validation { missing });
    }
    let email = payload["email"].as_str().unwrap_or_default();
    let password = payload["password"].as_str().unwrap_or_default();

    let user = find_user_by_email(state.store.as_ref(), email).await?;
    if user.str_field("password") != digest(password) {
        return Err(ApiError::BadRequest(Failure::new(
            "Wrong password.",
            "Recover the password if necessary.",
        )));
    }

    let roles = user
        .field("roles")
        .and_then(Value::as_array)
        .map(|titles| {
            titles
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let identity = Identity {
        id: user.id,
        email: user.str_field("email").to_string(),
        name: user.str_field("name").to_string(),
        roles,
    };
    let token = state.tokens.create_token(&identity)?;
    tracing::info!(user_id = identity.id, "user signed in");

    Ok(ApiResponse::success(json!({
        "message": "Welcome to Real Estate Manager.",
        "token": token,
    })))
}
