use axum::extract::{Extension, Json, Path, Query, State};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::access::{self, update_resource};
use crate::auth::digest;
use crate::error::{ApiError, Failure};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::store::{Resource, Store};
use crate::validation::validate_required_fields;

/// Fields never exposed to clients.
const HIDDEN: &[&str] = &["password"];

/// Exact-match lookup by unique email (compared case-insensitively).
pub(crate) async fn find_user_by_email(
    store: &dyn Store,
    email: &str,
) -> Result<Resource, ApiError> {
    let users = store.get_all("user").await?;
    users
        .into_iter()
        .find(|u| u.str_field("email").eq_ignore_ascii_case(email))
        .ok_or_else(|| {
            ApiError::NotFound(Failure::new(
                "The user does not exist.",
                "Ensure arguments are of existent object.",
            ))
        })
}

/// Resolve a JSON list of user ids, failing with the offending entry when
/// one does not name an existing user.
pub(crate) async fn resolve_member_ids(
    store: &dyn Store,
    entries: &[Value],
) -> Result<Vec<i64>, ApiError> {
    let mut ids = Vec::with_capacity(entries.len());
    for entry in entries {
        let resolved = match entry.as_i64() {
            Some(id) => store.get("user", id).await?.map(|_| id),
            None => None,
        };
        match resolved {
            Some(id) => ids.push(id),
            None => {
                return Err(ApiError::NotFound(
                    Failure::new(
                        "The user does not exist.",
                        "Ensure arguments are of existent object.",
                    )
                    .with_missing_user(entry.clone()),
                ))
            }
        }
    }
    Ok(ids)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Substring search against user names.
    pub name: Option<String>,
}

/// POST /api/v1/users - public registration. Creates the user with the
/// seeded `basic` role and a fresh wallet.
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Value> {
    let required = ["email", "name", "password", "phone_number"];
    if let Err(missing) = validate_required_fields(&required, &payload, false) {
        return Err(ApiError::Validation { missing });
    }
    let email = payload["email"].as_str().unwrap_or_default();
    let store = state.store.as_ref();

    if find_user_by_email(store, email).await.is_ok() {
        return Err(ApiError::Conflict(Failure::new(
            "A user with the email already exists.",
            "Sign in instead, or recover the password.",
        )));
    }

    let mut fields = Map::new();
    fields.insert("email".to_string(), json!(email));
    fields.insert("name".to_string(), payload["name"].clone());
    fields.insert("phone_number".to_string(), payload["phone_number"].clone());
    fields.insert(
        "password".to_string(),
        json!(digest(payload["password"].as_str().unwrap_or_default())),
    );
    fields.insert("roles".to_string(), json!(["basic"]));
    fields.insert("wallet_id".to_string(), Value::Null);
    let user_id = store.save("user", fields).await?;

    let mut wallet = Map::new();
    wallet.insert("balance".to_string(), json!(0.0));
    wallet.insert("user_id".to_string(), json!(user_id));
    let wallet_id = store.save("wallet", wallet).await?;

    let user = access::get_one(store, "user", user_id).await?;
    let mut patch = Map::new();
    patch.insert("wallet_id".to_string(), json!(wallet_id));
    store.update(&user, &patch).await?;

    tracing::info!(user_id, "user registered");
    Ok(ApiResponse::created(json!({
        "message": format!("User with id {user_id} was created."),
    })))
}

/// GET /api/v1/users - list users, or search by name with `?name=`.
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let users = match query.name.as_deref() {
        Some(name) => access::search(store, "user", "name", name)
            .await
            .map_err(|err| match err {
                // reword the empty-match failure, let engine failures through
                ApiError::NotFound(_) => ApiError::NotFound(Failure::new(
                    "No users with the name in the database.",
                    "Try searching with another name.",
                )),
                other => other,
            })?,
        None => access::get_all(store, "user").await?,
    };
    let users: Vec<Value> = users.iter().map(|u| u.to_value_without(HIDDEN)).collect();
    Ok(ApiResponse::success(json!({ "users": users })))
}

/// GET /api/v1/users/:user_id
pub async fn show(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<Value> {
    let user = access::get_one(state.store.as_ref(), "user", user_id).await?;
    Ok(ApiResponse::success(
        json!({ "user": user.to_value_without(HIDDEN) }),
    ))
}

/// PUT /api/v1/users/:user_id - patch via the generic update helper.
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let user = access::get_one(store, "user", user_id).await?;
    update_resource(store, &payload, &user).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("User with id {user_id} was updated.") }),
    ))
}

/// DELETE /api/v1/users/:user_id - admin only.
pub async fn remove(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let user = access::get_one(store, "user", user_id).await?;
    if let Some(wallet_id) = user.i64_field("wallet_id") {
        store.delete("wallet", wallet_id).await?;
    }
    store.delete("user", user_id).await?;
    Ok(ApiResponse::success(
        json!({ "message": format!("User with id {user_id} was deleted.") }),
    ))
}

/// GET /api/v1/users/:user_id/roles
pub async fn roles(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<Value> {
    let user = access::get_one(state.store.as_ref(), "user", user_id).await?;
    let roles = user.field("roles").cloned().unwrap_or_else(|| json!([]));
    Ok(ApiResponse::success(json!({ "roles": roles })))
}

/// GET /api/v1/users/:user_id/wallet
pub async fn wallet(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let store = state.store.as_ref();
    let user = access::get_one(store, "user", user_id).await?;
    let wallet_id = user.i64_field("wallet_id").ok_or_else(|| {
        ApiError::NotFound(Failure::new(
            "The user has no wallet.",
            "Ensure the user was fully registered.",
        ))
    })?;
    let wallet = access::get_one(store, "wallet", wallet_id).await?;
    tracing::debug!(viewer = auth_user.id, user_id, "wallet viewed");
    Ok(ApiResponse::success(json!({ "wallet": wallet.to_value() })))
}
