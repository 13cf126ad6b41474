use axum::response::Json;
use serde_json::{json, Value};

/// GET / and GET /api/v1 - public landing with the API surface.
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "status": "success",
        "data": {
            "name": "Estate Manager API",
            "version": version,
            "message": "Welcome to Real Estate Manager.",
            "endpoints": {
                "signin": "/api/v1/signin (public)",
                "users": "/api/v1/users[/:user_id] (POST public, reads protected)",
                "boards": "/api/v1/boards[/:board_id] (protected)",
                "estates": "/api/v1/estates[/:estate_id] (protected)",
                "units": "/api/v1/units[/:unit_id] (protected)",
                "roles": "/api/v1/roles[/:role_id] (protected, mutation requires admin)",
                "conversations": "/api/v1/conversations[/:conversation_id] (protected)",
                "messages": "/api/v1/conversations/:conversation_id/messages (protected)",
            }
        }
    }))
}
