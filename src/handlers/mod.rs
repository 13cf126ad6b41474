pub mod auth;
pub mod boards;
pub mod conversations;
pub mod estates;
pub mod messages;
pub mod roles;
pub mod units;
pub mod users;
pub mod welcome;

use axum::{
    handler::Handler,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{require_role, require_token};
use crate::state::AppState;

/// Assemble the full application router. Reads and mutations sit behind
/// `require_token`; role and user deletion mutations additionally require
/// the `admin` role.
pub fn routes(state: AppState) -> Router {
    let authed = from_fn_with_state(state.clone(), require_token);
    let admin = from_fn(|req, next| require_role("admin", req, next));

    let public = Router::new()
        .route("/", get(welcome::root))
        .route("/api/v1", get(welcome::root))
        .route("/api/v1/signin", post(auth::signin));

    // Registration is public; everything else on /users needs a token.
    let users = Router::new()
        .route(
            "/api/v1/users",
            post(users::create).get(users::list.layer(authed.clone())),
        )
        .route(
            "/api/v1/users/:user_id",
            get(users::show.layer(authed.clone()))
                .put(users::update.layer(authed.clone()))
                .delete(users::remove.layer(admin.clone()).layer(authed.clone())),
        )
        .route(
            "/api/v1/users/:user_id/roles",
            get(users::roles.layer(authed.clone())),
        )
        .route(
            "/api/v1/users/:user_id/wallet",
            get(users::wallet.layer(authed.clone())),
        );

    let protected = Router::new()
        .route("/api/v1/boards", get(boards::list).post(boards::create))
        .route(
            "/api/v1/boards/:board_id",
            get(boards::show).put(boards::update).delete(boards::remove),
        )
        .route("/api/v1/boards/:board_id/members", get(boards::members))
        .route("/api/v1/estates", get(estates::list).post(estates::create))
        .route(
            "/api/v1/estates/:estate_id",
            get(estates::show)
                .put(estates::update)
                .delete(estates::remove),
        )
        .route("/api/v1/estates/:estate_id/payment", get(estates::payment))
        .route("/api/v1/units", get(units::list).post(units::create))
        .route(
            "/api/v1/units/:unit_id",
            get(units::show).put(units::update).delete(units::remove),
        )
        .route(
            "/api/v1/roles",
            get(roles::list).post(roles::create.layer(admin.clone())),
        )
        .route(
            "/api/v1/roles/:role_id",
            get(roles::show)
                .put(roles::update.layer(admin.clone()))
                .delete(roles::remove.layer(admin)),
        )
        .route("/api/v1/roles/:role_id/users", get(roles::users))
        .route(
            "/api/v1/conversations",
            get(conversations::list).post(conversations::create),
        )
        .route(
            "/api/v1/conversations/:conversation_id",
            get(conversations::show),
        )
        .route(
            "/api/v1/conversations/:conversation_id/messages",
            get(messages::list).post(messages::create),
        )
        .route(
            "/api/v1/conversations/:conversation_id/messages/:message_id",
            get(messages::show)
                .put(messages::update)
                .delete(messages::remove),
        )
        .route_layer(authed);

    Router::new()
        .merge(public)
        .merge(users)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
