use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::auth::{delete_me, login, logout, me, register, update_me};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let open = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout));

    let protected = Router::new()
        .route("/auth/me", get(me).put(update_me).delete(delete_me))
        .layer(middleware::from_fn_with_state(state, require_auth));

    open.merge(protected)
}
