use axum::{
    middleware,
    routing::{delete, get, patch},
    Router,
};

use crate::handlers::todo::{
    complete_todo, create_todo, delete_completed_todos, delete_todo, get_todo, incomplete_todo,
    list_by_completed, list_by_priority, list_overdue, list_todos, search_todos, todo_stats,
    toggle_todo, update_todo,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    // Static segments must be registered beside /todos/{id}; the router
    // prefers the literal match.
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/search", get(search_todos))
        .route("/todos/overdue", get(list_overdue))
        .route("/todos/stats", get(todo_stats))
        .route("/todos/completed", delete(delete_completed_todos))
        .route("/todos/completed/{completed}", get(list_by_completed))
        .route("/todos/priority/{priority}", get(list_by_priority))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/todos/{id}/complete", patch(complete_todo))
        .route("/todos/{id}/incomplete", patch(incomplete_todo))
        .route("/todos/{id}/toggle", patch(toggle_todo))
        .layer(middleware::from_fn_with_state(state, require_auth))
}
