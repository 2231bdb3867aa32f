// src/handlers/todo.rs
use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use chrono::Local;
use http::StatusCode;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::auth::policy;
use crate::datetime;
use crate::dtos::todo::{
    DeletedCompletedResponse, DeletedTodoResponse, TodoCreateRequest, TodoResponse, TodoStats,
    TodoUpdateRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::todo::{Priority, Todo, TODO_COLUMNS};
use crate::state::AppState;

/// Owner filter shared by every list/search/stats query. A NULL bind
/// (admin) leaves the query unrestricted.
const OWNER_FILTER: &str = "($1::BIGINT IS NULL OR user_id = $1)";

/// Priority DESC (HIGH first), earliest due date next (no due date last),
/// creation time as the tie-break.
const PRIORITY_ORDER: &str = "ORDER BY CASE priority \
                              WHEN 'HIGH' THEN 1 \
                              WHEN 'MEDIUM' THEN 2 \
                              ELSE 3 END, \
                              due_date ASC NULLS LAST, created_at ASC";

fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::validation("Title is mandatory"));
    }
    if title.chars().count() > 200 {
        return Err(AppError::validation(
            "Title must be less than 200 characters",
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.chars().count() > 1000 {
        return Err(AppError::validation(
            "Description must be less than 1000 characters",
        ));
    }
    Ok(())
}

/// Loads a todo by id and enforces the access policy. Absent rows are a 404
/// before ownership is ever considered.
async fn fetch_owned(pool: &PgPool, id: i64, auth: &AuthContext) -> Result<Todo, AppError> {
    let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1");
    let todo = sqlx::query_as::<_, Todo>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Todo not found with id: {id}")))?;
    policy::ensure_can_access(&todo, auth)?;
    Ok(todo)
}

fn to_responses(todos: Vec<Todo>) -> Vec<TodoResponse> {
    todos.into_iter().map(TodoResponse::from).collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListTodosParams {
    pub order_by_priority: bool,
}

// GET /todos - List todos, optionally ordered by priority
#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<ListTodosParams>,
) -> Result<Json<Vec<TodoResponse>>, AppError> {
    let order = if params.order_by_priority {
        PRIORITY_ORDER
    } else {
        "ORDER BY id"
    };
    let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE {OWNER_FILTER} {order}");
    let todos = sqlx::query_as::<_, Todo>(&sql)
        .bind(policy::owner_scope(&auth))
        .fetch_all(&state.db_pool)
        .await?;
    Ok(Json(to_responses(todos)))
}

// GET /todos/:id - Get a single todo
#[instrument(skip(state), fields(id))]
pub async fn get_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, AppError> {
    let todo = fetch_owned(&state.db_pool, id, &auth).await?;
    Ok(Json(TodoResponse::from(todo)))
}

// GET /todos/completed/:completed - Filter by completion status
#[instrument(skip(state))]
pub async fn list_by_completed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(completed): Path<bool>,
) -> Result<Json<Vec<TodoResponse>>, AppError> {
    let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE {OWNER_FILTER} AND completed = $2 ORDER BY id");
    let todos = sqlx::query_as::<_, Todo>(&sql)
        .bind(policy::owner_scope(&auth))
        .bind(completed)
        .fetch_all(&state.db_pool)
        .await?;
    Ok(Json(to_responses(todos)))
}

// GET /todos/priority/:priority - Filter by priority
#[instrument(skip(state))]
pub async fn list_by_priority(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(priority): Path<Priority>,
) -> Result<Json<Vec<TodoResponse>>, AppError> {
    let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE {OWNER_FILTER} AND priority = $2 ORDER BY id");
    let todos = sqlx::query_as::<_, Todo>(&sql)
        .bind(policy::owner_scope(&auth))
        .bind(priority)
        .fetch_all(&state.db_pool)
        .await?;
    Ok(Json(to_responses(todos)))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub title: String,
}

// GET /todos/search?title= - Case-insensitive title containment
#[instrument(skip(state))]
pub async fn search_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<TodoResponse>>, AppError> {
    let sql = format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE {OWNER_FILTER} \
         AND title ILIKE '%' || $2 || '%' ORDER BY id"
    );
    let todos = sqlx::query_as::<_, Todo>(&sql)
        .bind(policy::owner_scope(&auth))
        .bind(&params.title)
        .fetch_all(&state.db_pool)
        .await?;
    Ok(Json(to_responses(todos)))
}

// GET /todos/overdue - Pending todos whose due date has passed
#[instrument(skip(state))]
pub async fn list_overdue(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<TodoResponse>>, AppError> {
    let now = Local::now().naive_local();
    let sql = format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE {OWNER_FILTER} \
         AND completed = FALSE AND due_date < $2 ORDER BY due_date ASC"
    );
    let todos = sqlx::query_as::<_, Todo>(&sql)
        .bind(policy::owner_scope(&auth))
        .bind(now)
        .fetch_all(&state.db_pool)
        .await?;
    Ok(Json(to_responses(todos)))
}

// GET /todos/stats - Counts by completion and priority
#[instrument(skip(state))]
pub async fn todo_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<TodoStats>, AppError> {
    let sql = format!(
        "SELECT COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE completed) AS completed, \
                COUNT(*) FILTER (WHERE NOT completed) AS pending, \
                COUNT(*) FILTER (WHERE priority = 'HIGH') AS high_priority, \
                COUNT(*) FILTER (WHERE priority = 'MEDIUM') AS medium_priority, \
                COUNT(*) FILTER (WHERE priority = 'LOW') AS low_priority \
         FROM todos WHERE {OWNER_FILTER}"
    );
    let stats = sqlx::query_as::<_, TodoStats>(&sql)
        .bind(policy::owner_scope(&auth))
        .fetch_one(&state.db_pool)
        .await?;
    Ok(Json(stats))
}

// POST /todos - Create a todo owned by the acting user
#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<TodoCreateRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), AppError> {
    validate_title(&payload.title)?;
    if let Some(description) = &payload.description {
        validate_description(description)?;
    }
    let due_date = datetime::parse_optional(payload.due_date.as_deref())?;

    let now = Local::now().naive_local();
    let sql = format!(
        "INSERT INTO todos (title, description, completed, priority, due_date, user_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7) RETURNING {TODO_COLUMNS}"
    );
    let todo = sqlx::query_as::<_, Todo>(&sql)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.completed.unwrap_or(false))
        .bind(payload.priority.unwrap_or(Priority::Medium))
        .bind(due_date)
        .bind(auth.user_id)
        .bind(now)
        .fetch_one(&state.db_pool)
        .await?;

    info!(todo_id = todo.id, user_id = auth.user_id, "Created todo");
    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

// PUT /todos/:id - Patch a todo; only present fields are applied
#[instrument(skip(state, payload), fields(id))]
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<TodoUpdateRequest>,
) -> Result<Json<TodoResponse>, AppError> {
    fetch_owned(&state.db_pool, id, &auth).await?;

    if let Some(title) = &payload.title {
        validate_title(title)?;
    }
    if let Some(description) = &payload.description {
        validate_description(description)?;
    }
    let due_date = datetime::parse_optional(payload.due_date.as_deref())?;

    let now = Local::now().naive_local();
    let sql = format!(
        "UPDATE todos SET \
         title = COALESCE($1, title), \
         description = COALESCE($2, description), \
         completed = COALESCE($3, completed), \
         priority = COALESCE($4, priority), \
         due_date = COALESCE($5, due_date), \
         updated_at = $6 \
         WHERE id = $7 RETURNING {TODO_COLUMNS}"
    );
    let todo = sqlx::query_as::<_, Todo>(&sql)
        .bind(payload.title)
        .bind(payload.description)
        .bind(payload.completed)
        .bind(payload.priority)
        .bind(due_date)
        .bind(now)
        .bind(id)
        .fetch_one(&state.db_pool)
        .await?;

    info!(todo_id = id, "Updated todo");
    Ok(Json(TodoResponse::from(todo)))
}

async fn set_completed(
    state: &AppState,
    auth: &AuthContext,
    id: i64,
    completed: bool,
) -> Result<Todo, AppError> {
    fetch_owned(&state.db_pool, id, auth).await?;

    let now = Local::now().naive_local();
    let sql = format!(
        "UPDATE todos SET completed = $2, updated_at = $3 WHERE id = $1 RETURNING {TODO_COLUMNS}"
    );
    let todo = sqlx::query_as::<_, Todo>(&sql)
        .bind(id)
        .bind(completed)
        .bind(now)
        .fetch_one(&state.db_pool)
        .await?;

    info!(todo_id = id, completed, "Set todo completion");
    Ok(todo)
}

// PATCH /todos/:id/complete
#[instrument(skip(state), fields(id))]
pub async fn complete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, AppError> {
    let todo = set_completed(&state, &auth, id, true).await?;
    Ok(Json(TodoResponse::from(todo)))
}

// PATCH /todos/:id/incomplete
#[instrument(skip(state), fields(id))]
pub async fn incomplete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, AppError> {
    let todo = set_completed(&state, &auth, id, false).await?;
    Ok(Json(TodoResponse::from(todo)))
}

// PATCH /todos/:id/toggle - Flip completion in a single UPDATE so concurrent
// toggles cannot lose each other's writes
#[instrument(skip(state), fields(id))]
pub async fn toggle_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<TodoResponse>, AppError> {
    fetch_owned(&state.db_pool, id, &auth).await?;

    let now = Local::now().naive_local();
    let sql = format!(
        "UPDATE todos SET completed = NOT completed, updated_at = $2 \
         WHERE id = $1 RETURNING {TODO_COLUMNS}"
    );
    let todo = sqlx::query_as::<_, Todo>(&sql)
        .bind(id)
        .bind(now)
        .fetch_one(&state.db_pool)
        .await?;

    info!(todo_id = id, completed = todo.completed, "Toggled todo");
    Ok(Json(TodoResponse::from(todo)))
}

// DELETE /todos/:id
#[instrument(skip(state), fields(id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedTodoResponse>, AppError> {
    fetch_owned(&state.db_pool, id, &auth).await?;

    sqlx::query("DELETE FROM todos WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;

    info!(todo_id = id, "Deleted todo");
    Ok(Json(DeletedTodoResponse {
        message: "Todo deleted successfully".to_string(),
        deleted_id: id,
    }))
}

// DELETE /todos/completed - Bulk-delete completed todos in scope
#[instrument(skip(state))]
pub async fn delete_completed_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<DeletedCompletedResponse>, AppError> {
    let sql = format!("DELETE FROM todos WHERE {OWNER_FILTER} AND completed = TRUE");
    let result = sqlx::query(&sql)
        .bind(policy::owner_scope(&auth))
        .execute(&state.db_pool)
        .await?;

    let deleted = result.rows_affected();
    info!(deleted, user_id = auth.user_id, "Deleted completed todos");
    Ok(Json(DeletedCompletedResponse {
        message: "All completed todos deleted successfully".to_string(),
        deleted_count: deleted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_boundary_is_200_chars() {
        let exactly = "x".repeat(200);
        assert!(validate_title(&exactly).is_ok());

        let over = "x".repeat(201);
        assert!(matches!(
            validate_title(&over),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn description_boundary_is_1000_chars() {
        assert!(validate_description(&"d".repeat(1000)).is_ok());
        assert!(validate_description(&"d".repeat(1001)).is_err());
    }

    #[test]
    fn list_params_default_to_unordered() {
        let params: ListTodosParams = serde_json::from_str("{}").unwrap();
        assert!(!params.order_by_priority);
    }
}
