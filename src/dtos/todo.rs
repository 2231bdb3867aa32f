// src/dtos/todo.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::todo::{Priority, Todo};

/// Date fields arrive as strings and go through the flexible parser in the
/// handler, so a bare `yyyy-MM-dd` works the same as a full timestamp.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        TodoResponse {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            priority: todo.priority,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
            due_date: todo.due_date,
        }
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub high_priority: i64,
    pub medium_priority: i64,
    pub low_priority: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTodoResponse {
    pub message: String,
    pub deleted_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCompletedResponse {
    pub message: String,
    pub deleted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn todo_response_uses_camel_case_and_iso_dates() {
        let created = NaiveDate::from_ymd_opt(2026, 2, 3)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let todo = Todo {
            id: 5,
            title: "buy milk".to_string(),
            description: Some("2 liters".to_string()),
            completed: false,
            priority: Priority::High,
            created_at: created,
            updated_at: created,
            due_date: NaiveDate::from_ymd_opt(2026, 2, 4)
                .unwrap()
                .and_hms_opt(0, 0, 0),
            user_id: 9,
        };

        let json = serde_json::to_value(TodoResponse::from(todo)).unwrap();
        assert_eq!(json["priority"], "HIGH");
        assert_eq!(json["createdAt"], "2026-02-03T08:00:00");
        assert_eq!(json["dueDate"], "2026-02-04T00:00:00");
        assert!(json.get("userId").is_none());
    }

    #[test]
    fn stats_serialize_with_the_expected_keys() {
        let stats = TodoStats {
            total: 6,
            completed: 2,
            pending: 4,
            high_priority: 1,
            medium_priority: 3,
            low_priority: 2,
        };
        let json = serde_json::to_value(&stats).unwrap();
        for key in [
            "total",
            "completed",
            "pending",
            "highPriority",
            "mediumPriority",
            "lowPriority",
        ] {
            assert!(json.get(key).is_some(), "missing stats key {key}");
        }
    }

    #[test]
    fn update_request_treats_absent_fields_as_no_change() {
        let patch: TodoUpdateRequest = serde_json::from_str("{\"completed\":true}").unwrap();
        assert_eq!(patch.completed, Some(true));
        assert!(patch.title.is_none());
        assert!(patch.due_date.is_none());
    }
}
