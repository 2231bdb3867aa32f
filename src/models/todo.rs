// src/models/todo.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A todo row. Exactly one owner; non-admin access is restricted to the
/// owner's rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub user_id: i64,
}

/// Every column of `todos`, in declaration order.
pub const TODO_COLUMNS: &str =
    "id, title, description, completed, priority, created_at, updated_at, due_date, user_id";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"HIGH\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"LOW\"");
    }

    #[test]
    fn priority_deserializes_from_path_style_values() {
        for (raw, expected) in [
            ("\"LOW\"", Priority::Low),
            ("\"MEDIUM\"", Priority::Medium),
            ("\"HIGH\"", Priority::High),
        ] {
            let parsed: Priority = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, expected);
        }
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
    }
}
