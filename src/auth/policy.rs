// src/auth/policy.rs
//
// Single place that decides who may touch a todo. Handlers never branch on
// the role themselves.
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::todo::Todo;
use crate::models::user::Role;

pub fn is_admin(auth: &AuthContext) -> bool {
    auth.role == Role::Admin
}

pub fn can_access(owner_id: i64, auth: &AuthContext) -> bool {
    is_admin(auth) || owner_id == auth.user_id
}

/// Fails with Forbidden when the acting user is neither the owner nor an
/// admin. Called before every read/mutate/delete of an individual todo.
pub fn ensure_can_access(todo: &Todo, auth: &AuthContext) -> Result<(), AppError> {
    if can_access(todo.user_id, auth) {
        return Ok(());
    }
    Err(AppError::forbidden(
        "You don't have permission to access this todo",
    ))
}

/// Owner filter for list/search/stats queries: `Some(user_id)` restricts to
/// the acting user's rows, `None` (admin) leaves the query unrestricted.
pub fn owner_scope(auth: &AuthContext) -> Option<i64> {
    if is_admin(auth) {
        None
    } else {
        Some(auth.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::models::todo::Priority;

    fn ctx(user_id: i64, role: Role) -> AuthContext {
        AuthContext {
            user_id,
            username: format!("user{user_id}"),
            role,
        }
    }

    fn todo_owned_by(user_id: i64) -> Todo {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Todo {
            id: 1,
            title: "write report".to_string(),
            description: None,
            completed: false,
            priority: Priority::Medium,
            created_at: now,
            updated_at: now,
            due_date: None,
            user_id,
        }
    }

    #[test]
    fn owner_can_access_own_todo() {
        let todo = todo_owned_by(7);
        assert!(ensure_can_access(&todo, &ctx(7, Role::User)).is_ok());
    }

    #[test]
    fn non_owner_is_forbidden() {
        let todo = todo_owned_by(7);
        match ensure_can_access(&todo, &ctx(8, Role::User)) {
            Err(AppError::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[test]
    fn admin_overrides_ownership() {
        let todo = todo_owned_by(7);
        assert!(ensure_can_access(&todo, &ctx(999, Role::Admin)).is_ok());
    }

    #[test]
    fn owner_scope_restricts_regular_users_only() {
        assert_eq!(owner_scope(&ctx(7, Role::User)), Some(7));
        assert_eq!(owner_scope(&ctx(7, Role::Admin)), None);
    }
}
