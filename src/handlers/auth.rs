// src/handlers/auth.rs
use axum::extract::{Extension, State};
use axum::Json;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Local;
use http::StatusCode;
use tracing::{info, instrument};

use crate::auth::jwt::sign_token;
use crate::dtos::auth::{
    AuthResponse, LoginRequest, MessageResponse, RegisterRequest, UpdateUserRequest, UserResponse,
};
use crate::error::{map_unique_violation, AppError};
use crate::middleware::auth::AuthContext;
use crate::models::user::{User, USER_COLUMNS};
use crate::state::AppState;

fn validate_registration(payload: &RegisterRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::validation("Username is mandatory"));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::validation("A valid email is mandatory"));
    }
    if payload.password.len() < 6 {
        return Err(AppError::validation(
            "Password must be at least 6 characters",
        ));
    }
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(AppError::validation("First and last name are mandatory"));
    }
    Ok(())
}

// POST /auth/register - Create an account and issue a token
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_registration(&payload)?;

    let username_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&payload.username)
            .fetch_one(&state.db_pool)
            .await?;
    if username_taken {
        return Err(AppError::conflict(format!(
            "Username already exists: {}",
            payload.username
        )));
    }

    let email_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&payload.email)
            .fetch_one(&state.db_pool)
            .await?;
    if email_taken {
        return Err(AppError::conflict(format!(
            "Email already exists: {}",
            payload.email
        )));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Hash error: {e}")))?;

    let now = Local::now().naive_local();
    let sql = format!(
        "INSERT INTO users (username, email, password_hash, first_name, last_name, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {USER_COLUMNS}"
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&payload.username)
        .bind(&payload.email)
        .bind(&password_hash)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(now)
        .fetch_one(&state.db_pool)
        .await
        .map_err(|e| map_unique_violation(e, "Username or email already exists"))?;

    let token = sign_token(user.id, &user.username, user.role, &state.config.jwt)?;

    info!(user_id = user.id, username = %user.username, "Registered new user");
    Ok((StatusCode::CREATED, Json(AuthResponse::new(token, &user))))
}

// POST /auth/login - Verify credentials and issue a token
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(&payload.username)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

    let ok = verify(&payload.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;
    if !ok {
        return Err(AppError::unauthorized("Invalid username or password"));
    }

    if !user.enabled {
        return Err(AppError::unauthorized("Account is disabled"));
    }
    if user.account_locked {
        return Err(AppError::unauthorized("Account is locked"));
    }

    let token = sign_token(user.id, &user.username, user.role, &state.config.jwt)?;

    info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(Json(AuthResponse::new(token, &user)))
}

// POST /auth/logout - Stateless; clients discard the token
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out successfully"))
}

// GET /auth/me - Profile of the authenticated user
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = fetch_user(&state, &auth).await?;
    Ok(Json(UserResponse::from(user)))
}

// PUT /auth/me - Patch profile fields; only present fields are applied
#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = fetch_user(&state, &auth).await?;

    if let Some(email) = &payload.email {
        if email != &user.email {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                    .bind(email)
                    .fetch_one(&state.db_pool)
                    .await?;
            if taken {
                return Err(AppError::conflict(format!("Email already exists: {email}")));
            }
        }
    }

    let new_hash = match &payload.new_password {
        Some(new_password) => {
            let current = payload.current_password.as_deref().ok_or_else(|| {
                AppError::validation("Current password is required to change password")
            })?;
            let ok = verify(current, &user.password_hash)
                .map_err(|e| AppError::internal(format!("Password verify error: {e}")))?;
            if !ok {
                return Err(AppError::unauthorized("Current password is incorrect"));
            }
            if new_password.len() < 6 {
                return Err(AppError::validation(
                    "Password must be at least 6 characters",
                ));
            }
            Some(
                hash(new_password, DEFAULT_COST)
                    .map_err(|e| AppError::internal(format!("Hash error: {e}")))?,
            )
        }
        None => None,
    };

    let now = Local::now().naive_local();
    let sql = format!(
        "UPDATE users SET \
         email = COALESCE($1, email), \
         first_name = COALESCE($2, first_name), \
         last_name = COALESCE($3, last_name), \
         password_hash = COALESCE($4, password_hash), \
         updated_at = $5 \
         WHERE id = $6 RETURNING {USER_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, User>(&sql)
        .bind(payload.email)
        .bind(payload.first_name)
        .bind(payload.last_name)
        .bind(new_hash)
        .bind(now)
        .bind(auth.user_id)
        .fetch_one(&state.db_pool)
        .await
        .map_err(|e| map_unique_violation(e, "Email already exists"))?;

    info!(user_id = updated.id, "Updated user profile");
    Ok(Json(UserResponse::from(updated)))
}

// DELETE /auth/me - Remove the account; todos cascade at the store level
#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MessageResponse>, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!(
            "User not found: {}",
            auth.username
        )));
    }

    info!(user_id = auth.user_id, "Deleted account");
    Ok(Json(MessageResponse::new("Account deleted successfully")))
}

async fn fetch_user(state: &AppState, auth: &AuthContext) -> Result<User, AppError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, User>(&sql)
        .bind(auth.user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User not found: {}", auth.username)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration(&request()).is_ok());
    }

    #[test]
    fn blank_username_is_rejected() {
        let mut payload = request();
        payload.username = "   ".to_string();
        assert!(matches!(
            validate_registration(&payload),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn email_must_look_like_an_email() {
        let mut payload = request();
        payload.email = "not-an-email".to_string();
        assert!(validate_registration(&payload).is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        let mut payload = request();
        payload.password = "12345".to_string();
        assert!(validate_registration(&payload).is_err());
    }
}
