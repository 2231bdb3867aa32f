// src/middleware/auth.rs
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::models::user::Role;
use crate::state::AppState;

/// Identity resolved from the caller's bearer token. Inserted as a request
/// extension and passed explicitly into every handler.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

    // Expect "Bearer <token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid Authorization format"))?;

    let claims = verify_token(token, &state.config.jwt.secret)?;

    req.extensions_mut().insert(AuthContext {
        user_id: claims.uid,
        username: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}
