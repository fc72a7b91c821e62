//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use library_core::domain::{Role, User};
use std::sync::Arc;
use tracing::{error, warn};

use crate::web::flash::{reject, FlashError};
use crate::web::state::AppState;

/// The logged-in account, inserted into request extensions by the middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub role: Role,
    pub first_name: String,
    pub email: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            role: user.role,
            first_name: user.first_name,
            email: user.email,
        }
    }
}

/// Reads the auth session id from the `session` cookie.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}

async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser, FlashError> {
    let unauthorized = || reject(StatusCode::UNAUTHORIZED, "Please log in first.");

    // 1. Parse session ID from cookie
    let auth_session_id = session_cookie(headers).ok_or_else(unauthorized)?;

    // 2. Validate auth session in database, get user_id
    let user_id = state
        .db
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            warn!("Failed to validate auth session: {:?}", e);
            unauthorized()
        })?;

    // 3. Load the account behind the session
    let user = state.db.get_user_by_id(user_id).await.map_err(|e| {
        error!("Session {} points at a missing user: {:?}", auth_session_id, e);
        unauthorized()
    })?;

    Ok(user.into())
}

/// Middleware that validates the auth session cookie and loads the user.
///
/// If valid, inserts a [`CurrentUser`] into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, FlashError> {
    let user = resolve_user(&state, req.headers()).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Like [`require_auth`], but additionally answers 403 for non-admin accounts.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, FlashError> {
    let user = resolve_user(&state, req.headers()).await?;
    if !user.role.is_admin() {
        warn!("User {} tried to reach admin route {}", user.id, req.uri());
        return Err(reject(StatusCode::FORBIDDEN, "Admin access required."));
    }
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
