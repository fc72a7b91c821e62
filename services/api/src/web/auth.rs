//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: registration, login, logout and password reset.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use library_core::domain::{split_full_name, AuthSession, NewUser, Role};
use library_core::ports::PortError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::flash::{bad_request, port_failure, reject, Flash, HandlerResult};
use crate::web::forms::filled;
use crate::web::middleware::session_cookie;
use crate::web::state::AppState;
use crate::web::views::UserView;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("email regex is valid"));

const FILL_OUT_FORM: &str = "Please fill out the form!";
const BAD_CREDENTIALS: &str = "Incorrect email or password!";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserView,
    /// Where the client should go next: `/dashboard` for admins, `/library` otherwise.
    pub redirect: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ForgotPasswordForm {
    pub email: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordForm {
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

//=========================================================================================
// Password helpers
//=========================================================================================

pub(crate) fn hash_password(password: &str) -> HandlerResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password.")
        })
}

fn verify_password(password: &str, hashed: &str) -> bool {
    match PasswordHash::new(hashed) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!("Failed to parse password hash: {:?}", e);
            false
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn landing_route(role: Role) -> &'static str {
    if role.is_admin() {
        "/dashboard"
    } else {
        "/library"
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new patron account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Account created", body = Flash),
        (status = 400, description = "Missing field or invalid email", body = Flash),
        (status = 409, description = "Account already exists", body = Flash)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> HandlerResult<impl IntoResponse> {
    let (Some(name), Some(email), Some(password)) = (&form.name, &form.email, &form.password)
    else {
        return Err(bad_request(FILL_OUT_FORM));
    };
    let email = email.trim();

    match state.db.get_user_by_email(email).await {
        Ok(_) => return Err(reject(StatusCode::CONFLICT, "Account already exists!")),
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(port_failure("check for an existing account")(e)),
    }

    if !is_valid_email(email) {
        return Err(bad_request("Invalid email address!"));
    }
    if name.trim().is_empty() || email.is_empty() || password.is_empty() {
        return Err(bad_request(FILL_OUT_FORM));
    }

    let (first_name, last_name) = split_full_name(name);
    let user = state
        .db
        .create_user(NewUser {
            first_name,
            last_name,
            email: email.to_string(),
            hashed_password: hash_password(password)?,
            role: Role::User,
        })
        .await
        .map_err(port_failure("create the account"))?;

    info!("Registered user {} ({})", user.id, user.email);
    Ok((
        StatusCode::CREATED,
        Json(Flash::success("You have successfully registered!")),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = Flash),
        (status = 500, description = "Internal server error", body = Flash)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> HandlerResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (filled(&form.email), form.password.as_deref()) else {
        return Err(reject(StatusCode::UNAUTHORIZED, BAD_CREDENTIALS));
    };

    // 1. Get user by email
    let creds = match state.db.get_user_by_email(email).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => {
            return Err(reject(StatusCode::UNAUTHORIZED, BAD_CREDENTIALS))
        }
        Err(e) => return Err(port_failure("look up the account")(e)),
    };

    // 2. Verify password
    if !verify_password(password, &creds.hashed_password) {
        return Err(reject(StatusCode::UNAUTHORIZED, BAD_CREDENTIALS));
    }

    // 3. Create auth session in database
    let ttl = Duration::days(state.config.session_ttl_days);
    let session = AuthSession {
        id: Uuid::new_v4().to_string(),
        user_id: creds.user.id,
        expires_at: Utc::now() + ttl,
    };
    let cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        session.id,
        ttl.num_seconds()
    );
    state
        .db
        .create_auth_session(session)
        .await
        .map_err(port_failure("create the session"))?;

    // 4. Return response with cookie
    let response = LoginResponse {
        redirect: landing_route(creds.user.role).to_string(),
        user: creds.user.into(),
    };
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = Flash)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> HandlerResult<impl IntoResponse> {
    if let Some(auth_session_id) = session_cookie(&headers) {
        state
            .db
            .delete_auth_session(auth_session_id)
            .await
            .map_err(port_failure("log out"))?;
    }

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(Flash::info("You have been logged out.")),
    ))
}

/// POST /auth/forgot_password - Issue a password reset token
///
/// The answer is the same whether or not the email belongs to an account.
#[utoipa::path(
    post,
    path = "/auth/forgot_password",
    request_body(content = ForgotPasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Reset requested", body = Flash),
        (status = 400, description = "Missing email", body = Flash)
    )
)]
pub async fn forgot_password_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ForgotPasswordForm>,
) -> HandlerResult<Json<Flash>> {
    let email = filled(&form.email).ok_or_else(|| bad_request("Please enter your email address."))?;

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::minutes(state.config.reset_token_ttl_minutes);
    let stored = state
        .db
        .set_reset_token(email, &token, expires_at)
        .await
        .map_err(port_failure("start the password reset"))?;

    if stored {
        // No mailer: the link goes to the log for an operator to forward.
        info!(
            "Password reset link for {}: {}/auth/reset_password/{}",
            email, state.config.public_base_url, token
        );
    }

    Ok(Json(Flash::info(
        "If an account exists for that email, a password reset link has been sent.",
    )))
}

/// POST /auth/reset_password/{token} - Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/auth/reset_password/{token}",
    params(("token" = String, Path, description = "The reset token from the emailed link.")),
    request_body(content = ResetPasswordForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Password changed", body = Flash),
        (status = 400, description = "Mismatch or invalid token", body = Flash)
    )
)]
pub async fn reset_password_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Form(form): Form<ResetPasswordForm>,
) -> HandlerResult<Json<Flash>> {
    let (Some(new_password), Some(confirm)) = (
        form.new_password.as_deref().filter(|p| !p.is_empty()),
        form.confirm_password.as_deref(),
    ) else {
        return Err(bad_request(FILL_OUT_FORM));
    };
    if new_password != confirm {
        return Err(bad_request("Passwords do not match!"));
    }

    let changed = state
        .db
        .reset_password(&token, &hash_password(new_password)?)
        .await
        .map_err(port_failure("reset the password"))?;
    if !changed {
        return Err(bad_request("Invalid or expired reset token."));
    }

    Ok(Json(Flash::success(
        "Your password has been reset. You can now log in.",
    )))
}
