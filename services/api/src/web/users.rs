//! services/api/src/web/users.rs
//!
//! Admin user management, plus the patron-facing profile and landing payloads.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Form, Json,
};
use library_core::domain::{NewUser, Role, UserUpdate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::web::auth::{hash_password, is_valid_email};
use crate::web::flash::{bad_request, port_failure, reject, Flash, HandlerResult};
use crate::web::forms::{filled, optional_id, required_id};
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;
use crate::web::views::{views, UserView};

#[derive(Deserialize, ToSchema)]
pub struct UserForm {
    pub action: Option<String>,
    pub userid: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Required when creating an account; ignored on update.
    pub password: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct UserIdQuery {
    pub userid: i64,
}

#[derive(Deserialize, IntoParams)]
pub struct ViewUserQuery {
    /// Defaults to the logged-in user.
    pub userid: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LibraryView {
    pub user: UserView,
    pub is_admin: bool,
}

#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All accounts", body = [UserView]))
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<UserView>>> {
    let users = state
        .db
        .list_users()
        .await
        .map_err(port_failure("list users"))?;
    Ok(Json(views(users)))
}

/// Create an account, or update one when `action=updateUser`.
#[utoipa::path(
    post,
    path = "/users/save",
    request_body(content = UserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Saved", body = Flash),
        (status = 400, description = "Missing or invalid field", body = Flash),
        (status = 404, description = "User not found", body = Flash),
        (status = 409, description = "Email already in use", body = Flash)
    )
)]
pub async fn save_user_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<UserForm>,
) -> HandlerResult<Json<Flash>> {
    let (Some(first_name), Some(email), Some(role)) =
        (filled(&form.first_name), filled(&form.email), filled(&form.role))
    else {
        return Err(bad_request("Please fill out the form!"));
    };
    let last_name = filled(&form.last_name).unwrap_or_default().to_string();
    if !is_valid_email(email) {
        return Err(bad_request("Invalid email address!"));
    }
    let role: Role = role.parse().map_err(|_| bad_request("Invalid role."))?;

    let user = if filled(&form.action) == Some("updateUser") {
        let user_id = required_id(&form.userid, "user")?;
        state
            .db
            .update_user(
                user_id,
                UserUpdate {
                    first_name: first_name.to_string(),
                    last_name,
                    email: email.to_string(),
                    role,
                },
            )
            .await
            .map_err(port_failure("update the user"))?
    } else {
        let password = form
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| bad_request("A password is required for new users."))?;
        state
            .db
            .create_user(NewUser {
                first_name: first_name.to_string(),
                last_name,
                email: email.to_string(),
                hashed_password: hash_password(password)?,
                role,
            })
            .await
            .map_err(port_failure("create the user"))?
    };

    info!("Saved user {} ({}, {})", user.id, user.email, user.role);
    Ok(Json(Flash::success("User saved.")))
}

#[utoipa::path(
    get,
    path = "/users/edit",
    params(UserIdQuery),
    responses(
        (status = 200, description = "The account", body = UserView),
        (status = 404, description = "User not found", body = Flash)
    )
)]
pub async fn edit_user_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserIdQuery>,
) -> HandlerResult<Json<UserView>> {
    let user = state
        .db
        .get_user_by_id(query.userid)
        .await
        .map_err(port_failure("load the user"))?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/users/delete",
    params(UserIdQuery),
    responses(
        (status = 200, description = "Deleted", body = Flash),
        (status = 400, description = "Tried to delete the current account", body = Flash),
        (status = 404, description = "User not found", body = Flash)
    )
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<UserIdQuery>,
) -> HandlerResult<Json<Flash>> {
    if query.userid == current.id {
        return Err(bad_request("You cannot delete your own account."));
    }
    state
        .db
        .delete_user(query.userid)
        .await
        .map_err(port_failure("delete the user"))?;
    info!("User {} deleted user {}", current.id, query.userid);
    Ok(Json(Flash::success("User deleted.")))
}

/// Show a profile. Patrons may only view their own.
#[utoipa::path(
    get,
    path = "/view_user",
    params(ViewUserQuery),
    responses(
        (status = 200, description = "The account", body = UserView),
        (status = 403, description = "Not allowed to view this account", body = Flash),
        (status = 404, description = "User not found", body = Flash)
    )
)]
pub async fn view_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ViewUserQuery>,
) -> HandlerResult<Json<UserView>> {
    let user_id = optional_id(&query.userid, "user")?.unwrap_or(current.id);
    if user_id != current.id && !current.role.is_admin() {
        warn!("User {} tried to view user {}", current.id, user_id);
        return Err(reject(
            StatusCode::FORBIDDEN,
            "You can only view your own profile.",
        ));
    }

    let user = state
        .db
        .get_user_by_id(user_id)
        .await
        .map_err(port_failure("load the user"))?;
    Ok(Json(user.into()))
}

/// The landing payload for any logged-in account.
#[utoipa::path(
    get,
    path = "/library",
    responses((status = 200, description = "The logged-in account", body = LibraryView))
)]
pub async fn library_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> HandlerResult<Json<LibraryView>> {
    let user = state
        .db
        .get_user_by_id(current.id)
        .await
        .map_err(port_failure("load the library"))?;
    Ok(Json(LibraryView {
        is_admin: user.role.is_admin(),
        user: user.into(),
    }))
}
