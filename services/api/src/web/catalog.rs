//! services/api/src/web/catalog.rs
//!
//! Admin CRUD for the three reference tables (authors, categories, publishers).
//! One set of handlers serves all three, keyed by the `{kind}` path segment.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Form, Json,
};
use library_core::domain::ReferenceKind;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::web::flash::{bad_request, port_failure, reject, Flash, HandlerResult};
use crate::web::forms::{filled, required_id};
use crate::web::state::AppState;
use crate::web::views::{views, ReferenceView};

const DEFAULT_STATUS: &str = "Enable";

/// Maps the plural path segment to a reference kind.
pub fn parse_kind(segment: &str) -> HandlerResult<ReferenceKind> {
    match segment {
        "authors" => Ok(ReferenceKind::Author),
        "categories" => Ok(ReferenceKind::Category),
        "publishers" => Ok(ReferenceKind::Publisher),
        other => Err(reject(
            StatusCode::NOT_FOUND,
            format!("Unknown catalog '{}'.", other),
        )),
    }
}

fn capitalized(kind: ReferenceKind) -> String {
    let label = kind.label();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ReferenceForm {
    pub action: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct IdQuery {
    pub id: i64,
}

/// List every entry of one reference table.
#[utoipa::path(
    get,
    path = "/catalog/{kind}",
    params(("kind" = String, Path, description = "authors, categories or publishers")),
    responses(
        (status = 200, description = "All entries", body = [ReferenceView]),
        (status = 404, description = "Unknown catalog", body = Flash)
    )
)]
pub async fn list_references_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> HandlerResult<Json<Vec<ReferenceView>>> {
    let kind = parse_kind(&kind)?;
    let entries = state
        .db
        .list_references(kind)
        .await
        .map_err(port_failure("list catalog entries"))?;
    Ok(Json(views(entries)))
}

/// Insert a new entry, or update one when `action=update`.
#[utoipa::path(
    post,
    path = "/catalog/{kind}/save",
    params(("kind" = String, Path, description = "authors, categories or publishers")),
    request_body(content = ReferenceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Saved", body = Flash),
        (status = 400, description = "Missing name", body = Flash),
        (status = 404, description = "Unknown catalog or entry", body = Flash)
    )
)]
pub async fn save_reference_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Form(form): Form<ReferenceForm>,
) -> HandlerResult<Json<Flash>> {
    let kind = parse_kind(&kind)?;
    let name = filled(&form.name).ok_or_else(|| bad_request("Please fill out the form!"))?;
    let status = filled(&form.status).unwrap_or(DEFAULT_STATUS);

    let entry = if filled(&form.action) == Some("update") {
        let id = required_id(&form.id, kind.label())?;
        state
            .db
            .update_reference(kind, id, name, status)
            .await
            .map_err(port_failure("update the catalog entry"))?
    } else {
        state
            .db
            .create_reference(kind, name, status)
            .await
            .map_err(port_failure("add the catalog entry"))?
    };

    info!("Saved {} {} '{}'", kind.label(), entry.id, entry.name);
    Ok(Json(Flash::success(format!("{} saved.", capitalized(kind)))))
}

/// Fetch one entry for the edit form.
#[utoipa::path(
    get,
    path = "/catalog/{kind}/edit",
    params(("kind" = String, Path, description = "authors, categories or publishers"), IdQuery),
    responses(
        (status = 200, description = "The entry", body = ReferenceView),
        (status = 404, description = "Not found", body = Flash)
    )
)]
pub async fn edit_reference_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query): Query<IdQuery>,
) -> HandlerResult<Json<ReferenceView>> {
    let kind = parse_kind(&kind)?;
    let entry = state
        .db
        .get_reference(kind, query.id)
        .await
        .map_err(port_failure("load the catalog entry"))?;
    Ok(Json(entry.into()))
}

/// Delete an entry. Entries still referenced by books are refused with 409.
#[utoipa::path(
    get,
    path = "/catalog/{kind}/delete",
    params(("kind" = String, Path, description = "authors, categories or publishers"), IdQuery),
    responses(
        (status = 200, description = "Deleted", body = Flash),
        (status = 404, description = "Not found", body = Flash),
        (status = 409, description = "Still referenced by books", body = Flash)
    )
)]
pub async fn delete_reference_handler(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query): Query<IdQuery>,
) -> HandlerResult<Json<Flash>> {
    let kind = parse_kind(&kind)?;
    state
        .db
        .delete_reference(kind, query.id)
        .await
        .map_err(port_failure("delete the catalog entry"))?;

    info!("Deleted {} {}", kind.label(), query.id);
    Ok(Json(Flash::success(format!("{} deleted.", capitalized(kind)))))
}
