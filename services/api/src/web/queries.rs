//! services/api/src/web/queries.rs
//!
//! Patron requests for books the library does not hold yet.

use axum::{extract::State, http::StatusCode, Form, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::web::flash::{bad_request, port_failure, Flash, HandlerResult};
use crate::web::forms::filled;
use crate::web::state::AppState;
use crate::web::views::{views, BookQueryView};

#[derive(Deserialize, ToSchema)]
pub struct BookQueryForm {
    pub book_request: Option<String>,
    pub description: Option<String>,
}

#[utoipa::path(
    get,
    path = "/queries",
    responses((status = 200, description = "All book requests", body = [BookQueryView]))
)]
pub async fn list_queries_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<BookQueryView>>> {
    let queries = state
        .db
        .list_book_queries()
        .await
        .map_err(port_failure("load book requests"))?;
    Ok(Json(views(queries)))
}

#[utoipa::path(
    post,
    path = "/queries",
    request_body(content = BookQueryForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Request stored", body = Flash),
        (status = 400, description = "Missing field", body = Flash)
    )
)]
pub async fn submit_query_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<BookQueryForm>,
) -> HandlerResult<(StatusCode, Json<Flash>)> {
    let (Some(book_request), Some(description)) =
        (filled(&form.book_request), filled(&form.description))
    else {
        return Err(bad_request("Both fields are required!"));
    };

    let query = state
        .db
        .create_book_query(book_request, description)
        .await
        .map_err(port_failure("save the book request"))?;

    info!("Stored book request {} for '{}'", query.id, query.book_request);
    Ok((
        StatusCode::CREATED,
        Json(Flash::success("Query submitted successfully!")),
    ))
}
