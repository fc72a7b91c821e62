//! services/api/src/web/chat.rs
//!
//! The public JSON endpoints: the chat assistant and the quick title search.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use library_core::ports::CatalogLookup;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::web::state::AppState;
use crate::web::views::{views, SearchHit};

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
}

type JsonError = (StatusCode, Json<serde_json::Value>);

/// Answer a chat message.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The assistant's reply; may contain HTML cards", body = ChatResponse),
        (status = 400, description = "No message provided"),
        (status = 500, description = "The assistant produced no reply")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, JsonError> {
    let message = req
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "No message provided!" })),
            )
        })?;

    let response = state.chat.generate_response(message).await;
    if response.trim().is_empty() {
        error!("Chat router returned an empty reply for '{}'", message);
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to generate a response" })),
        ));
    }

    Ok(Json(ChatResponse { response }))
}

/// Search local books by (partial) title.
#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Matching books", body = [SearchHit]),
        (status = 400, description = "Query parameter is missing"),
        (status = 404, description = "No books found matching the query"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse, JsonError> {
    let query = req
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Query parameter is missing" })),
            )
        })?;

    let books = state.db.books_matching_name(query).await.map_err(|e| {
        error!("Search for '{}' failed: {:?}", query, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "An error occurred while searching" })),
        )
    })?;

    if books.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No books found matching the query" })),
        ));
    }

    info!("Search for '{}' matched {} books", query, books.len());
    let hits: Vec<SearchHit> = views(books);
    Ok(Json(hits))
}
