//! services/api/src/web/reviews.rs
//!
//! Book reviews: one review per (user, book), resubmitting replaces it.

use axum::{extract::State, http::StatusCode, Extension, Form, Json};
use library_core::domain::{Rating, ReviewWrite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::web::flash::{bad_request, port_failure, Flash, HandlerResult};
use crate::web::forms::filled;
use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;
use crate::web::views::{views, ReviewView};

const ALL_FIELDS_REQUIRED: &str = "All fields are required.";

#[derive(Serialize, ToSchema)]
pub struct ReviewableBook {
    pub id: i64,
    pub name: String,
    pub author_name: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ReviewsPage {
    pub books: Vec<ReviewableBook>,
    /// Newest first.
    pub reviews: Vec<ReviewView>,
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewForm {
    pub book_id: Option<String>,
    pub review: Option<String>,
    pub rating: Option<String>,
}

#[utoipa::path(
    get,
    path = "/reviews",
    responses((status = 200, description = "Books to review and existing reviews", body = ReviewsPage))
)]
pub async fn list_reviews_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<ReviewsPage>> {
    let db = &state.db;
    let (mut books, reviews) = futures::try_join!(db.list_books(), db.list_reviews())
        .map_err(port_failure("load reviews"))?;
    books.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(ReviewsPage {
        books: books
            .into_iter()
            .map(|b| ReviewableBook {
                id: b.id,
                name: b.name,
                author_name: b.author_name,
            })
            .collect(),
        reviews: views(reviews),
    }))
}

/// Submit or replace the current user's review of a book.
#[utoipa::path(
    post,
    path = "/reviews",
    request_body(content = ReviewForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Existing review replaced", body = Flash),
        (status = 201, description = "Review created", body = Flash),
        (status = 400, description = "Missing field or invalid rating", body = Flash),
        (status = 409, description = "Unknown book", body = Flash)
    )
)]
pub async fn submit_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Form(form): Form<ReviewForm>,
) -> HandlerResult<(StatusCode, Json<Flash>)> {
    let (Some(book_id), Some(review), Some(rating)) = (
        filled(&form.book_id),
        filled(&form.review),
        filled(&form.rating),
    ) else {
        return Err(bad_request(ALL_FIELDS_REQUIRED));
    };
    let book_id: i64 = book_id
        .parse()
        .map_err(|_| bad_request(ALL_FIELDS_REQUIRED))?;
    let rating = Rating::parse(rating).ok_or_else(|| bad_request("Invalid rating value."))?;

    let write = state
        .db
        .upsert_review(current.id, book_id, review, rating)
        .await
        .map_err(port_failure("save the review"))?;

    info!(
        "User {} {:?} review of book {} ({} stars)",
        current.id,
        write,
        book_id,
        rating.value()
    );
    let status = match write {
        ReviewWrite::Created => StatusCode::CREATED,
        ReviewWrite::Updated => StatusCode::OK,
    };
    Ok((status, Json(Flash::success("Review submitted successfully!"))))
}
