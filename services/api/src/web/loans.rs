//! services/api/src/web/loans.rs
//!
//! Admin management of issued books.

use axum::{
    extract::{Query, State},
    Form, Json,
};
use library_core::domain::{LoanDraft, LoanStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::web::flash::{bad_request, port_failure, Flash, HandlerResult};
use crate::web::forms::{filled, parse_date, parse_datetime, required_id};
use crate::web::state::AppState;
use crate::web::views::{views, BookSummaryView, IssuedBookView, UserView};

#[derive(Serialize, ToSchema)]
pub struct IssuedBooksPage {
    pub issued_books: Vec<IssuedBookView>,
    /// Choices for the form's book select.
    pub books: Vec<BookSummaryView>,
    /// Choices for the form's borrower select.
    pub users: Vec<UserView>,
}

/// Field names follow the HTML form (`book`, `users`, `issueBookId`).
#[derive(Deserialize, ToSchema)]
pub struct IssueBookForm {
    pub action: Option<String>,
    #[serde(rename = "issueBookId")]
    pub issue_book_id: Option<String>,
    pub book: Option<String>,
    pub users: Option<String>,
    pub expected_return_date: Option<String>,
    pub return_date: Option<String>,
    pub status: Option<String>,
}

impl IssueBookForm {
    fn to_draft(&self) -> HandlerResult<LoanDraft> {
        let book_id = required_id(&self.book, "book")?;
        let user_id = required_id(&self.users, "user")?;
        let expected_return_date = filled(&self.expected_return_date)
            .ok_or_else(|| bad_request("Please fill out the form!"))
            .and_then(|raw| {
                parse_date(raw).ok_or_else(|| bad_request("Invalid expected return date."))
            })?;
        let return_date_time = filled(&self.return_date)
            .map(|raw| parse_datetime(raw).ok_or_else(|| bad_request("Invalid return date.")))
            .transpose()?;
        let status = match filled(&self.status) {
            Some(raw) => raw
                .parse::<LoanStatus>()
                .map_err(|_| bad_request("Invalid status."))?,
            None => LoanStatus::Issued,
        };

        Ok(LoanDraft {
            book_id,
            user_id,
            expected_return_date,
            return_date_time,
            status,
        })
    }
}

#[derive(Deserialize, IntoParams)]
pub struct IssueIdQuery {
    pub issuebookid: i64,
}

/// List loans, plus the books and users the issue form offers.
#[utoipa::path(
    get,
    path = "/issued_books",
    responses((status = 200, description = "Loans and form choices", body = IssuedBooksPage))
)]
pub async fn list_issued_books_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<IssuedBooksPage>> {
    let db = &state.db;
    let (issued_books, books, users) =
        futures::try_join!(db.list_issued_books(), db.list_books(), db.list_users())
            .map_err(port_failure("list issued books"))?;

    Ok(Json(IssuedBooksPage {
        issued_books: views(issued_books),
        books: views(books),
        users: views(users),
    }))
}

/// Issue a book, or update a loan when `action=updateIssueBook`.
#[utoipa::path(
    post,
    path = "/issued_books/save",
    request_body(content = IssueBookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Saved", body = Flash),
        (status = 400, description = "Missing or invalid field", body = Flash),
        (status = 404, description = "Loan not found", body = Flash),
        (status = 409, description = "Unknown book or user", body = Flash)
    )
)]
pub async fn save_issued_book_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IssueBookForm>,
) -> HandlerResult<Json<Flash>> {
    let draft = form.to_draft()?;

    let loan = if filled(&form.action) == Some("updateIssueBook") {
        let issue_id = required_id(&form.issue_book_id, "loan")?;
        state
            .db
            .update_issued_book(issue_id, draft)
            .await
            .map_err(port_failure("update the loan"))?
    } else {
        state
            .db
            .create_issued_book(draft)
            .await
            .map_err(port_failure("issue the book"))?
    };

    info!(
        "Saved loan {} (book {} to user {}, {})",
        loan.id,
        loan.book_id,
        loan.user_id,
        loan.status.as_str()
    );
    Ok(Json(Flash::success("Issued book saved.")))
}

/// Fetch one loan for the edit form.
#[utoipa::path(
    get,
    path = "/issued_books/edit",
    params(IssueIdQuery),
    responses(
        (status = 200, description = "The loan", body = IssuedBookView),
        (status = 404, description = "Loan not found", body = Flash)
    )
)]
pub async fn edit_issued_book_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IssueIdQuery>,
) -> HandlerResult<Json<IssuedBookView>> {
    let loan = state
        .db
        .get_issued_book(query.issuebookid)
        .await
        .map_err(port_failure("load the loan"))?;
    Ok(Json(loan.into()))
}

#[utoipa::path(
    get,
    path = "/issued_books/delete",
    params(IssueIdQuery),
    responses(
        (status = 200, description = "Deleted", body = Flash),
        (status = 404, description = "Loan not found", body = Flash)
    )
)]
pub async fn delete_issued_book_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IssueIdQuery>,
) -> HandlerResult<Json<Flash>> {
    state
        .db
        .delete_issued_book(query.issuebookid)
        .await
        .map_err(port_failure("delete the loan"))?;
    info!("Deleted loan {}", query.issuebookid);
    Ok(Json(Flash::success("Issued book deleted.")))
}
