//! services/api/src/web/books.rs
//!
//! Admin book management (multipart save with PDF and cover uploads) and the
//! public PDF download.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use library_core::domain::{BookDraft, ReferenceKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::web::flash::{bad_request, port_failure, reject, Flash, FlashError, HandlerResult};
use crate::web::forms::{filled, optional_id, required_id};
use crate::web::state::AppState;
use crate::web::views::{views, BookSummaryView, BookView, ReferenceView};

const DEFAULT_STATUS: &str = "Enable";

//=========================================================================================
// Payload Structs
//=========================================================================================

#[derive(Deserialize, IntoParams)]
pub struct BookIdQuery {
    pub bookid: i64,
}

/// A book together with the choices for its reference fields.
#[derive(Serialize, ToSchema)]
pub struct BookEditView {
    pub book: BookView,
    pub authors: Vec<ReferenceView>,
    pub categories: Vec<ReferenceView>,
    pub publishers: Vec<ReferenceView>,
}

/// An uploaded file held in memory until the form has been validated.
struct UploadedFile {
    file_name: String,
    data: Bytes,
}

/// The text fields and files of the book form.
#[derive(Default)]
struct BookForm {
    action: Option<String>,
    bookid: Option<String>,
    name: Option<String>,
    authorid: Option<String>,
    categoryid: Option<String>,
    publisherid: Option<String>,
    new_author: Option<String>,
    new_category: Option<String>,
    new_publisher: Option<String>,
    isbn: Option<String>,
    status: Option<String>,
    no_of_copy: Option<String>,
    pdf: Option<UploadedFile>,
    picture: Option<UploadedFile>,
}

impl BookForm {
    async fn read(mut multipart: Multipart) -> HandlerResult<Self> {
        let mut form = BookForm::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            warn!("Failed to read multipart data: {}", e);
            bad_request("Failed to read the submitted form.")
        })? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == "pdf" || name == "picture" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    warn!("Failed to read uploaded file bytes: {}", e);
                    bad_request("Failed to read the uploaded file.")
                })?;
                // Browsers send an empty part when no file was chosen.
                if file_name.is_empty() || data.is_empty() {
                    continue;
                }
                let upload = Some(UploadedFile { file_name, data });
                if name == "pdf" {
                    form.pdf = upload;
                } else {
                    form.picture = upload;
                }
                continue;
            }

            let value = field.text().await.map_err(|e| {
                warn!("Failed to read form field '{}': {}", name, e);
                bad_request("Failed to read the submitted form.")
            })?;
            let slot = match name.as_str() {
                "action" => &mut form.action,
                "bookid" => &mut form.bookid,
                "name" => &mut form.name,
                "authorid" => &mut form.authorid,
                "categoryid" => &mut form.categoryid,
                "publisherid" => &mut form.publisherid,
                "new_author" => &mut form.new_author,
                "new_category" => &mut form.new_category,
                "new_publisher" => &mut form.new_publisher,
                "isbn" => &mut form.isbn,
                "status" => &mut form.status,
                "no_of_copy" => &mut form.no_of_copy,
                _ => continue,
            };
            *slot = Some(value);
        }
        Ok(form)
    }
}

//=========================================================================================
// Helpers
//=========================================================================================

/// Uses the inline "new ..." name when given, creating the entry; otherwise the selected id.
async fn reference_id(
    state: &AppState,
    kind: ReferenceKind,
    new_name: &Option<String>,
    selected: &Option<String>,
) -> HandlerResult<Option<i64>> {
    if let Some(name) = filled(new_name) {
        let entry = state
            .db
            .create_reference(kind, name, DEFAULT_STATUS)
            .await
            .map_err(port_failure("add the catalog entry"))?;
        info!("Created {} {} '{}' from the book form", kind.label(), entry.id, entry.name);
        return Ok(Some(entry.id));
    }
    optional_id(selected, kind.label())
}

async fn store_upload(state: &AppState, upload: Option<UploadedFile>) -> HandlerResult<Option<String>> {
    let Some(upload) = upload else {
        return Ok(None);
    };
    let stored = state
        .uploads
        .save(&upload.file_name, upload.data)
        .await
        .map_err(|e| {
            error!("Failed to store upload '{}': {:?}", upload.file_name, e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store the uploaded file.")
        })?;
    Ok(Some(stored))
}

fn not_found_pdf() -> FlashError {
    reject(StatusCode::NOT_FOUND, "PDF not found.")
}

//=========================================================================================
// Handlers
//=========================================================================================

/// List all books with their author, category and publisher names.
#[utoipa::path(
    get,
    path = "/books",
    responses((status = 200, description = "All books", body = [BookSummaryView]))
)]
pub async fn list_books_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<Json<Vec<BookSummaryView>>> {
    let books = state
        .db
        .list_books()
        .await
        .map_err(port_failure("list books"))?;
    Ok(Json(views(books)))
}

/// Insert a book, or update one when `action=updateBook`.
///
/// Accepts `multipart/form-data` with optional `pdf` and `picture` files.
/// On update, a missing file keeps the stored one.
#[utoipa::path(
    post,
    path = "/books/save",
    request_body(content_type = "multipart/form-data", description = "Book fields plus optional pdf and picture files."),
    responses(
        (status = 200, description = "Saved", body = Flash),
        (status = 400, description = "Missing or invalid field", body = Flash),
        (status = 404, description = "Book not found", body = Flash),
        (status = 409, description = "Unknown author, category or publisher", body = Flash)
    )
)]
pub async fn save_book_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> HandlerResult<Json<Flash>> {
    let form = BookForm::read(multipart).await?;

    // 1. Validate the plain fields before touching the store or the disk
    let name = filled(&form.name)
        .ok_or_else(|| bad_request("Please fill out the form!"))?
        .to_string();
    let no_of_copy = match filled(&form.no_of_copy) {
        Some(raw) => raw
            .parse::<i32>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| bad_request("Invalid number of copies."))?,
        None => 0,
    };
    let updating = filled(&form.action) == Some("updateBook");
    let existing = if updating {
        let book_id = required_id(&form.bookid, "book")?;
        Some(
            state
                .db
                .get_book(book_id)
                .await
                .map_err(port_failure("load the book"))?,
        )
    } else {
        None
    };

    // 2. Resolve reference ids, creating inline entries
    let author_id = reference_id(&state, ReferenceKind::Author, &form.new_author, &form.authorid).await?;
    let category_id =
        reference_id(&state, ReferenceKind::Category, &form.new_category, &form.categoryid).await?;
    let publisher_id =
        reference_id(&state, ReferenceKind::Publisher, &form.new_publisher, &form.publisherid).await?;

    // 3. Store uploads, keeping existing files when none were sent
    let pdf_path = match store_upload(&state, form.pdf).await? {
        Some(stored) => Some(stored),
        None => existing.as_ref().and_then(|b| b.pdf_path.clone()),
    };
    let picture = match store_upload(&state, form.picture).await? {
        Some(stored) => Some(stored),
        None => existing.as_ref().and_then(|b| b.picture.clone()),
    };

    let draft = BookDraft {
        name,
        author_id,
        category_id,
        publisher_id,
        isbn: filled(&form.isbn).map(str::to_string),
        status: filled(&form.status).unwrap_or(DEFAULT_STATUS).to_string(),
        no_of_copy,
        pdf_path,
        picture,
    };

    // 4. Write the row
    let (book, message) = match existing {
        Some(existing) => (
            state
                .db
                .update_book(existing.id, draft)
                .await
                .map_err(port_failure("update the book"))?,
            "Book updated.",
        ),
        None => (
            state
                .db
                .create_book(draft)
                .await
                .map_err(port_failure("add the book"))?,
            "Book added.",
        ),
    };

    info!("Saved book {} '{}'", book.id, book.name);
    Ok(Json(Flash::success(message)))
}

/// Fetch a book plus the author, category and publisher choices for the edit form.
#[utoipa::path(
    get,
    path = "/books/edit",
    params(BookIdQuery),
    responses(
        (status = 200, description = "The book and form choices", body = BookEditView),
        (status = 404, description = "Book not found", body = Flash)
    )
)]
pub async fn edit_book_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookIdQuery>,
) -> HandlerResult<Json<BookEditView>> {
    let db = &state.db;
    let (book, authors, categories, publishers) = futures::try_join!(
        db.get_book(query.bookid),
        db.list_references(ReferenceKind::Author),
        db.list_references(ReferenceKind::Category),
        db.list_references(ReferenceKind::Publisher),
    )
    .map_err(port_failure("load the book"))?;

    Ok(Json(BookEditView {
        book: book.into(),
        authors: views(authors),
        categories: views(categories),
        publishers: views(publishers),
    }))
}

/// Delete a book (its loans and reviews go with it).
#[utoipa::path(
    get,
    path = "/books/delete",
    params(BookIdQuery),
    responses(
        (status = 200, description = "Deleted", body = Flash),
        (status = 404, description = "Book not found", body = Flash)
    )
)]
pub async fn delete_book_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookIdQuery>,
) -> HandlerResult<Json<Flash>> {
    state
        .db
        .delete_book(query.bookid)
        .await
        .map_err(port_failure("delete the book"))?;
    info!("Deleted book {}", query.bookid);
    Ok(Json(Flash::success("Book deleted.")))
}

/// Download a book's PDF by book id or, failing that, by ISBN.
#[utoipa::path(
    get,
    path = "/download_pdf/{identifier}",
    params(("identifier" = String, Path, description = "A book id or an ISBN.")),
    responses(
        (status = 200, description = "The PDF as an attachment", content_type = "application/pdf"),
        (status = 404, description = "No PDF for this identifier", body = Flash)
    )
)]
pub async fn download_pdf_handler(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
) -> HandlerResult<impl IntoResponse> {
    let identifier = identifier.trim();

    let mut pdf_path = None;
    if let Ok(book_id) = identifier.parse::<i64>() {
        pdf_path = state
            .db
            .pdf_path_for_book(book_id)
            .await
            .map_err(port_failure("look up the PDF"))?;
    }
    if pdf_path.as_deref().map_or(true, |p| p.trim().is_empty()) {
        pdf_path = state
            .db
            .pdf_path_for_isbn(identifier)
            .await
            .map_err(port_failure("look up the PDF"))?;
    }

    let stored = pdf_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(not_found_pdf)?;
    let path = state.uploads.resolve(stored).ok_or_else(not_found_pdf)?;

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        warn!("PDF for '{}' missing at {}: {}", identifier, path.display(), e);
        not_found_pdf()
    })?;

    let disposition = format!("attachment; filename=\"{}\"", stored.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(file)),
    ))
}
