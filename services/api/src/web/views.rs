//! services/api/src/web/views.rs
//!
//! JSON shapes returned by the HTTP layer. Domain types stay free of serde;
//! each view is built from its domain counterpart with `From`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use library_core::domain::{
    Book, BookQuery, BookSummary, DashboardStats, IssuedBook, ReferenceEntry, Review, User,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReferenceView {
    pub id: i64,
    pub kind: String,
    pub name: String,
    pub status: String,
}

impl From<ReferenceEntry> for ReferenceView {
    fn from(entry: ReferenceEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind.label().to_string(),
            name: entry.name,
            status: entry.status,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookView {
    pub id: i64,
    pub name: String,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    pub publisher_id: Option<i64>,
    pub isbn: Option<String>,
    pub status: String,
    pub no_of_copy: i32,
    pub pdf_path: Option<String>,
    pub picture: Option<String>,
    pub added_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            name: book.name,
            author_id: book.author_id,
            category_id: book.category_id,
            publisher_id: book.publisher_id,
            isbn: book.isbn,
            status: book.status,
            no_of_copy: book.no_of_copy,
            pdf_path: book.pdf_path,
            picture: book.picture,
            added_on: book.added_on,
            updated_on: book.updated_on,
        }
    }
}

/// A book row joined with its author, category and publisher names.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookSummaryView {
    pub id: i64,
    pub name: String,
    pub isbn: Option<String>,
    pub status: String,
    pub no_of_copy: i32,
    pub pdf_path: Option<String>,
    pub picture: Option<String>,
    pub author_name: Option<String>,
    pub category_name: Option<String>,
    pub publisher_name: Option<String>,
}

impl From<BookSummary> for BookSummaryView {
    fn from(book: BookSummary) -> Self {
        Self {
            id: book.id,
            name: book.name,
            isbn: book.isbn,
            status: book.status,
            no_of_copy: book.no_of_copy,
            pdf_path: book.pdf_path,
            picture: book.picture,
            author_name: book.author_name,
            category_name: book.category_name,
            publisher_name: book.publisher_name,
        }
    }
}

/// One `/search` hit.
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchHit {
    pub id: i64,
    pub name: String,
    pub isbn: Option<String>,
    pub no_of_copy: i32,
    pub status: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

impl From<BookSummary> for SearchHit {
    fn from(book: BookSummary) -> Self {
        Self {
            id: book.id,
            name: book.name,
            isbn: book.isbn,
            no_of_copy: book.no_of_copy,
            status: book.status,
            author: book.author_name,
            publisher: book.publisher_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IssuedBookView {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub issue_date_time: NaiveDateTime,
    pub expected_return_date: NaiveDate,
    pub return_date_time: Option<NaiveDateTime>,
    pub status: String,
    pub book_name: Option<String>,
    pub isbn: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<IssuedBook> for IssuedBookView {
    fn from(loan: IssuedBook) -> Self {
        Self {
            id: loan.id,
            book_id: loan.book_id,
            user_id: loan.user_id,
            issue_date_time: loan.issue_date_time,
            expected_return_date: loan.expected_return_date,
            return_date_time: loan.return_date_time,
            status: loan.status.as_str().to_string(),
            book_name: loan.book_name,
            isbn: loan.isbn,
            first_name: loan.first_name,
            last_name: loan.last_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStatsView {
    pub total_books: i64,
    pub available_books: i64,
    pub issued_books: i64,
    pub returned_books: i64,
}

impl From<DashboardStats> for DashboardStatsView {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_books: stats.total_books,
            available_books: stats.available_books,
            issued_books: stats.issued_books,
            returned_books: stats.returned_books,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewView {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub review: String,
    pub rating: u8,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub reviewer_first_name: Option<String>,
    pub book_name: Option<String>,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            book_id: review.book_id,
            review: review.review,
            rating: review.rating.value(),
            created_on: review.created_on,
            updated_on: review.updated_on,
            reviewer_first_name: review.reviewer_first_name,
            book_name: review.book_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookQueryView {
    pub id: i64,
    pub book_request: String,
    pub description: String,
}

impl From<BookQuery> for BookQueryView {
    fn from(query: BookQuery) -> Self {
        Self {
            id: query.id,
            book_request: query.book_request,
            description: query.description,
        }
    }
}

/// Converts a list of domain values into their views.
pub fn views<T, V: From<T>>(items: Vec<T>) -> Vec<V> {
    items.into_iter().map(V::from).collect()
}
