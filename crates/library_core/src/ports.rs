//! crates/library_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the library's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific implementations like the database or the web APIs
//! the chat assistant consults.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AuthSession, Book, BookDraft, BookQuery, BookSummary, DashboardStats, Feedback, IssuedBook,
    LoanDraft, NewUser, Rating, ReferenceEntry, ReferenceKind, Review, ReviewWrite, User,
    UserCredentials, UserUpdate, Volume,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The store refused the write, e.g. a unique or foreign-key violation.
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The read-mostly slice of the store the chat assistant is allowed to touch.
///
/// All name lookups are case-insensitive substring matches.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Books with at least one copy, ordered by name.
    async fn available_books(&self) -> PortResult<Vec<BookSummary>>;

    /// Books whose author name contains `author`, in store order.
    async fn books_by_author(&self, author: &str) -> PortResult<Vec<BookSummary>>;

    /// Books whose own name contains `name`, joined with author and publisher.
    async fn books_matching_name(&self, name: &str) -> PortResult<Vec<BookSummary>>;

    /// Books whose category name contains `category`.
    async fn books_in_category(&self, category: &str) -> PortResult<Vec<BookSummary>>;

    async fn save_feedback(&self, message: &str) -> PortResult<Feedback>;
}

#[async_trait]
pub trait DatabaseService: CatalogLookup {
    // --- User Management ---
    async fn create_user(&self, user: NewUser) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: i64) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn update_user(&self, user_id: i64, update: UserUpdate) -> PortResult<User>;

    async fn delete_user(&self, user_id: i64) -> PortResult<()>;

    /// Stores a reset token for the account with this email.
    /// Returns `false` when no account matched.
    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<bool>;

    /// Replaces the password of the account holding a live `token` and clears the token.
    /// Returns `false` when the token is unknown or expired.
    async fn reset_password(&self, token: &str, hashed_password: &str) -> PortResult<bool>;

    // --- Auth Methods ---
    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<i64>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Authors, Categories & Publishers ---
    async fn list_references(&self, kind: ReferenceKind) -> PortResult<Vec<ReferenceEntry>>;

    async fn get_reference(&self, kind: ReferenceKind, id: i64) -> PortResult<ReferenceEntry>;

    async fn create_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
        status: &str,
    ) -> PortResult<ReferenceEntry>;

    async fn update_reference(
        &self,
        kind: ReferenceKind,
        id: i64,
        name: &str,
        status: &str,
    ) -> PortResult<ReferenceEntry>;

    async fn delete_reference(&self, kind: ReferenceKind, id: i64) -> PortResult<()>;

    // --- Books ---
    async fn list_books(&self) -> PortResult<Vec<BookSummary>>;

    async fn get_book(&self, book_id: i64) -> PortResult<Book>;

    async fn create_book(&self, draft: BookDraft) -> PortResult<Book>;

    async fn update_book(&self, book_id: i64, draft: BookDraft) -> PortResult<Book>;

    async fn delete_book(&self, book_id: i64) -> PortResult<()>;

    async fn pdf_path_for_book(&self, book_id: i64) -> PortResult<Option<String>>;

    async fn pdf_path_for_isbn(&self, isbn: &str) -> PortResult<Option<String>>;

    // --- Issued Books ---
    async fn list_issued_books(&self) -> PortResult<Vec<IssuedBook>>;

    async fn get_issued_book(&self, issue_id: i64) -> PortResult<IssuedBook>;

    async fn create_issued_book(&self, draft: LoanDraft) -> PortResult<IssuedBook>;

    async fn update_issued_book(&self, issue_id: i64, draft: LoanDraft) -> PortResult<IssuedBook>;

    async fn delete_issued_book(&self, issue_id: i64) -> PortResult<()>;

    async fn dashboard_stats(&self) -> PortResult<DashboardStats>;

    // --- Reviews & Requests ---
    /// Reviews joined with reviewer and book names, newest first.
    async fn list_reviews(&self) -> PortResult<Vec<Review>>;

    /// Inserts the review, or replaces the text and rating of the existing review
    /// for the same (user, book) pair.
    async fn upsert_review(
        &self,
        user_id: i64,
        book_id: i64,
        review: &str,
        rating: Rating,
    ) -> PortResult<ReviewWrite>;

    async fn list_book_queries(&self) -> PortResult<Vec<BookQuery>>;

    async fn create_book_query(&self, book_request: &str, description: &str)
        -> PortResult<BookQuery>;
}

#[async_trait]
pub trait BookSearchService: Send + Sync {
    /// Searches an online catalogue for volumes matching a free-text query.
    async fn search_volumes(&self, query: &str) -> PortResult<Vec<Volume>>;
}

/// What the encyclopedia knows about a page title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSummary {
    Article { title: String, extract: String },
    Disambiguation { title: String, options: Vec<String> },
}

#[async_trait]
pub trait EncyclopediaService: Send + Sync {
    /// Returns up to `limit` page titles for a topic, best match first.
    async fn search(&self, topic: &str, limit: usize) -> PortResult<Vec<String>>;

    /// Fetches the summary of an exact page title.
    /// A missing page is reported as `PortError::NotFound`.
    async fn page_summary(&self, title: &str) -> PortResult<PageSummary>;
}

/// Sampling settings for the fallback text generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub no_repeat_ngram_size: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 50,
            temperature: 0.7,
            top_p: 0.92,
            repetition_penalty: 1.5,
            no_repeat_ngram_size: 3,
        }
    }
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Continues `prompt` with free-form text.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> PortResult<String>;
}
