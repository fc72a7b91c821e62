//! Shared fixtures for the handler tests: an in-memory store that behaves like
//! the PostgreSQL schema (unique emails, RESTRICT on referenced catalog rows,
//! cascades from books and users) and stub external services.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_lib::adapters::uploads::UploadStore;
use api_lib::config::Config;
use api_lib::web::middleware::CurrentUser;
use api_lib::web::state::AppState;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use library_core::domain::{
    AuthSession, Book, BookDraft, BookQuery, BookSummary, DashboardStats, Feedback, IssuedBook,
    LoanDraft, LoanStatus, NewUser, Rating, ReferenceEntry, ReferenceKind, Review, ReviewWrite,
    Role, User, UserCredentials, UserUpdate, Volume,
};
use library_core::ports::{
    BookSearchService, CatalogLookup, DatabaseService, EncyclopediaService, GenerationParams,
    PageSummary, PortError, PortResult, TextGenerationService,
};
use library_core::router::ChatRouter;

//=========================================================================================
// In-memory store
//=========================================================================================

struct StoredUser {
    user: User,
    password_hash: String,
    reset: Option<(String, DateTime<Utc>)>,
}

struct StoredLoan {
    id: i64,
    draft: LoanDraft,
    issue_date_time: chrono::NaiveDateTime,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<StoredUser>,
    sessions: Vec<AuthSession>,
    references: Vec<ReferenceEntry>,
    books: Vec<Book>,
    loans: Vec<StoredLoan>,
    reviews: Vec<Review>,
    queries: Vec<BookQuery>,
    feedback: Vec<Feedback>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn reference_name(&self, kind: ReferenceKind, id: Option<i64>) -> Option<String> {
        let id = id?;
        self.references
            .iter()
            .find(|r| r.kind == kind && r.id == id)
            .map(|r| r.name.clone())
    }

    fn summary(&self, book: &Book) -> BookSummary {
        BookSummary {
            id: book.id,
            name: book.name.clone(),
            isbn: book.isbn.clone(),
            status: book.status.clone(),
            no_of_copy: book.no_of_copy,
            pdf_path: book.pdf_path.clone(),
            picture: book.picture.clone(),
            author_name: self.reference_name(ReferenceKind::Author, book.author_id),
            category_name: self.reference_name(ReferenceKind::Category, book.category_id),
            publisher_name: self.reference_name(ReferenceKind::Publisher, book.publisher_id),
        }
    }

    fn check_references(&self, draft: &BookDraft) -> PortResult<()> {
        let pairs = [
            (ReferenceKind::Author, draft.author_id),
            (ReferenceKind::Category, draft.category_id),
            (ReferenceKind::Publisher, draft.publisher_id),
        ];
        for (kind, id) in pairs {
            if let Some(id) = id {
                if !self.references.iter().any(|r| r.kind == kind && r.id == id) {
                    return Err(PortError::Conflict(format!("{} {} does not exist", kind.label(), id)));
                }
            }
        }
        Ok(())
    }

    fn loan(&self, loan: &StoredLoan) -> IssuedBook {
        let book = self.books.iter().find(|b| b.id == loan.draft.book_id);
        let user = self.users.iter().find(|u| u.user.id == loan.draft.user_id);
        IssuedBook {
            id: loan.id,
            book_id: loan.draft.book_id,
            user_id: loan.draft.user_id,
            issue_date_time: loan.issue_date_time,
            expected_return_date: loan.draft.expected_return_date,
            return_date_time: loan.draft.return_date_time,
            status: loan.draft.status,
            book_name: book.map(|b| b.name.clone()),
            isbn: book.and_then(|b| b.isbn.clone()),
            first_name: user.map(|u| u.user.first_name.clone()),
            last_name: user.map(|u| u.user.last_name.clone()),
        }
    }

    fn summaries_where(&self, keep: impl Fn(&BookSummary) -> bool) -> Vec<BookSummary> {
        self.books
            .iter()
            .map(|b| self.summary(b))
            .filter(|s| keep(s))
            .collect()
    }
}

fn contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

/// A `DatabaseService` over plain vectors.
#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
    /// When set, every catalog lookup fails with `Unexpected`.
    pub fail_lookups: AtomicBool,
}

impl InMemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lookups_enabled(&self) -> PortResult<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            Err(PortError::Unexpected("store is down".to_string()))
        } else {
            Ok(())
        }
    }

    pub fn seed_user(&self, first_name: &str, email: &str, role: Role, password: &str) -> User {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .expect("hash")
            .to_string();
        let mut t = self.tables.lock().unwrap();
        let user = User {
            id: t.next_id(),
            first_name: first_name.to_string(),
            last_name: String::new(),
            email: email.to_string(),
            role,
        };
        t.users.push(StoredUser {
            user: user.clone(),
            password_hash: hash,
            reset: None,
        });
        user
    }

    pub fn seed_reference(&self, kind: ReferenceKind, name: &str) -> i64 {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        t.references.push(ReferenceEntry {
            id,
            kind,
            name: name.to_string(),
            status: "Enable".to_string(),
        });
        id
    }

    pub fn seed_book(&self, draft: BookDraft) -> i64 {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let now = Utc::now();
        t.books.push(Book {
            id,
            name: draft.name,
            author_id: draft.author_id,
            category_id: draft.category_id,
            publisher_id: draft.publisher_id,
            isbn: draft.isbn,
            status: draft.status,
            no_of_copy: draft.no_of_copy,
            pdf_path: draft.pdf_path,
            picture: draft.picture,
            added_on: now,
            updated_on: now,
        });
        id
    }

    pub fn reset_token_for(&self, email: &str) -> Option<String> {
        let t = self.tables.lock().unwrap();
        t.users
            .iter()
            .find(|u| u.user.email == email)
            .and_then(|u| u.reset.as_ref().map(|(token, _)| token.clone()))
    }

    pub fn expire_reset_tokens(&self) {
        let mut t = self.tables.lock().unwrap();
        for user in t.users.iter_mut() {
            if let Some((_, expires_at)) = user.reset.as_mut() {
                *expires_at = Utc::now() - chrono::Duration::minutes(1);
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.tables.lock().unwrap().sessions.len()
    }

    pub fn feedback_messages(&self) -> Vec<String> {
        let t = self.tables.lock().unwrap();
        t.feedback.iter().map(|f| f.message.clone()).collect()
    }

    pub fn books(&self) -> Vec<Book> {
        self.tables.lock().unwrap().books.clone()
    }

    pub fn references(&self, kind: ReferenceKind) -> Vec<ReferenceEntry> {
        let t = self.tables.lock().unwrap();
        t.references.iter().filter(|r| r.kind == kind).cloned().collect()
    }
}

#[async_trait]
impl CatalogLookup for InMemoryDb {
    async fn available_books(&self) -> PortResult<Vec<BookSummary>> {
        self.lookups_enabled()?;
        let t = self.tables.lock().unwrap();
        let mut books = t.summaries_where(|b| b.no_of_copy > 0);
        books.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(books)
    }

    async fn books_by_author(&self, author: &str) -> PortResult<Vec<BookSummary>> {
        self.lookups_enabled()?;
        let t = self.tables.lock().unwrap();
        Ok(t.summaries_where(|b| contains_ci(&b.author_name, author)))
    }

    async fn books_matching_name(&self, name: &str) -> PortResult<Vec<BookSummary>> {
        self.lookups_enabled()?;
        let t = self.tables.lock().unwrap();
        Ok(t.summaries_where(|b| contains_ci(&Some(b.name.clone()), name)))
    }

    async fn books_in_category(&self, category: &str) -> PortResult<Vec<BookSummary>> {
        self.lookups_enabled()?;
        let t = self.tables.lock().unwrap();
        Ok(t.summaries_where(|b| contains_ci(&b.category_name, category)))
    }

    async fn save_feedback(&self, message: &str) -> PortResult<Feedback> {
        let mut t = self.tables.lock().unwrap();
        let feedback = Feedback {
            id: t.next_id(),
            message: message.to_string(),
            created_on: Utc::now(),
        };
        t.feedback.push(feedback.clone());
        Ok(feedback)
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.user.email == user.email) {
            return Err(PortError::Conflict("user already exists".to_string()));
        }
        let created = User {
            id: t.next_id(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
        };
        t.users.push(StoredUser {
            user: created.clone(),
            password_hash: user.hashed_password,
            reset: None,
        });
        Ok(created)
    }

    async fn get_user_by_id(&self, user_id: i64) -> PortResult<User> {
        let t = self.tables.lock().unwrap();
        t.users
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.user.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let t = self.tables.lock().unwrap();
        t.users
            .iter()
            .find(|u| u.user.email == email)
            .map(|u| UserCredentials {
                user: u.user.clone(),
                hashed_password: u.password_hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().map(|u| u.user.clone()).collect())
    }

    async fn update_user(&self, user_id: i64, update: UserUpdate) -> PortResult<User> {
        let mut t = self.tables.lock().unwrap();
        if t.users
            .iter()
            .any(|u| u.user.email == update.email && u.user.id != user_id)
        {
            return Err(PortError::Conflict("user already exists".to_string()));
        }
        let stored = t
            .users
            .iter_mut()
            .find(|u| u.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        stored.user.first_name = update.first_name;
        stored.user.last_name = update.last_name;
        stored.user.email = update.email;
        stored.user.role = update.role;
        Ok(stored.user.clone())
    }

    async fn delete_user(&self, user_id: i64) -> PortResult<()> {
        let mut t = self.tables.lock().unwrap();
        let before = t.users.len();
        t.users.retain(|u| u.user.id != user_id);
        if t.users.len() == before {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        t.sessions.retain(|s| s.user_id != user_id);
        t.loans.retain(|l| l.draft.user_id != user_id);
        t.reviews.retain(|r| r.user_id != user_id);
        Ok(())
    }

    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<bool> {
        let mut t = self.tables.lock().unwrap();
        match t.users.iter_mut().find(|u| u.user.email == email) {
            Some(user) => {
                user.reset = Some((token.to_string(), expires_at));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reset_password(&self, token: &str, hashed_password: &str) -> PortResult<bool> {
        let mut t = self.tables.lock().unwrap();
        let now = Utc::now();
        let user = t.users.iter_mut().find(|u| {
            u.reset
                .as_ref()
                .is_some_and(|(stored, expires_at)| stored == token && *expires_at > now)
        });
        match user {
            Some(user) => {
                user.password_hash = hashed_password.to_string();
                user.reset = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        self.tables.lock().unwrap().sessions.push(session);
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<i64> {
        let t = self.tables.lock().unwrap();
        t.sessions
            .iter()
            .find(|s| s.id == session_id && s.expires_at > Utc::now())
            .map(|s| s.user_id)
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables
            .lock()
            .unwrap()
            .sessions
            .retain(|s| s.id != session_id);
        Ok(())
    }

    async fn list_references(&self, kind: ReferenceKind) -> PortResult<Vec<ReferenceEntry>> {
        Ok(self.references(kind))
    }

    async fn get_reference(&self, kind: ReferenceKind, id: i64) -> PortResult<ReferenceEntry> {
        self.references(kind)
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", kind.label(), id)))
    }

    async fn create_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
        status: &str,
    ) -> PortResult<ReferenceEntry> {
        let mut t = self.tables.lock().unwrap();
        let entry = ReferenceEntry {
            id: t.next_id(),
            kind,
            name: name.to_string(),
            status: status.to_string(),
        };
        t.references.push(entry.clone());
        Ok(entry)
    }

    async fn update_reference(
        &self,
        kind: ReferenceKind,
        id: i64,
        name: &str,
        status: &str,
    ) -> PortResult<ReferenceEntry> {
        let mut t = self.tables.lock().unwrap();
        let entry = t
            .references
            .iter_mut()
            .find(|r| r.kind == kind && r.id == id)
            .ok_or_else(|| PortError::NotFound(format!("{} {} not found", kind.label(), id)))?;
        entry.name = name.to_string();
        entry.status = status.to_string();
        Ok(entry.clone())
    }

    async fn delete_reference(&self, kind: ReferenceKind, id: i64) -> PortResult<()> {
        let mut t = self.tables.lock().unwrap();
        let referenced = t.books.iter().any(|b| {
            let column = match kind {
                ReferenceKind::Author => b.author_id,
                ReferenceKind::Category => b.category_id,
                ReferenceKind::Publisher => b.publisher_id,
            };
            column == Some(id)
        });
        if referenced {
            return Err(PortError::Conflict(format!(
                "{} {} is still referenced by other records",
                kind.label(),
                id
            )));
        }
        let before = t.references.len();
        t.references.retain(|r| !(r.kind == kind && r.id == id));
        if t.references.len() == before {
            return Err(PortError::NotFound(format!("{} {} not found", kind.label(), id)));
        }
        Ok(())
    }

    async fn list_books(&self) -> PortResult<Vec<BookSummary>> {
        self.lookups_enabled()?;
        let t = self.tables.lock().unwrap();
        Ok(t.summaries_where(|_| true))
    }

    async fn get_book(&self, book_id: i64) -> PortResult<Book> {
        let t = self.tables.lock().unwrap();
        t.books
            .iter()
            .find(|b| b.id == book_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Book {} not found", book_id)))
    }

    async fn create_book(&self, draft: BookDraft) -> PortResult<Book> {
        self.tables.lock().unwrap().check_references(&draft)?;
        let id = self.seed_book(draft);
        self.get_book(id).await
    }

    async fn update_book(&self, book_id: i64, draft: BookDraft) -> PortResult<Book> {
        let mut t = self.tables.lock().unwrap();
        t.check_references(&draft)?;
        let book = t
            .books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or_else(|| PortError::NotFound(format!("Book {} not found", book_id)))?;
        book.name = draft.name;
        book.author_id = draft.author_id;
        book.category_id = draft.category_id;
        book.publisher_id = draft.publisher_id;
        book.isbn = draft.isbn;
        book.status = draft.status;
        book.no_of_copy = draft.no_of_copy;
        book.pdf_path = draft.pdf_path;
        book.picture = draft.picture;
        book.updated_on = Utc::now();
        Ok(book.clone())
    }

    async fn delete_book(&self, book_id: i64) -> PortResult<()> {
        let mut t = self.tables.lock().unwrap();
        let before = t.books.len();
        t.books.retain(|b| b.id != book_id);
        if t.books.len() == before {
            return Err(PortError::NotFound(format!("Book {} not found", book_id)));
        }
        t.loans.retain(|l| l.draft.book_id != book_id);
        t.reviews.retain(|r| r.book_id != book_id);
        Ok(())
    }

    async fn pdf_path_for_book(&self, book_id: i64) -> PortResult<Option<String>> {
        let t = self.tables.lock().unwrap();
        Ok(t.books
            .iter()
            .find(|b| b.id == book_id)
            .and_then(|b| b.pdf_path.clone()))
    }

    async fn pdf_path_for_isbn(&self, isbn: &str) -> PortResult<Option<String>> {
        let t = self.tables.lock().unwrap();
        Ok(t.books
            .iter()
            .find(|b| b.isbn.as_deref() == Some(isbn))
            .and_then(|b| b.pdf_path.clone()))
    }

    async fn list_issued_books(&self) -> PortResult<Vec<IssuedBook>> {
        let t = self.tables.lock().unwrap();
        Ok(t.loans.iter().map(|l| t.loan(l)).collect())
    }

    async fn get_issued_book(&self, issue_id: i64) -> PortResult<IssuedBook> {
        let t = self.tables.lock().unwrap();
        t.loans
            .iter()
            .find(|l| l.id == issue_id)
            .map(|l| t.loan(l))
            .ok_or_else(|| PortError::NotFound(format!("Issued book {} not found", issue_id)))
    }

    async fn create_issued_book(&self, draft: LoanDraft) -> PortResult<IssuedBook> {
        let mut t = self.tables.lock().unwrap();
        if !t.books.iter().any(|b| b.id == draft.book_id)
            || !t.users.iter().any(|u| u.user.id == draft.user_id)
        {
            return Err(PortError::Conflict("book or user does not exist".to_string()));
        }
        let loan = StoredLoan {
            id: t.next_id(),
            draft,
            issue_date_time: Utc::now().naive_utc(),
        };
        let issued = t.loan(&loan);
        t.loans.push(loan);
        Ok(issued)
    }

    async fn update_issued_book(&self, issue_id: i64, draft: LoanDraft) -> PortResult<IssuedBook> {
        {
            let mut t = self.tables.lock().unwrap();
            let loan = t
                .loans
                .iter_mut()
                .find(|l| l.id == issue_id)
                .ok_or_else(|| PortError::NotFound(format!("Issued book {} not found", issue_id)))?;
            loan.draft = draft;
        }
        self.get_issued_book(issue_id).await
    }

    async fn delete_issued_book(&self, issue_id: i64) -> PortResult<()> {
        let mut t = self.tables.lock().unwrap();
        let before = t.loans.len();
        t.loans.retain(|l| l.id != issue_id);
        if t.loans.len() == before {
            return Err(PortError::NotFound(format!("Issued book {} not found", issue_id)));
        }
        Ok(())
    }

    async fn dashboard_stats(&self) -> PortResult<DashboardStats> {
        let t = self.tables.lock().unwrap();
        let issued: Vec<i64> = t
            .loans
            .iter()
            .filter(|l| l.draft.status == LoanStatus::Issued)
            .map(|l| l.draft.book_id)
            .collect();
        Ok(DashboardStats {
            total_books: t.books.len() as i64,
            available_books: t.books.iter().filter(|b| !issued.contains(&b.id)).count() as i64,
            issued_books: issued.len() as i64,
            returned_books: t
                .loans
                .iter()
                .filter(|l| l.draft.status == LoanStatus::Returned)
                .count() as i64,
        })
    }

    async fn list_reviews(&self) -> PortResult<Vec<Review>> {
        let t = self.tables.lock().unwrap();
        let mut reviews: Vec<Review> = t
            .reviews
            .iter()
            .cloned()
            .map(|mut r| {
                r.reviewer_first_name = t
                    .users
                    .iter()
                    .find(|u| u.user.id == r.user_id)
                    .map(|u| u.user.first_name.clone());
                r.book_name = t.books.iter().find(|b| b.id == r.book_id).map(|b| b.name.clone());
                r
            })
            .collect();
        reviews.sort_by(|a, b| b.created_on.cmp(&a.created_on).then(b.id.cmp(&a.id)));
        Ok(reviews)
    }

    async fn upsert_review(
        &self,
        user_id: i64,
        book_id: i64,
        review: &str,
        rating: Rating,
    ) -> PortResult<ReviewWrite> {
        let mut t = self.tables.lock().unwrap();
        if !t.books.iter().any(|b| b.id == book_id) {
            return Err(PortError::Conflict(format!("book {} does not exist", book_id)));
        }
        if let Some(existing) = t
            .reviews
            .iter_mut()
            .find(|r| r.user_id == user_id && r.book_id == book_id)
        {
            existing.review = review.to_string();
            existing.rating = rating;
            existing.updated_on = Utc::now();
            return Ok(ReviewWrite::Updated);
        }
        let now = Utc::now();
        let id = t.next_id();
        t.reviews.push(Review {
            id,
            user_id,
            book_id,
            review: review.to_string(),
            rating,
            created_on: now,
            updated_on: now,
            reviewer_first_name: None,
            book_name: None,
        });
        Ok(ReviewWrite::Created)
    }

    async fn list_book_queries(&self) -> PortResult<Vec<BookQuery>> {
        Ok(self.tables.lock().unwrap().queries.clone())
    }

    async fn create_book_query(
        &self,
        book_request: &str,
        description: &str,
    ) -> PortResult<BookQuery> {
        let mut t = self.tables.lock().unwrap();
        let query = BookQuery {
            id: t.next_id(),
            book_request: book_request.to_string(),
            description: description.to_string(),
        };
        t.queries.push(query.clone());
        Ok(query)
    }
}

//=========================================================================================
// Stub external services
//=========================================================================================

#[derive(Default)]
pub struct StubBookSearch {
    pub volumes: Vec<Volume>,
}

#[async_trait]
impl BookSearchService for StubBookSearch {
    async fn search_volumes(&self, _query: &str) -> PortResult<Vec<Volume>> {
        Ok(self.volumes.clone())
    }
}

pub struct StubEncyclopedia;

#[async_trait]
impl EncyclopediaService for StubEncyclopedia {
    async fn search(&self, _topic: &str, _limit: usize) -> PortResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn page_summary(&self, title: &str) -> PortResult<PageSummary> {
        Err(PortError::NotFound(title.to_string()))
    }
}

/// Always answers with the same text.
pub struct StubGenerator(pub &'static str);

#[async_trait]
impl TextGenerationService for StubGenerator {
    async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> PortResult<String> {
        Ok(self.0.to_string())
    }
}

//=========================================================================================
// App state & helpers
//=========================================================================================

pub fn test_config(static_dir: &Path) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().expect("socket addr"),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        static_dir: static_dir.to_path_buf(),
        public_base_url: "http://library.test".to_string(),
        cors_origin: "http://library.test".to_string(),
        openai_api_key: None,
        text_model: "test-model".to_string(),
        google_books_api_key: None,
        google_books_url: "http://books.invalid".to_string(),
        wikipedia_api_url: "http://wiki.invalid/w/api.php".to_string(),
        wikipedia_rest_url: "http://wiki.invalid/api/rest_v1".to_string(),
        http_timeout: Duration::from_secs(1),
        session_ttl_days: 30,
        reset_token_ttl_minutes: 60,
    }
}

pub fn app_state_with(
    db: Arc<InMemoryDb>,
    static_dir: &Path,
    book_search: StubBookSearch,
    generator_reply: &'static str,
) -> Arc<AppState> {
    let config = test_config(static_dir);
    let chat = ChatRouter::new(
        db.clone(),
        Arc::new(book_search),
        Arc::new(StubEncyclopedia),
        Arc::new(StubGenerator(generator_reply)),
        config.render_options().unwrap(),
    );
    Arc::new(AppState {
        db,
        uploads: UploadStore::new(config.uploads_dir()),
        config: Arc::new(config),
        chat: Arc::new(chat),
    })
}

pub fn app_state(db: Arc<InMemoryDb>, static_dir: &Path) -> Arc<AppState> {
    app_state_with(db, static_dir, StubBookSearch::default(), "I can help with that")
}

pub fn current(user: &User) -> CurrentUser {
    user.clone().into()
}

/// Turns any handler result into a `Response`.
pub fn respond(result: impl IntoResponse) -> Response {
    result.into_response()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body")
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}
