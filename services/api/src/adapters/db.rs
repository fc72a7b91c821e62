//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CatalogLookup` and `DatabaseService` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use library_core::domain::{
    AuthSession, Book, BookDraft, BookQuery, BookSummary, DashboardStats, Feedback, IssuedBook,
    LoanDraft, NewUser, Rating, ReferenceEntry, ReferenceKind, Review, ReviewWrite, User,
    UserCredentials, UserUpdate,
};
use library_core::ports::{CatalogLookup, DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn summaries(&self, filter: &str, arg: Option<String>) -> PortResult<Vec<BookSummary>> {
        let sql = format!("{} {}", BOOK_SUMMARY_SELECT, filter);
        let mut query = sqlx::query_as::<_, BookSummaryRecord>(&sql);
        if let Some(arg) = arg {
            query = query.bind(arg);
        }
        let records = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| port_error(e, "books"))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

//=========================================================================================
// Error mapping & SQL helpers
//=========================================================================================

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

/// Maps a `sqlx` error into the port's error vocabulary.
fn port_error(e: sqlx::Error, what: &str) -> PortError {
    if let sqlx::Error::RowNotFound = e {
        return PortError::NotFound(format!("{} not found", what));
    }
    if let Some(db_err) = e.as_database_error() {
        match db_err.code().as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => {
                return PortError::Conflict(format!(
                    "{} is still referenced by other records",
                    what
                ))
            }
            Some(UNIQUE_VIOLATION) => {
                return PortError::Conflict(format!("{} already exists", what))
            }
            _ => {}
        }
    }
    PortError::Unexpected(e.to_string())
}

/// Builds an `ILIKE` pattern matching `needle` anywhere, with wildcards in it escaped.
fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn reference_table(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::Author => "authors",
        ReferenceKind::Category => "categories",
        ReferenceKind::Publisher => "publishers",
    }
}

fn ensure_affected(rows: u64, what: String) -> PortResult<()> {
    if rows == 0 {
        Err(PortError::NotFound(what))
    } else {
        Ok(())
    }
}

const BOOK_SUMMARY_SELECT: &str = "SELECT b.id, b.name, b.isbn, b.status, b.no_of_copy, b.pdf_path, b.picture, \
     a.name AS author_name, c.name AS category_name, p.name AS publisher_name \
     FROM books b \
     LEFT JOIN authors a ON a.id = b.author_id \
     LEFT JOIN categories c ON c.id = b.category_id \
     LEFT JOIN publishers p ON p.id = b.publisher_id";

const BOOK_COLUMNS: &str = "id, name, author_id, category_id, publisher_id, isbn, status, no_of_copy, \
     pdf_path, picture, added_on, updated_on";

const ISSUED_BOOK_SELECT: &str = "SELECT ib.id, ib.book_id, ib.user_id, ib.issue_date_time, ib.expected_return_date, \
     ib.return_date_time, ib.status, b.name AS book_name, b.isbn, u.first_name, u.last_name \
     FROM issued_books ib \
     LEFT JOIN books b ON b.id = ib.book_id \
     LEFT JOIN users u ON u.id = ib.user_id";

const USER_COLUMNS: &str = "id, first_name, last_name, email, role";

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    role: String,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            role: self.role.parse().map_err(PortError::Unexpected)?,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    #[sqlx(flatten)]
    user: UserRecord,
    password_hash: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> PortResult<UserCredentials> {
        Ok(UserCredentials {
            user: self.user.to_domain()?,
            hashed_password: self.password_hash,
        })
    }
}

#[derive(FromRow)]
struct ReferenceRecord {
    id: i64,
    name: String,
    status: String,
}
impl ReferenceRecord {
    fn to_domain(self, kind: ReferenceKind) -> ReferenceEntry {
        ReferenceEntry {
            id: self.id,
            kind,
            name: self.name,
            status: self.status,
        }
    }
}

#[derive(FromRow)]
struct BookRecord {
    id: i64,
    name: String,
    author_id: Option<i64>,
    category_id: Option<i64>,
    publisher_id: Option<i64>,
    isbn: Option<String>,
    status: String,
    no_of_copy: i32,
    pdf_path: Option<String>,
    picture: Option<String>,
    added_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}
impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            name: self.name,
            author_id: self.author_id,
            category_id: self.category_id,
            publisher_id: self.publisher_id,
            isbn: self.isbn,
            status: self.status,
            no_of_copy: self.no_of_copy,
            pdf_path: self.pdf_path,
            picture: self.picture,
            added_on: self.added_on,
            updated_on: self.updated_on,
        }
    }
}

#[derive(FromRow)]
struct BookSummaryRecord {
    id: i64,
    name: String,
    isbn: Option<String>,
    status: String,
    no_of_copy: i32,
    pdf_path: Option<String>,
    picture: Option<String>,
    author_name: Option<String>,
    category_name: Option<String>,
    publisher_name: Option<String>,
}
impl BookSummaryRecord {
    fn to_domain(self) -> BookSummary {
        BookSummary {
            id: self.id,
            name: self.name,
            isbn: self.isbn,
            status: self.status,
            no_of_copy: self.no_of_copy,
            pdf_path: self.pdf_path,
            picture: self.picture,
            author_name: self.author_name,
            category_name: self.category_name,
            publisher_name: self.publisher_name,
        }
    }
}

#[derive(FromRow)]
struct IssuedBookRecord {
    id: i64,
    book_id: i64,
    user_id: i64,
    issue_date_time: NaiveDateTime,
    expected_return_date: NaiveDate,
    return_date_time: Option<NaiveDateTime>,
    status: String,
    book_name: Option<String>,
    isbn: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}
impl IssuedBookRecord {
    fn to_domain(self) -> PortResult<IssuedBook> {
        Ok(IssuedBook {
            id: self.id,
            book_id: self.book_id,
            user_id: self.user_id,
            issue_date_time: self.issue_date_time,
            expected_return_date: self.expected_return_date,
            return_date_time: self.return_date_time,
            status: self.status.parse().map_err(PortError::Unexpected)?,
            book_name: self.book_name,
            isbn: self.isbn,
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

#[derive(FromRow)]
struct ReviewRecord {
    id: i64,
    user_id: i64,
    book_id: i64,
    review: String,
    rating: i16,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
    reviewer_first_name: Option<String>,
    book_name: Option<String>,
}
impl ReviewRecord {
    fn to_domain(self) -> PortResult<Review> {
        let rating = Rating::new(self.rating.into()).ok_or_else(|| {
            PortError::Unexpected(format!("review {} has rating {}", self.id, self.rating))
        })?;
        Ok(Review {
            id: self.id,
            user_id: self.user_id,
            book_id: self.book_id,
            review: self.review,
            rating,
            created_on: self.created_on,
            updated_on: self.updated_on,
            reviewer_first_name: self.reviewer_first_name,
            book_name: self.book_name,
        })
    }
}

#[derive(FromRow)]
struct BookQueryRecord {
    id: i64,
    book_request: String,
    description: String,
}
impl BookQueryRecord {
    fn to_domain(self) -> BookQuery {
        BookQuery {
            id: self.id,
            book_request: self.book_request,
            description: self.description,
        }
    }
}

#[derive(FromRow)]
struct FeedbackRecord {
    id: i64,
    message: String,
    created_on: DateTime<Utc>,
}
impl FeedbackRecord {
    fn to_domain(self) -> Feedback {
        Feedback {
            id: self.id,
            message: self.message,
            created_on: self.created_on,
        }
    }
}

//=========================================================================================
// `CatalogLookup` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogLookup for DbAdapter {
    async fn available_books(&self) -> PortResult<Vec<BookSummary>> {
        self.summaries("WHERE b.no_of_copy > 0 ORDER BY b.name", None)
            .await
    }

    async fn books_by_author(&self, author: &str) -> PortResult<Vec<BookSummary>> {
        self.summaries(
            "WHERE a.name ILIKE $1 ORDER BY b.id",
            Some(contains_pattern(author)),
        )
        .await
    }

    async fn books_matching_name(&self, name: &str) -> PortResult<Vec<BookSummary>> {
        self.summaries(
            "WHERE b.name ILIKE $1 ORDER BY b.id",
            Some(contains_pattern(name)),
        )
        .await
    }

    async fn books_in_category(&self, category: &str) -> PortResult<Vec<BookSummary>> {
        self.summaries(
            "WHERE c.name ILIKE $1 ORDER BY b.id",
            Some(contains_pattern(category)),
        )
        .await
    }

    async fn save_feedback(&self, message: &str) -> PortResult<Feedback> {
        let record = sqlx::query_as::<_, FeedbackRecord>(
            "INSERT INTO feedback (message) VALUES ($1) RETURNING id, message, created_on",
        )
        .bind(message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, "feedback"))?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, user: NewUser) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.hashed_password)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, "user"))?;
        record.to_domain()
    }

    async fn get_user_by_id(&self, user_id: i64) -> PortResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("User {}", user_id)))?;
        record.to_domain()
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let sql = format!(
            "SELECT {}, password_hash FROM users WHERE email = $1",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, CredentialsRecord>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, "User"))?;
        record.to_domain()
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let records = sqlx::query_as::<_, UserRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| port_error(e, "users"))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_user(&self, user_id: i64, update: UserUpdate) -> PortResult<User> {
        let sql = format!(
            "UPDATE users SET first_name = $1, last_name = $2, email = $3, role = $4 \
             WHERE id = $5 RETURNING {}",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.email)
            .bind(update.role.as_str())
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("User {}", user_id)))?;
        record.to_domain()
    }

    async fn delete_user(&self, user_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("User {}", user_id)))?;
        ensure_affected(result.rows_affected(), format!("User {} not found", user_id))
    }

    async fn set_reset_token(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET reset_token = $1, reset_token_expires_at = $2 WHERE email = $3",
        )
        .bind(token)
        .bind(expires_at)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(|e| port_error(e, "reset token"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn reset_password(&self, token: &str, hashed_password: &str) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, reset_token = NULL, reset_token_expires_at = NULL \
             WHERE reset_token = $2 AND reset_token_expires_at > NOW()",
        )
        .bind(hashed_password)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| port_error(e, "reset token"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_auth_session(&self, session: AuthSession) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(e, "auth session"))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| port_error(e, "auth session"))?
        .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(e, "auth session"))?;
        Ok(())
    }

    async fn list_references(&self, kind: ReferenceKind) -> PortResult<Vec<ReferenceEntry>> {
        let sql = format!(
            "SELECT id, name, status FROM {} ORDER BY id",
            reference_table(kind)
        );
        let records = sqlx::query_as::<_, ReferenceRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| port_error(e, reference_table(kind)))?;
        Ok(records.into_iter().map(|r| r.to_domain(kind)).collect())
    }

    async fn get_reference(&self, kind: ReferenceKind, id: i64) -> PortResult<ReferenceEntry> {
        let sql = format!(
            "SELECT id, name, status FROM {} WHERE id = $1",
            reference_table(kind)
        );
        let record = sqlx::query_as::<_, ReferenceRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("{} {}", kind.label(), id)))?;
        Ok(record.to_domain(kind))
    }

    async fn create_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
        status: &str,
    ) -> PortResult<ReferenceEntry> {
        let sql = format!(
            "INSERT INTO {} (name, status) VALUES ($1, $2) RETURNING id, name, status",
            reference_table(kind)
        );
        let record = sqlx::query_as::<_, ReferenceRecord>(&sql)
            .bind(name)
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, kind.label()))?;
        Ok(record.to_domain(kind))
    }

    async fn update_reference(
        &self,
        kind: ReferenceKind,
        id: i64,
        name: &str,
        status: &str,
    ) -> PortResult<ReferenceEntry> {
        let sql = format!(
            "UPDATE {} SET name = $1, status = $2 WHERE id = $3 RETURNING id, name, status",
            reference_table(kind)
        );
        let record = sqlx::query_as::<_, ReferenceRecord>(&sql)
            .bind(name)
            .bind(status)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("{} {}", kind.label(), id)))?;
        Ok(record.to_domain(kind))
    }

    async fn delete_reference(&self, kind: ReferenceKind, id: i64) -> PortResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", reference_table(kind));
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("{} {}", kind.label(), id)))?;
        ensure_affected(
            result.rows_affected(),
            format!("{} {} not found", kind.label(), id),
        )
    }

    async fn list_books(&self) -> PortResult<Vec<BookSummary>> {
        self.summaries("ORDER BY b.id", None).await
    }

    async fn get_book(&self, book_id: i64) -> PortResult<Book> {
        let sql = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let record = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(book_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("Book {}", book_id)))?;
        Ok(record.to_domain())
    }

    async fn create_book(&self, draft: BookDraft) -> PortResult<Book> {
        let sql = format!(
            "INSERT INTO books (name, author_id, category_id, publisher_id, isbn, status, no_of_copy, pdf_path, picture) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            BOOK_COLUMNS
        );
        let record = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(&draft.name)
            .bind(draft.author_id)
            .bind(draft.category_id)
            .bind(draft.publisher_id)
            .bind(&draft.isbn)
            .bind(&draft.status)
            .bind(draft.no_of_copy)
            .bind(&draft.pdf_path)
            .bind(&draft.picture)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, "book"))?;
        Ok(record.to_domain())
    }

    async fn update_book(&self, book_id: i64, draft: BookDraft) -> PortResult<Book> {
        let sql = format!(
            "UPDATE books SET name = $1, author_id = $2, category_id = $3, publisher_id = $4, isbn = $5, \
             status = $6, no_of_copy = $7, pdf_path = $8, picture = $9, updated_on = NOW() \
             WHERE id = $10 RETURNING {}",
            BOOK_COLUMNS
        );
        let record = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(&draft.name)
            .bind(draft.author_id)
            .bind(draft.category_id)
            .bind(draft.publisher_id)
            .bind(&draft.isbn)
            .bind(&draft.status)
            .bind(draft.no_of_copy)
            .bind(&draft.pdf_path)
            .bind(&draft.picture)
            .bind(book_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("Book {}", book_id)))?;
        Ok(record.to_domain())
    }

    async fn delete_book(&self, book_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("Book {}", book_id)))?;
        ensure_affected(result.rows_affected(), format!("Book {} not found", book_id))
    }

    async fn pdf_path_for_book(&self, book_id: i64) -> PortResult<Option<String>> {
        let path = sqlx::query_scalar::<_, Option<String>>("SELECT pdf_path FROM books WHERE id = $1")
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| port_error(e, "book"))?;
        Ok(path.flatten())
    }

    async fn pdf_path_for_isbn(&self, isbn: &str) -> PortResult<Option<String>> {
        let path = sqlx::query_scalar::<_, Option<String>>(
            "SELECT pdf_path FROM books WHERE isbn = $1 ORDER BY id LIMIT 1",
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| port_error(e, "book"))?;
        Ok(path.flatten())
    }

    async fn list_issued_books(&self) -> PortResult<Vec<IssuedBook>> {
        let sql = format!("{} ORDER BY ib.id", ISSUED_BOOK_SELECT);
        let records = sqlx::query_as::<_, IssuedBookRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| port_error(e, "issued books"))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_issued_book(&self, issue_id: i64) -> PortResult<IssuedBook> {
        let sql = format!("{} WHERE ib.id = $1", ISSUED_BOOK_SELECT);
        let record = sqlx::query_as::<_, IssuedBookRecord>(&sql)
            .bind(issue_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| port_error(e, &format!("Issued book {}", issue_id)))?;
        record.to_domain()
    }

    async fn create_issued_book(&self, draft: LoanDraft) -> PortResult<IssuedBook> {
        let issue_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO issued_books (book_id, user_id, expected_return_date, return_date_time, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(draft.book_id)
        .bind(draft.user_id)
        .bind(draft.expected_return_date)
        .bind(draft.return_date_time)
        .bind(draft.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, "issued book"))?;
        self.get_issued_book(issue_id).await
    }

    async fn update_issued_book(&self, issue_id: i64, draft: LoanDraft) -> PortResult<IssuedBook> {
        let result = sqlx::query(
            "UPDATE issued_books SET book_id = $1, user_id = $2, expected_return_date = $3, \
             return_date_time = $4, status = $5 WHERE id = $6",
        )
        .bind(draft.book_id)
        .bind(draft.user_id)
        .bind(draft.expected_return_date)
        .bind(draft.return_date_time)
        .bind(draft.status.as_str())
        .bind(issue_id)
        .execute(&self.pool)
        .await
        .map_err(|e| port_error(e, "issued book"))?;
        ensure_affected(
            result.rows_affected(),
            format!("Issued book {} not found", issue_id),
        )?;
        self.get_issued_book(issue_id).await
    }

    async fn delete_issued_book(&self, issue_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM issued_books WHERE id = $1")
            .bind(issue_id)
            .execute(&self.pool)
            .await
            .map_err(|e| port_error(e, "issued book"))?;
        ensure_affected(
            result.rows_affected(),
            format!("Issued book {} not found", issue_id),
        )
    }

    async fn dashboard_stats(&self) -> PortResult<DashboardStats> {
        let count = |sql: &'static str| sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool);
        let (total_books, available_books, issued_books, returned_books) = futures::try_join!(
            count("SELECT COUNT(*) FROM books"),
            count(
                "SELECT COUNT(*) FROM books WHERE id NOT IN \
                 (SELECT book_id FROM issued_books WHERE status = 'issued')"
            ),
            count("SELECT COUNT(*) FROM issued_books WHERE status = 'issued'"),
            count("SELECT COUNT(*) FROM issued_books WHERE status = 'returned'"),
        )
        .map_err(|e| port_error(e, "dashboard stats"))?;

        Ok(DashboardStats {
            total_books,
            available_books,
            issued_books,
            returned_books,
        })
    }

    async fn list_reviews(&self) -> PortResult<Vec<Review>> {
        let records = sqlx::query_as::<_, ReviewRecord>(
            "SELECT r.id, r.user_id, r.book_id, r.review, r.rating, r.created_on, r.updated_on, \
             u.first_name AS reviewer_first_name, b.name AS book_name \
             FROM reviews r \
             JOIN users u ON u.id = r.user_id \
             JOIN books b ON b.id = r.book_id \
             ORDER BY r.created_on DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| port_error(e, "reviews"))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn upsert_review(
        &self,
        user_id: i64,
        book_id: i64,
        review: &str,
        rating: Rating,
    ) -> PortResult<ReviewWrite> {
        // xmax is 0 only for freshly inserted tuples.
        let inserted = sqlx::query_scalar::<_, bool>(
            "INSERT INTO reviews (user_id, book_id, review, rating) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, book_id) DO UPDATE \
             SET review = EXCLUDED.review, rating = EXCLUDED.rating, updated_on = NOW() \
             RETURNING (xmax = 0) AS inserted",
        )
        .bind(user_id)
        .bind(book_id)
        .bind(review)
        .bind(i16::from(rating.value()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, "review"))?;

        Ok(if inserted {
            ReviewWrite::Created
        } else {
            ReviewWrite::Updated
        })
    }

    async fn list_book_queries(&self) -> PortResult<Vec<BookQuery>> {
        let records = sqlx::query_as::<_, BookQueryRecord>(
            "SELECT id, book_request, description FROM book_queries ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| port_error(e, "book queries"))?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_book_query(
        &self,
        book_request: &str,
        description: &str,
    ) -> PortResult<BookQuery> {
        let record = sqlx::query_as::<_, BookQueryRecord>(
            "INSERT INTO book_queries (book_request, description) VALUES ($1, $2) \
             RETURNING id, book_request, description",
        )
        .bind(book_request)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| port_error(e, "book query"))?;
        Ok(record.to_domain())
    }
}
