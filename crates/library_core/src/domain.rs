//! crates/library_core/src/domain.rs
//!
//! Defines the pure, core data structures for the library.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Users & Sessions
//=========================================================================================

/// The two roles a library account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub hashed_password: String,
}

/// Fields accepted when an account is created, either by registration or by an admin.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub hashed_password: String,
    pub role: Role,
}

/// Fields an admin may change on an existing account.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Splits a single "full name" field into first name and the rest.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

//=========================================================================================
// Reference tables: authors, categories, publishers
//=========================================================================================

/// Which of the three simple reference tables an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Author,
    Category,
    Publisher,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 3] = [
        ReferenceKind::Author,
        ReferenceKind::Category,
        ReferenceKind::Publisher,
    ];

    /// Singular, human-facing name.
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Author => "author",
            ReferenceKind::Category => "category",
            ReferenceKind::Publisher => "publisher",
        }
    }
}

/// An author, category or publisher row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEntry {
    pub id: i64,
    pub kind: ReferenceKind,
    pub name: String,
    pub status: String,
}

//=========================================================================================
// Books
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Book {
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

/// The editable part of a book, used for both inserts and updates.
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub name: String,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    pub publisher_id: Option<i64>,
    pub isbn: Option<String>,
    pub status: String,
    pub no_of_copy: i32,
    pub pdf_path: Option<String>,
    pub picture: Option<String>,
}

/// A book joined with the names of its author, category and publisher.
#[derive(Debug, Clone, Default)]
pub struct BookSummary {
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

/// A volume returned by the external book-search service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Volume {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub info_link: Option<String>,
}

//=========================================================================================
// Loans ("issued books")
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Issued,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Issued => "issued",
            LoanStatus::Returned => "returned",
        }
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "issued" => Ok(LoanStatus::Issued),
            "returned" => Ok(LoanStatus::Returned),
            other => Err(format!("unknown loan status '{}'", other)),
        }
    }
}

/// A loan record joined with the book and borrower it refers to.
#[derive(Debug, Clone)]
pub struct IssuedBook {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub issue_date_time: NaiveDateTime,
    pub expected_return_date: NaiveDate,
    pub return_date_time: Option<NaiveDateTime>,
    pub status: LoanStatus,
    pub book_name: Option<String>,
    pub isbn: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoanDraft {
    pub book_id: i64,
    pub user_id: i64,
    pub expected_return_date: NaiveDate,
    pub return_date_time: Option<NaiveDateTime>,
    pub status: LoanStatus,
}

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_books: i64,
    pub available_books: i64,
    pub issued_books: i64,
    pub returned_books: i64,
}

//=========================================================================================
// Reviews, requests and feedback
//=========================================================================================

/// A star rating, guaranteed to be within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    /// Parses a raw form value such as `"4"`.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().and_then(Self::new)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub review: String,
    pub rating: Rating,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub reviewer_first_name: Option<String>,
    pub book_name: Option<String>,
}

/// Whether a review submission created a new row or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewWrite {
    Created,
    Updated,
}

/// A patron's request for a book the library does not have.
#[derive(Debug, Clone)]
pub struct BookQuery {
    pub id: i64,
    pub book_request: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Feedback {
    pub id: i64,
    pub message: String,
    pub created_on: DateTime<Utc>,
}
