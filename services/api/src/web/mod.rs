pub mod auth;
pub mod books;
pub mod catalog;
pub mod chat;
pub mod dashboard;
pub mod flash;
pub mod forms;
pub mod loans;
pub mod middleware;
pub mod queries;
pub mod rest;
pub mod reviews;
pub mod state;
pub mod users;
pub mod views;

pub use flash::{Flash, FlashLevel};
pub use middleware::{require_admin, require_auth, CurrentUser};
