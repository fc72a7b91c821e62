//! services/api/src/web/rest.rs
//!
//! The OpenAPI document, served by Swagger UI and written out by the `openapi` binary.

use utoipa::OpenApi;

use crate::web::{
    auth, books, catalog, chat, dashboard, flash, loans, queries, reviews, users, views,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::forgot_password_handler,
        auth::reset_password_handler,
        chat::chat_handler,
        chat::search_handler,
        books::list_books_handler,
        books::save_book_handler,
        books::edit_book_handler,
        books::delete_book_handler,
        books::download_pdf_handler,
        catalog::list_references_handler,
        catalog::save_reference_handler,
        catalog::edit_reference_handler,
        catalog::delete_reference_handler,
        loans::list_issued_books_handler,
        loans::save_issued_book_handler,
        loans::edit_issued_book_handler,
        loans::delete_issued_book_handler,
        users::list_users_handler,
        users::save_user_handler,
        users::edit_user_handler,
        users::delete_user_handler,
        users::view_user_handler,
        users::library_handler,
        reviews::list_reviews_handler,
        reviews::submit_review_handler,
        queries::list_queries_handler,
        queries::submit_query_handler,
        dashboard::dashboard_stats_handler,
        dashboard::dashboard_handler,
    ),
    components(
        schemas(
            flash::Flash,
            flash::FlashLevel,
            auth::RegisterForm,
            auth::LoginForm,
            auth::LoginResponse,
            auth::ForgotPasswordForm,
            auth::ResetPasswordForm,
            chat::ChatRequest,
            chat::ChatResponse,
            chat::SearchRequest,
            catalog::ReferenceForm,
            books::BookEditView,
            loans::IssueBookForm,
            loans::IssuedBooksPage,
            users::UserForm,
            users::LibraryView,
            reviews::ReviewForm,
            reviews::ReviewsPage,
            reviews::ReviewableBook,
            queries::BookQueryForm,
            dashboard::DashboardStatsResponse,
            dashboard::DashboardView,
            views::UserView,
            views::ReferenceView,
            views::BookView,
            views::BookSummaryView,
            views::SearchHit,
            views::IssuedBookView,
            views::DashboardStatsView,
            views::ReviewView,
            views::BookQueryView,
        )
    ),
    tags(
        (name = "Library API", description = "Catalogue management, patron pages and the chat assistant.")
    )
)]
pub struct ApiDoc;
