//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        db::DbAdapter, google_books::GoogleBooksAdapter, text_gen_llm::OpenAiTextGenAdapter,
        uploads::UploadStore, wikipedia::WikipediaAdapter,
    },
    config::Config,
    error::ApiError,
    web::{
        auth::{
            forgot_password_handler, login_handler, logout_handler, register_handler,
            reset_password_handler,
        },
        books::{
            delete_book_handler, download_pdf_handler, edit_book_handler, list_books_handler,
            save_book_handler,
        },
        catalog::{
            delete_reference_handler, edit_reference_handler, list_references_handler,
            save_reference_handler,
        },
        chat::{chat_handler, search_handler},
        dashboard::{dashboard_handler, dashboard_stats_handler},
        loans::{
            delete_issued_book_handler, edit_issued_book_handler, list_issued_books_handler,
            save_issued_book_handler,
        },
        middleware::{require_admin, require_auth},
        queries::{list_queries_handler, submit_query_handler},
        rest::ApiDoc,
        reviews::{list_reviews_handler, submit_review_handler},
        state::AppState,
        users::{
            delete_user_handler, edit_user_handler, library_handler, list_users_handler,
            save_user_handler, view_user_handler,
        },
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use library_core::router::ChatRouter;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "{},tower_http=info",
            config.log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .user_agent(concat!("library-assistant/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let book_search = Arc::new(GoogleBooksAdapter::new(
        http.clone(),
        config.google_books_url.clone(),
        config.google_books_api_key.clone(),
    ));
    let encyclopedia = Arc::new(WikipediaAdapter::new(
        http,
        config.wikipedia_api_url.clone(),
        config.wikipedia_rest_url.clone(),
    ));

    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let generator = Arc::new(OpenAiTextGenAdapter::new(
        Client::with_config(openai_config),
        config.text_model.clone(),
    ));

    let uploads = UploadStore::new(config.uploads_dir());
    tokio::fs::create_dir_all(uploads.dir()).await?;

    let chat = Arc::new(ChatRouter::new(
        db_adapter.clone(),
        book_search,
        encyclopedia,
        generator,
        config.render_options()?,
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        chat,
        uploads,
    });

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>().map_err(|e| {
            ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
        })?)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/forgot_password", post(forgot_password_handler))
        .route("/auth/reset_password/{token}", post(reset_password_handler))
        .route("/chat", post(chat_handler))
        .route("/search", post(search_handler))
        .route("/download_pdf/{identifier}", get(download_pdf_handler));

    // Patron routes (any logged-in account)
    let patron_routes = Router::new()
        .route("/library", get(library_handler))
        .route("/view_user", get(view_user_handler))
        .route("/reviews", get(list_reviews_handler).post(submit_review_handler))
        .route("/queries", get(list_queries_handler).post(submit_query_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Admin routes
    let admin_routes = Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/api/dashboard-stats", get(dashboard_stats_handler))
        .route("/catalog/{kind}", get(list_references_handler))
        .route("/catalog/{kind}/save", post(save_reference_handler))
        .route("/catalog/{kind}/edit", get(edit_reference_handler))
        .route("/catalog/{kind}/delete", get(delete_reference_handler))
        .route("/books", get(list_books_handler))
        .route("/books/save", post(save_book_handler))
        .route("/books/edit", get(edit_book_handler))
        .route("/books/delete", get(delete_book_handler))
        .route("/issued_books", get(list_issued_books_handler))
        .route("/issued_books/save", post(save_issued_book_handler))
        .route("/issued_books/edit", get(edit_issued_book_handler))
        .route("/issued_books/delete", get(delete_issued_book_handler))
        .route("/users", get(list_users_handler))
        .route("/users/save", post(save_user_handler))
        .route("/users/edit", get(edit_user_handler))
        .route("/users/delete", get(delete_user_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(patron_routes)
        .merge(admin_routes)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
