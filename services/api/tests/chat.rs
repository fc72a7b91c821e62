mod common;

use std::sync::atomic::Ordering;

use api_lib::web::chat::{chat_handler, search_handler, ChatRequest, SearchRequest};
use axum::{extract::State, http::StatusCode, Json};
use common::{
    app_state, app_state_with, body_json, respond, test_config, InMemoryDb, StubBookSearch,
};
use library_core::domain::{BookDraft, ReferenceKind, Volume};

fn chat(message: Option<&str>) -> Json<ChatRequest> {
    Json(ChatRequest {
        message: message.map(str::to_string),
    })
}

fn search(query: Option<&str>) -> Json<SearchRequest> {
    Json(SearchRequest {
        query: query.map(str::to_string),
    })
}

#[tokio::test]
async fn chat_without_a_message_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(InMemoryDb::new(), dir.path());

    for message in [None, Some(""), Some("   ")] {
        let response = respond(chat_handler(State(state.clone()), chat(message)).await);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "No message provided!" })
        );
    }
}

#[tokio::test]
async fn greetings_are_answered_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(InMemoryDb::new(), dir.path());

    let response = respond(chat_handler(State(state), chat(Some("  HeLLo "))).await);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["response"],
        "Hi there! Need help finding books or information?"
    );
}

#[tokio::test]
async fn show_books_lists_available_books_with_pdf_links() {
    let db = InMemoryDb::new();
    let author = db.seed_reference(ReferenceKind::Author, "Frank Herbert");
    db.seed_book(BookDraft {
        name: "Dune".into(),
        author_id: Some(author),
        no_of_copy: 2,
        pdf_path: Some("ab12cd34_dune.pdf".into()),
        status: "Enable".into(),
        ..BookDraft::default()
    });
    db.seed_book(BookDraft {
        name: "Out Of Stock".into(),
        no_of_copy: 0,
        status: "Enable".into(),
        ..BookDraft::default()
    });
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(db, dir.path());

    let response = respond(chat_handler(State(state), chat(Some("show books"))).await);
    let reply = body_json(response).await["response"]
        .as_str()
        .unwrap()
        .to_string();

    assert!(reply.contains("Dune"));
    assert!(reply.contains("http://library.test/static/books/ab12cd34_dune.pdf"));
    assert!(!reply.contains("Out Of Stock"));
}

#[tokio::test]
async fn pdf_links_percent_encode_the_stored_file_name() {
    let db = InMemoryDb::new();
    db.seed_book(BookDraft {
        name: "Notes".into(),
        no_of_copy: 1,
        pdf_path: Some("ab12 my#notes?.pdf".into()),
        status: "Enable".into(),
        ..BookDraft::default()
    });
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(db, dir.path());

    let response = respond(chat_handler(State(state), chat(Some("show books"))).await);
    let reply = body_json(response).await["response"]
        .as_str()
        .unwrap()
        .to_string();

    assert!(reply.contains(r#"href="http://library.test/static/books/ab12%20my%23notes%3F.pdf""#));
}

#[test]
fn pdf_base_url_keeps_a_path_prefix_and_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.public_base_url = "https://example.org/library".to_string();
    assert_eq!(
        config.pdf_base_url().unwrap().as_str(),
        "https://example.org/library/static/books"
    );

    config.public_base_url = "not a url".to_string();
    assert!(config.render_options().is_err());
}

#[tokio::test]
async fn unknown_book_falls_back_to_online_volumes() {
    let dir = tempfile::tempdir().unwrap();
    let search = StubBookSearch {
        volumes: vec![Volume {
            title: Some("The Hobbit".into()),
            authors: vec![],
            info_link: Some("https://books.example/hobbit".into()),
        }],
    };
    let state = app_state_with(InMemoryDb::new(), dir.path(), search, "unused");

    let response = respond(chat_handler(State(state), chat(Some("find book hobbit"))).await);
    let reply = body_json(response).await["response"]
        .as_str()
        .unwrap()
        .to_string();

    assert!(reply.contains("Related books found online:"));
    assert!(reply.contains("The Hobbit"));
    assert!(reply.contains("Unknown author"));
}

#[tokio::test]
async fn feedback_is_stored() {
    let db = InMemoryDb::new();
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(db.clone(), dir.path());

    let response = respond(
        chat_handler(State(state), chat(Some("feedback the reading room is great"))).await,
    );
    assert_eq!(
        body_json(response).await["response"],
        "Thank you for your feedback! It helps us improve our service."
    );
    assert_eq!(db.feedback_messages(), vec!["the reading room is great".to_string()]);
}

#[tokio::test]
async fn empty_generator_output_asks_to_rephrase() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state_with(InMemoryDb::new(), dir.path(), StubBookSearch::default(), "");

    let response = respond(chat_handler(State(state), chat(Some("sing me a song"))).await);
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["response"],
        "I'm not sure how to help with that. Could you try rephrasing your question?"
    );
}

#[tokio::test]
async fn search_requires_a_query() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(InMemoryDb::new(), dir.path());

    let response = respond(search_handler(State(state), search(None)).await);
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_without_hits_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(InMemoryDb::new(), dir.path());

    let response = respond(search_handler(State(state), search(Some("zzz"))).await);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({ "message": "No books found matching the query" })
    );
}

#[tokio::test]
async fn search_returns_matching_books_with_author_and_publisher() {
    let db = InMemoryDb::new();
    let author = db.seed_reference(ReferenceKind::Author, "Ursula K. Le Guin");
    let publisher = db.seed_reference(ReferenceKind::Publisher, "Ace");
    db.seed_book(BookDraft {
        name: "The Left Hand of Darkness".into(),
        author_id: Some(author),
        publisher_id: Some(publisher),
        isbn: Some("9780441478125".into()),
        no_of_copy: 1,
        status: "Enable".into(),
        ..BookDraft::default()
    });
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(db, dir.path());

    let response = respond(search_handler(State(state), search(Some("left hand"))).await);
    assert_eq!(response.status(), StatusCode::OK);
    let hits = body_json(response).await;
    assert_eq!(hits.as_array().map(Vec::len), Some(1));
    assert_eq!(hits[0]["author"], "Ursula K. Le Guin");
    assert_eq!(hits[0]["publisher"], "Ace");
    assert_eq!(hits[0]["isbn"], "9780441478125");
}

#[tokio::test]
async fn search_store_failure_is_a_server_error() {
    let db = InMemoryDb::new();
    db.fail_lookups.store(true, Ordering::SeqCst);
    let dir = tempfile::tempdir().unwrap();
    let state = app_state(db, dir.path());

    let response = respond(search_handler(State(state), search(Some("dune"))).await);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
