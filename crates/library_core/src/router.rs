//! crates/library_core/src/router.rs
//!
//! The chat assistant. A message is classified by [`crate::intent::classify`] and
//! dispatched to exactly one handler. Local answers are preferred over network
//! calls, and free-form generation is the last resort.
//!
//! Nothing here returns an error: every failure degrades to an apology string.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::BookSummary;
use crate::intent::{classify, Intent};
use crate::ports::{
    BookSearchService, CatalogLookup, EncyclopediaService, GenerationParams, PageSummary,
    PortError, TextGenerationService,
};
use crate::render::{self, RenderOptions};

const NO_AVAILABLE_BOOKS: &str =
    "No books are currently available. Would you like me to suggest some books?";
const AVAILABLE_BOOKS_FAILED: &str = "Sorry, I couldn't fetch the available books right now.";
const AUTHOR_SEARCH_FAILED: &str = "Sorry, I couldn't search for books by this author.";
const GENRE_SEARCH_FAILED: &str = "Sorry, I couldn't search for books in this genre.";
const ONLINE_SEARCH_FAILED: &str = "Sorry, I couldn't reach the online book catalogue right now.";
const FEEDBACK_SAVED: &str = "Thank you for your feedback! It helps us improve our service.";
const FEEDBACK_FAILED: &str = "Sorry, I couldn't save your feedback. Please try again later.";
const FEEDBACK_EMPTY: &str =
    "I'd love to hear your feedback! Write it right after the word 'feedback'.";
const ENCYCLOPEDIA_NO_RESULTS: &str =
    "I couldn't find information about that topic. Could you try rephrasing or being more specific?";
const ENCYCLOPEDIA_FAILED: &str = "I encountered an issue while searching for information. Could you try rephrasing your question or being more specific?";
const GENERATION_FAILED: &str =
    "I'm not sure how to help with that. Could you try rephrasing your question?";

const ENCYCLOPEDIA_RESULTS: usize = 5;
const SUMMARY_SENTENCES: usize = 3;
const DISAMBIGUATION_OPTIONS: usize = 5;
const META_PAGE_MARKERS: [&str; 6] = [
    "(disambiguation)",
    "list of",
    "index of",
    "category:",
    "template:",
    "file:",
];

/// The chat assistant, built once at startup with the services it consults.
pub struct ChatRouter {
    catalog: Arc<dyn CatalogLookup>,
    book_search: Arc<dyn BookSearchService>,
    encyclopedia: Arc<dyn EncyclopediaService>,
    generator: Arc<dyn TextGenerationService>,
    render: RenderOptions,
    generation: GenerationParams,
}

impl ChatRouter {
    pub fn new(
        catalog: Arc<dyn CatalogLookup>,
        book_search: Arc<dyn BookSearchService>,
        encyclopedia: Arc<dyn EncyclopediaService>,
        generator: Arc<dyn TextGenerationService>,
        render: RenderOptions,
    ) -> Self {
        Self {
            catalog,
            book_search,
            encyclopedia,
            generator,
            render,
            generation: GenerationParams::default(),
        }
    }

    pub fn with_generation_params(mut self, params: GenerationParams) -> Self {
        self.generation = params;
        self
    }

    /// Produces the assistant's reply to a raw chat message.
    pub async fn generate_response(&self, message: &str) -> String {
        let intent = classify(message);
        info!(rule = intent.rule_name(), "Chat message classified");

        match intent {
            Intent::Greeting { reply } => reply.to_string(),
            Intent::AvailableBooks => self.available_books().await,
            Intent::BooksByAuthor { author } => self.books_by_author(&author).await,
            Intent::FindBook { title } => self.find_book(&title).await,
            Intent::BooksInGenre { genre } => self.books_in_genre(&genre).await,
            Intent::Encyclopedia { topic } => self.encyclopedia_summary(&topic).await,
            Intent::Feedback { message } => self.store_feedback(&message).await,
            Intent::Fallback { prompt } => self.fallback(&prompt).await,
        }
    }

    async fn available_books(&self) -> String {
        match self.catalog.available_books().await {
            Ok(books) if books.is_empty() => NO_AVAILABLE_BOOKS.to_string(),
            Ok(books) => render::available_books(&books, &self.render),
            Err(e) => {
                warn!("Available books lookup failed: {}", e);
                AVAILABLE_BOOKS_FAILED.to_string()
            }
        }
    }

    async fn books_by_author(&self, author: &str) -> String {
        match self.catalog.books_by_author(author).await {
            Ok(books) if books.is_empty() => format!(
                "No books found by author '{}'. Would you like to try another author?",
                author
            ),
            Ok(books) => {
                let heading = format!("Books by {}:", first_name_of(&books, |b| &b.author_name));
                render::titled_books("author-books", &heading, &books, &self.render)
            }
            Err(e) => {
                warn!("Author lookup for '{}' failed: {}", author, e);
                AUTHOR_SEARCH_FAILED.to_string()
            }
        }
    }

    async fn find_book(&self, title: &str) -> String {
        match self.catalog.books_matching_name(title).await {
            Ok(books) if !books.is_empty() => return render::book_details(&books, &self.render),
            Ok(_) => {}
            Err(e) => warn!("Book lookup for '{}' failed, trying online: {}", title, e),
        }

        match self.book_search.search_volumes(title).await {
            Ok(volumes) if volumes.is_empty() => format!(
                "Sorry, I couldn't find a book named '{}'. Would you like to try another search?",
                title
            ),
            Ok(volumes) => render::online_volumes("Related books found online:", &volumes),
            Err(e) => {
                warn!("Online book search for '{}' failed: {}", title, e);
                ONLINE_SEARCH_FAILED.to_string()
            }
        }
    }

    async fn books_in_genre(&self, genre: &str) -> String {
        match self.catalog.books_in_category(genre).await {
            Ok(books) if !books.is_empty() => {
                let heading = format!("Books in {}:", first_name_of(&books, |b| &b.category_name));
                return render::titled_books("genre-books", &heading, &books, &self.render);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Genre lookup for '{}' failed: {}", genre, e);
                return GENRE_SEARCH_FAILED.to_string();
            }
        }

        match self.book_search.search_volumes(genre).await {
            Ok(volumes) if volumes.is_empty() => format!(
                "No books found in the '{}' genre. Would you like to try another genre?",
                genre
            ),
            Ok(volumes) => {
                let heading = format!("Books in {} found online:", genre);
                render::online_volumes(&heading, &volumes)
            }
            Err(e) => {
                warn!("Online genre search for '{}' failed: {}", genre, e);
                ONLINE_SEARCH_FAILED.to_string()
            }
        }
    }

    async fn encyclopedia_summary(&self, topic: &str) -> String {
        let results = match self.encyclopedia.search(topic, ENCYCLOPEDIA_RESULTS).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Encyclopedia search for '{}' failed: {}", topic, e);
                return ENCYCLOPEDIA_FAILED.to_string();
            }
        };
        let Some(first) = results.first() else {
            return ENCYCLOPEDIA_NO_RESULTS.to_string();
        };

        match self.encyclopedia.page_summary(first).await {
            Ok(PageSummary::Article { extract, .. }) => {
                let mut response = format!(
                    "Here's what I found about {}:\n\n{}\n\n",
                    first,
                    first_sentences(&extract, SUMMARY_SENTENCES)
                );
                if results.len() > 1 {
                    response.push_str(
                        "There are also other related topics. Would you like to know about any of these instead?\n",
                    );
                    for (i, other) in results.iter().enumerate().skip(1) {
                        if other != first {
                            response.push_str(&format!("{}. {}\n", i, other));
                        }
                    }
                }
                response
            }
            Ok(PageSummary::Disambiguation { options, .. }) => {
                let options: Vec<&String> = options
                    .iter()
                    .take(DISAMBIGUATION_OPTIONS)
                    .filter(|option| !is_meta_page(option))
                    .collect();
                if options.is_empty() {
                    return format!(
                        "'{}' can mean several things. Could you tell me more precisely what you're interested in?",
                        topic
                    );
                }
                let mut response = format!(
                    "There are several topics related to '{}'. Which one interests you?\n\n",
                    topic
                );
                for (i, option) in options.iter().enumerate() {
                    response.push_str(&format!("{}. {}\n", i + 1, option));
                }
                response
            }
            Err(PortError::NotFound(_)) => format!(
                "I couldn't find specific information about '{}'. Could you try being more specific or using different terms?",
                topic
            ),
            Err(e) => {
                warn!("Encyclopedia summary for '{}' failed: {}", first, e);
                ENCYCLOPEDIA_FAILED.to_string()
            }
        }
    }

    async fn store_feedback(&self, message: &str) -> String {
        if message.is_empty() {
            return FEEDBACK_EMPTY.to_string();
        }
        match self.catalog.save_feedback(message).await {
            Ok(_) => FEEDBACK_SAVED.to_string(),
            Err(e) => {
                warn!("Saving feedback failed: {}", e);
                FEEDBACK_FAILED.to_string()
            }
        }
    }

    async fn fallback(&self, prompt: &str) -> String {
        match self.generator.generate(prompt, &self.generation).await {
            Ok(text) => {
                let cleaned = dedupe_sentences(&text);
                if cleaned.is_empty() {
                    GENERATION_FAILED.to_string()
                } else {
                    cleaned
                }
            }
            Err(e) => {
                warn!("Text generation failed: {}", e);
                GENERATION_FAILED.to_string()
            }
        }
    }
}

fn first_name_of<'a>(
    books: &'a [BookSummary],
    field: impl Fn(&'a BookSummary) -> &'a Option<String>,
) -> &'a str {
    books
        .first()
        .and_then(|b| field(b).as_deref())
        .unwrap_or_default()
}

fn is_meta_page(title: &str) -> bool {
    let lower = title.to_lowercase();
    META_PAGE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Keeps the first `n` sentences of an extract.
pub fn first_sentences(text: &str, n: usize) -> String {
    let mut end = text.len();
    let mut seen = 0;
    for (idx, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let next = text[idx + c.len_utf8()..].chars().next();
            if next.map_or(true, char::is_whitespace) {
                seen += 1;
                if seen == n {
                    end = idx + c.len_utf8();
                    break;
                }
            }
        }
    }
    text[..end].trim().to_string()
}

/// Splits on `.`, drops blank and repeated sentences, and re-joins them.
pub fn dedupe_sentences(text: &str) -> String {
    let mut unique: Vec<&str> = Vec::new();
    for sentence in text.split('.').map(str::trim) {
        if !sentence.is_empty() && !unique.contains(&sentence) {
            unique.push(sentence);
        }
    }
    let mut joined = unique.join(". ");
    if !joined.is_empty() && !joined.ends_with('.') {
        joined.push('.');
    }
    joined
}
