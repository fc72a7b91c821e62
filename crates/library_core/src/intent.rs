//! crates/library_core/src/intent.rs
//!
//! Classifies a chat message into one of a closed set of intents.
//!
//! Rules are tried in the order of [`INTENT_RULES`]; the first rule whose matcher
//! returns `Some` decides the intent. Matching is plain substring matching on the
//! lowercased, trimmed message.

use regex::Regex;
use std::sync::LazyLock;

/// Canned replies for exact greeting/help phrases.
pub const GREETINGS: &[(&str, &str)] = &[
    ("hi", "Hello! I'm your online librarian. How can I help you today?"),
    ("hello", "Hi there! Need help finding books or information?"),
    ("bro", "Sure thing, bro! What book or help are you looking for?"),
    ("hey", "Hey! What can I assist you with today?"),
    ("nanba", "Nanba, tell me what you're searching for!"),
    ("nanbi", "Nanbi, how can I help you today?"),
    ("library", "I'm here to assist you with books and PDFs. Just ask!"),
    (
        "help",
        "I'm here to help! You can ask me to find books, authors, or anything related to the library.",
    ),
    ("நண்பா", "நண்பா நலமா! ஏதாவது தேடுறியா? சொல்லுங்க."),
];

const AVAILABLE_BOOKS_PHRASES: [&str; 3] = ["available books", "show books", "list books"];
const FIND_BOOK_PHRASES: [&str; 2] = ["find book", "search book"];
const ENCYCLOPEDIA_PREFIXES: [&str; 2] = ["tell me about ", "what is "];

static TOPIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(tell me about|what is)\s+").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Greeting { reply: &'static str },
    AvailableBooks,
    BooksByAuthor { author: String },
    FindBook { title: String },
    BooksInGenre { genre: String },
    Encyclopedia { topic: String },
    Feedback { message: String },
    Fallback { prompt: String },
}

impl Intent {
    /// The name of the rule that produces this intent.
    pub fn rule_name(&self) -> &'static str {
        match self {
            Intent::Greeting { .. } => "greeting",
            Intent::AvailableBooks => "available_books",
            Intent::BooksByAuthor { .. } => "books_by_author",
            Intent::FindBook { .. } => "find_book",
            Intent::BooksInGenre { .. } => "books_in_genre",
            Intent::Encyclopedia { .. } => "encyclopedia",
            Intent::Feedback { .. } => "feedback",
            Intent::Fallback { .. } => "fallback",
        }
    }
}

/// A named predicate over a normalized message.
pub struct IntentRule {
    pub name: &'static str,
    pub matcher: fn(&str) -> Option<Intent>,
}

/// Every rule, highest priority first. The last rule always matches.
pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule { name: "greeting", matcher: match_greeting },
    IntentRule { name: "available_books", matcher: match_available_books },
    IntentRule { name: "books_by_author", matcher: match_books_by_author },
    IntentRule { name: "find_book", matcher: match_find_book },
    IntentRule { name: "books_in_genre", matcher: match_books_in_genre },
    IntentRule { name: "encyclopedia", matcher: match_encyclopedia },
    IntentRule { name: "feedback", matcher: match_feedback },
    IntentRule { name: "fallback", matcher: match_fallback },
];

pub fn normalize(message: &str) -> String {
    message.to_lowercase().trim().to_string()
}

/// Classifies a raw chat message.
pub fn classify(message: &str) -> Intent {
    let normalized = normalize(message);
    INTENT_RULES
        .iter()
        .find_map(|rule| (rule.matcher)(&normalized))
        .unwrap_or(Intent::Fallback { prompt: normalized })
}

fn match_greeting(message: &str) -> Option<Intent> {
    GREETINGS
        .iter()
        .find(|(phrase, _)| *phrase == message)
        .map(|(_, reply)| Intent::Greeting { reply: *reply })
}

fn match_available_books(message: &str) -> Option<Intent> {
    AVAILABLE_BOOKS_PHRASES
        .iter()
        .any(|phrase| message.contains(phrase))
        .then_some(Intent::AvailableBooks)
}

fn match_books_by_author(message: &str) -> Option<Intent> {
    if !(message.contains("by") && message.contains("books")) {
        return None;
    }
    let (_, author) = message.rsplit_once("by")?;
    Some(Intent::BooksByAuthor {
        author: author.trim().to_string(),
    })
}

fn match_find_book(message: &str) -> Option<Intent> {
    if !FIND_BOOK_PHRASES.iter().any(|phrase| message.contains(phrase)) {
        return None;
    }
    let title = FIND_BOOK_PHRASES
        .iter()
        .fold(message.to_string(), |acc, phrase| acc.replace(phrase, ""));
    Some(Intent::FindBook {
        title: title.trim().to_string(),
    })
}

fn match_books_in_genre(message: &str) -> Option<Intent> {
    message.contains("books in").then(|| Intent::BooksInGenre {
        genre: message.replace("books in", "").trim().to_string(),
    })
}

fn match_encyclopedia(message: &str) -> Option<Intent> {
    ENCYCLOPEDIA_PREFIXES
        .iter()
        .any(|prefix| message.starts_with(prefix))
        .then(|| Intent::Encyclopedia {
            topic: clean_topic(message),
        })
}

fn match_feedback(message: &str) -> Option<Intent> {
    message.contains("feedback").then(|| Intent::Feedback {
        message: message.replace("feedback", "").trim().to_string(),
    })
}

fn match_fallback(message: &str) -> Option<Intent> {
    Some(Intent::Fallback {
        prompt: message.to_string(),
    })
}

/// Drops question marks and the leading "tell me about"/"what is".
pub fn clean_topic(message: &str) -> String {
    let without_marks = message.replace('?', "").trim().to_lowercase();
    TOPIC_PREFIX.replace(&without_marks, "").trim().to_string()
}
