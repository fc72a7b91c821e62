//! crates/library_core/src/render.rs
//!
//! HTML fragments the chat widget embeds directly into the conversation.

use std::fmt;
use std::sync::Arc;

use maud::{html, Markup};

use crate::domain::{BookSummary, Volume};

type PdfHref = dyn Fn(&str) -> String + Send + Sync;

/// Where PDF links in rendered cards point to.
#[derive(Clone)]
pub struct RenderOptions {
    pdf_href: Arc<PdfHref>,
}

impl RenderOptions {
    /// `pdf_href` turns a stored PDF file name into the URL its card links to.
    /// It is responsible for any percent-encoding of the name.
    pub fn new(pdf_href: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            pdf_href: Arc::new(pdf_href),
        }
    }

    fn pdf_link(&self, book: &BookSummary) -> Markup {
        match book.pdf_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => html! {
                a.btn.btn-primary href=((self.pdf_href)(path)) target="_blank" { "View PDF" }
            },
            _ => html! { p { "PDF not available" } },
        }
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions").finish_non_exhaustive()
    }
}

pub fn available_books(books: &[BookSummary], options: &RenderOptions) -> String {
    html! {
        div.available-books {
            h2 { "Available Books:" }
            @for book in books {
                div.book-item {
                    h3 { (book.name) }
                    p { "Copies Available: " (book.no_of_copy) }
                    (options.pdf_link(book))
                }
            }
        }
    }
    .into_string()
}

/// Titled list of name + PDF cards, used for author and genre results.
pub fn titled_books(
    class: &str,
    heading: &str,
    books: &[BookSummary],
    options: &RenderOptions,
) -> String {
    html! {
        div class=(class) {
            h2 { (heading) }
            @for book in books {
                div.book-item {
                    h3 { (book.name) }
                    (options.pdf_link(book))
                }
            }
        }
    }
    .into_string()
}

pub fn book_details(books: &[BookSummary], options: &RenderOptions) -> String {
    let unknown = "Unknown";
    html! {
        div.book-details {
            @for book in books {
                div.book-item {
                    h3 { (book.name) }
                    p { "Author: " (book.author_name.as_deref().unwrap_or(unknown)) }
                    p { "Publisher: " (book.publisher_name.as_deref().unwrap_or(unknown)) }
                    p { "Copies Available: " (book.no_of_copy) }
                    p { "Status: " (book.status) }
                    (options.pdf_link(book))
                }
            }
        }
    }
    .into_string()
}

pub fn online_volumes(heading: &str, volumes: &[Volume]) -> String {
    html! {
        div.api-results {
            h2 { (heading) }
            @for volume in volumes {
                div.book-item {
                    h3 { (volume.title.as_deref().unwrap_or("No title available")) }
                    p {
                        "By: "
                        @if volume.authors.is_empty() {
                            "Unknown author"
                        } @else {
                            (volume.authors.join(", "))
                        }
                    }
                    a.book-link href=(volume.info_link.as_deref().unwrap_or("#")) target="_blank" {
                        "View Details"
                    }
                }
            }
        }
    }
    .into_string()
}
