pub mod db;
pub mod google_books;
pub mod text_gen_llm;
pub mod uploads;
pub mod wikipedia;

pub use db::DbAdapter;
pub use google_books::GoogleBooksAdapter;
pub use text_gen_llm::OpenAiTextGenAdapter;
pub use uploads::UploadStore;
pub use wikipedia::WikipediaAdapter;
