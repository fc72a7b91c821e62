pub mod domain;
pub mod intent;
pub mod ports;
pub mod render;
pub mod router;

pub use domain::{
    AuthSession, Book, BookDraft, BookQuery, BookSummary, DashboardStats, Feedback, IssuedBook,
    LoanDraft, LoanStatus, NewUser, Rating, ReferenceEntry, ReferenceKind, Review, ReviewWrite,
    Role, User, UserCredentials, UserUpdate, Volume,
};
pub use intent::{classify, Intent, INTENT_RULES};
pub use ports::{
    BookSearchService, CatalogLookup, DatabaseService, EncyclopediaService, GenerationParams,
    PageSummary, PortError, PortResult, TextGenerationService,
};
pub use render::RenderOptions;
pub use router::ChatRouter;
