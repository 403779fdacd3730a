// Trivia - Question Store & Quiz Selection Engine
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod db;
pub mod catalog;     // category id → label
pub mod repository;  // question CRUD, the only writer
pub mod pager;
pub mod search;      // search seam (substring scan today)
pub mod quiz;        // next-unseen-question selection
pub mod service;     // one operation per client request
pub mod config;

// Re-export commonly used types
pub use error::{Result, TriviaError};
pub use db::{
    Category, CategoryId, Question, QuestionDraft, QuestionId,
    DEFAULT_CATEGORIES,
    setup_database, seed_default_categories, upsert_category, load_questions_csv,
};
pub use catalog::CategoryCatalog;
pub use repository::QuestionRepository;
pub use pager::{paginate, Page, QUESTIONS_PER_PAGE};
pub use search::{SearchIndex, SubstringSearch};
pub use quiz::{QuizOutcome, QuizScope, QuizSelector, SelectionStrategy, ANY_CATEGORY};
pub use service::{CategoryQuestions, CreatedQuestion, QuestionListing, SearchResults, TriviaService};
pub use config::{init_logging, Config};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
