// ⚠️ Trivia Errors - typed outcomes returned to every caller
//
// Nothing here is swallowed: the transport decides how each variant is shown.
// Quiz exhaustion and "no questions yet" are NOT errors (see quiz.rs, pager.rs).

use thiserror::Error;

/// Errors produced by the question store and the components built on it.
#[derive(Debug, Error)]
pub enum TriviaError {
    /// Requested entity is absent (question id, category id)
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Page number points past the last page of a non-empty listing
    #[error("page {page} is out of range ({total_pages} pages available)")]
    PageOutOfRange { page: usize, total_pages: usize },

    /// Malformed draft field or argument
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Backing store failed or could not be reached
    #[error("question store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    /// CSV seeding failed
    #[error("import failed: {0}")]
    Import(#[from] csv::Error),
}

impl TriviaError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        TriviaError::NotFound { entity, id }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TriviaError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// HTTP status the transport layer renders this outcome as.
    pub fn status_code(&self) -> u16 {
        match self {
            TriviaError::NotFound { .. } | TriviaError::PageOutOfRange { .. } => 404,
            TriviaError::InvalidInput { .. } => 400,
            TriviaError::StoreUnavailable(_) | TriviaError::Import(_) => 500,
        }
    }

    /// True when the failure is on our side rather than the caller's.
    pub fn is_server_side(&self) -> bool {
        self.status_code() >= 500
    }
}

pub type Result<T> = std::result::Result<T, TriviaError>;
