// 🔍 Search - seam between callers and whatever answers text queries
//
// Today the only implementation is a linear substring scan over the
// repository; an inverted index can implement the same trait later.

use crate::db::Question;
use crate::error::Result;
use crate::repository::QuestionRepository;

pub trait SearchIndex {
    /// Questions whose text contains `term` (case-insensitive), ascending by id.
    /// The empty term matches everything.
    fn search(&self, term: &str) -> Result<Vec<Question>>;
}

/// Case-insensitive substring scan backed by the repository.
#[derive(Clone, Copy)]
pub struct SubstringSearch<'a> {
    repo: QuestionRepository<'a>,
}

impl<'a> SubstringSearch<'a> {
    pub fn new(repo: QuestionRepository<'a>) -> Self {
        Self { repo }
    }
}

impl SearchIndex for SubstringSearch<'_> {
    fn search(&self, term: &str) -> Result<Vec<Question>> {
        self.repo.search_by_text(term)
    }
}
