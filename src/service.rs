// 🧩 Trivia Service - one operation per thing a client can ask for
//
// Collaborators (catalog, repository, search index, quiz selector) are built
// once from the same connection and passed in; no operation calls another
// operation just to get category labels.

use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

use crate::catalog::CategoryCatalog;
use crate::db::{Category, CategoryId, Question, QuestionDraft, QuestionId};
use crate::error::{Result, TriviaError};
use crate::pager::{page_count, paginate, Page, QUESTIONS_PER_PAGE};
use crate::quiz::{QuizOutcome, QuizSelector, SelectionStrategy};
use crate::repository::QuestionRepository;
use crate::search::{SearchIndex, SubstringSearch};

/// A page of questions with the category labels needed to render them.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionListing {
    pub questions: Vec<Question>,
    pub page: usize,
    pub total_pages: usize,
    pub total_questions: usize,
    pub categories: BTreeMap<CategoryId, String>,
    pub current_category: Option<Category>,
}

impl QuestionListing {
    fn from_page(page: Page<Question>, categories: BTreeMap<CategoryId, String>) -> Self {
        Self {
            page: page.page,
            total_pages: page.total_pages,
            total_questions: page.total_items,
            questions: page.items,
            categories,
            current_category: None,
        }
    }

    /// False when the store holds no questions at all.
    pub fn has_results(&self) -> bool {
        self.total_questions > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedQuestion {
    pub created: Question,
    /// Page of all questions (ascending by id) after the insert
    pub questions: Vec<Question>,
    pub total_questions: usize,
    pub current_category: CategoryId,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub questions: Vec<Question>,
    pub total_questions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryQuestions {
    pub questions: Vec<Question>,
    pub total_questions: usize,
    /// `None` when the id has no row in the catalog
    pub current_category: Option<Category>,
}

pub struct TriviaService<'a, S: SearchIndex = SubstringSearch<'a>> {
    catalog: CategoryCatalog<'a>,
    repo: QuestionRepository<'a>,
    index: S,
    selector: QuizSelector<'a>,
}

impl<'a> TriviaService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        let repo = QuestionRepository::new(conn);
        Self::with_parts(
            CategoryCatalog::new(conn),
            repo,
            SubstringSearch::new(repo),
            QuizSelector::new(repo),
        )
    }
}

impl<'a, S: SearchIndex> TriviaService<'a, S> {
    pub fn with_parts(
        catalog: CategoryCatalog<'a>,
        repo: QuestionRepository<'a>,
        index: S,
        selector: QuizSelector<'a>,
    ) -> Self {
        Self {
            catalog,
            repo,
            index,
            selector,
        }
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selector = self.selector.with_strategy(strategy);
        self
    }

    pub fn categories(&self) -> Result<BTreeMap<CategoryId, String>> {
        self.catalog.list_categories()
    }

    /// Page `page` of every question. An empty store is a listing with no
    /// results; a page past the end is `PageOutOfRange`.
    pub fn list_questions(&self, page: usize) -> Result<QuestionListing> {
        let questions = self.repo.list_all()?;
        let page = paginate(&questions, page)?;
        let categories = self.catalog.list_categories()?;
        Ok(QuestionListing::from_page(page, categories))
    }

    pub fn get_question(&self, id: QuestionId) -> Result<Question> {
        self.repo.get_by_id(id)
    }

    /// Insert a draft and return it alongside page `page` of the updated list.
    ///
    /// The page is checked against the post-insert size before anything is
    /// written, so a bad page never leaves a committed row behind an error.
    pub fn create_question(&self, draft: &QuestionDraft, page: usize) -> Result<CreatedQuestion> {
        draft.validate()?;
        if page == 0 {
            return Err(TriviaError::invalid("page", "pages start at 1"));
        }
        let total_pages = page_count(self.repo.count()? + 1, QUESTIONS_PER_PAGE);
        if page > total_pages {
            return Err(TriviaError::PageOutOfRange { page, total_pages });
        }

        let created = self.repo.insert(draft)?;

        // the row is committed from here on; a listing problem only empties the page
        let questions = self.repo.list_all().unwrap_or_else(|e| {
            warn!(error = %e, id = created.id, "listing after insert failed");
            Vec::new()
        });
        let items = paginate(&questions, page).map(|p| p.items).unwrap_or_default();

        Ok(CreatedQuestion {
            current_category: created.category,
            total_questions: questions.len(),
            created,
            questions: items,
        })
    }

    /// Returns the deleted id.
    pub fn delete_question(&self, id: QuestionId) -> Result<QuestionId> {
        self.repo.delete_by_id(id)?;
        Ok(id)
    }

    pub fn search(&self, term: &str) -> Result<SearchResults> {
        let questions = self.index.search(term)?;
        info!(term, hits = questions.len(), "search");
        Ok(SearchResults {
            total_questions: questions.len(),
            questions,
        })
    }

    pub fn questions_by_category(&self, category: CategoryId) -> Result<CategoryQuestions> {
        let questions = self.repo.filter_by_category(category)?;
        let current_category = self.catalog.get(category)?;
        Ok(CategoryQuestions {
            total_questions: questions.len(),
            questions,
            current_category,
        })
    }

    pub fn play_quiz(&self, category: CategoryId, previous: &HashSet<QuestionId>) -> Result<QuizOutcome> {
        self.selector.next_question(category, previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{seed_default_categories, setup_database};

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        seed_default_categories(&conn).unwrap();
        conn
    }

    fn seed_questions(conn: &Connection, n: usize) {
        let drafts: Vec<_> = (1..=n)
            .map(|i| QuestionDraft::new(&format!("Question number {}?", i), "Answer", 1 + (i as i64 % 6), 2))
            .collect();
        QuestionRepository::new(conn).insert_all(&drafts).unwrap();
    }

    #[test]
    fn test_list_questions_pages() {
        let conn = test_db();
        seed_questions(&conn, 23);
        let service = TriviaService::new(&conn);

        let listing = service.list_questions(3).unwrap();
        assert_eq!(listing.questions.len(), 3);
        assert_eq!(listing.questions[0].id, 21);
        assert_eq!(listing.total_questions, 23);
        assert_eq!(listing.categories.len(), 6);
        assert!(listing.current_category.is_none());

        assert!(matches!(
            service.list_questions(5),
            Err(TriviaError::PageOutOfRange { page: 5, .. })
        ));
    }

    #[test]
    fn test_list_questions_on_empty_store() {
        let conn = test_db();
        let listing = TriviaService::new(&conn).list_questions(1).unwrap();
        assert!(!listing.has_results());
        assert!(listing.questions.is_empty());
    }

    #[test]
    fn test_create_question_returns_listing() {
        let conn = test_db();
        seed_questions(&conn, 4);
        let service = TriviaService::new(&conn);

        let draft = QuestionDraft::new("What is the capital of Saudi Arabia?", "Riyadh", 3, 1);
        let created = service.create_question(&draft, 1).unwrap();
        assert_eq!(created.created.draft(), draft);
        assert_eq!(created.total_questions, 5);
        assert_eq!(created.current_category, 3);
        assert_eq!(created.questions.last().map(|q| q.id), Some(created.created.id));
        assert_eq!(service.get_question(created.created.id).unwrap(), created.created);
    }

    #[test]
    fn test_create_question_bad_page_writes_nothing() {
        let conn = test_db();
        let service = TriviaService::new(&conn);
        let draft = QuestionDraft::new("What is the capital of Saudi Arabia?", "Riyadh", 3, 1);

        assert!(matches!(
            service.create_question(&draft, 5),
            Err(TriviaError::PageOutOfRange { page: 5, total_pages: 1 })
        ));
        assert!(matches!(
            service.create_question(&draft, 0),
            Err(TriviaError::InvalidInput { field: "page", .. })
        ));
        assert_eq!(QuestionRepository::new(&conn).count().unwrap(), 0);

        // the page the new row lands on is valid
        seed_questions(&conn, 10);
        let created = service.create_question(&draft, 2).unwrap();
        assert_eq!(created.questions, vec![created.created.clone()]);
        assert_eq!(created.total_questions, 11);
    }

    #[test]
    fn test_delete_question() {
        let conn = test_db();
        seed_questions(&conn, 4);
        let service = TriviaService::new(&conn);

        assert_eq!(service.delete_question(4).unwrap(), 4);
        assert!(matches!(service.get_question(4), Err(TriviaError::NotFound { .. })));
        assert!(matches!(service.delete_question(100), Err(TriviaError::NotFound { .. })));
        assert_eq!(service.list_questions(1).unwrap().total_questions, 3);
    }

    #[test]
    fn test_search() {
        let conn = test_db();
        seed_questions(&conn, 12);
        let service = TriviaService::new(&conn);

        assert_eq!(service.search("").unwrap().total_questions, 12);
        // "number 1" matches 1, 10, 11, 12
        assert_eq!(service.search("NUMBER 1").unwrap().total_questions, 4);
        assert_eq!(service.search("nothing like this").unwrap().total_questions, 0);
    }

    #[test]
    fn test_questions_by_category_resolves_label() {
        let conn = test_db();
        seed_questions(&conn, 12);
        QuestionRepository::new(&conn)
            .insert(&QuestionDraft::new("Orphan?", "Yes", 42, 1))
            .unwrap();
        let service = TriviaService::new(&conn);

        let science = service.questions_by_category(1).unwrap();
        assert_eq!(science.total_questions, 2);
        assert_eq!(science.current_category.map(|c| c.label), Some("Science".to_string()));

        let dangling = service.questions_by_category(42).unwrap();
        assert_eq!(dangling.total_questions, 1);
        assert!(dangling.current_category.is_none());

        assert_eq!(service.questions_by_category(100).unwrap().total_questions, 0);
    }

    #[test]
    fn test_play_quiz() {
        let conn = test_db();
        seed_questions(&conn, 3);
        let service = TriviaService::new(&conn).with_strategy(SelectionStrategy::Random);

        let previous: HashSet<_> = [1, 3].into_iter().collect();
        let outcome = service.play_quiz(0, &previous).unwrap();
        assert_eq!(outcome.question().map(|q| q.id), Some(2));

        let all: HashSet<_> = [1, 2, 3].into_iter().collect();
        assert!(service.play_quiz(0, &all).unwrap().is_exhausted());
    }
}
