// 🗄️ Question Repository - the only component that touches question rows
//
// Every listing is ascending by id. Insert and delete are each a single
// statement, so the store's own atomicity covers them.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::db::{CategoryId, Question, QuestionDraft, QuestionId};
use crate::error::{Result, TriviaError};

const SELECT_QUESTION: &str = "SELECT id, question, answer, category, difficulty FROM questions";

fn question_from_row(row: &Row) -> rusqlite::Result<Question> {
    Ok(Question {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        category: row.get(3)?,
        difficulty: row.get(4)?,
    })
}

#[derive(Clone, Copy)]
pub struct QuestionRepository<'a> {
    conn: &'a Connection,
}

impl<'a> QuestionRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn query(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Question>> {
        let mut stmt = self.conn.prepare(sql)?;
        let questions = stmt
            .query_map(args, question_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                warn!(error = %e, "failed to read questions");
                e
            })?;
        Ok(questions)
    }

    /// All questions, ascending by id. Empty store → empty vec.
    pub fn list_all(&self) -> Result<Vec<Question>> {
        self.query(&format!("{SELECT_QUESTION} ORDER BY id ASC"), [])
    }

    pub fn get_by_id(&self, id: QuestionId) -> Result<Question> {
        self.conn
            .query_row(&format!("{SELECT_QUESTION} WHERE id = ?1"), params![id], question_from_row)
            .optional()?
            .ok_or_else(|| TriviaError::not_found("question", id))
    }

    /// Validate and persist a draft, returning it with its assigned id.
    pub fn insert(&self, draft: &QuestionDraft) -> Result<Question> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)",
            params![draft.question, draft.answer, draft.category, draft.difficulty],
        )?;
        let id = self.conn.last_insert_rowid();

        info!(id, category = draft.category, "question inserted");
        Ok(Question {
            id,
            question: draft.question.clone(),
            answer: draft.answer.clone(),
            category: draft.category,
            difficulty: draft.difficulty,
        })
    }

    /// Insert many drafts; stops at the first failure.
    pub fn insert_all(&self, drafts: &[QuestionDraft]) -> Result<Vec<Question>> {
        drafts.iter().map(|draft| self.insert(draft)).collect()
    }

    /// Permanently remove a question. A missing id is `NotFound`, not a no-op.
    pub fn delete_by_id(&self, id: QuestionId) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        if removed == 0 {
            debug!(id, "delete of missing question");
            return Err(TriviaError::not_found("question", id));
        }

        info!(id, "question deleted");
        Ok(())
    }

    pub fn filter_by_category(&self, category: CategoryId) -> Result<Vec<Question>> {
        self.query(
            &format!("{SELECT_QUESTION} WHERE category = ?1 ORDER BY id ASC"),
            params![category],
        )
    }

    /// Questions whose text contains `term`, ignoring case.
    ///
    /// Filtering happens in Rust rather than with `LIKE`, since SQLite only
    /// folds ASCII case.
    pub fn search_by_text(&self, term: &str) -> Result<Vec<Question>> {
        let folded = term.to_lowercase();
        let mut questions = self.list_all()?;
        questions.retain(|q| q.matches_folded(&folded));
        Ok(questions)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
