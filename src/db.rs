use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, TriviaError};

/// Category id as stored in `questions.category`.
pub type CategoryId = i64;

/// Question id, assigned by the store on insert.
pub type QuestionId = i64;

/// Categories every fresh database starts with (id, label)
pub const DEFAULT_CATEGORIES: [(CategoryId, &str); 6] = [
    (1, "Science"),
    (2, "Art"),
    (3, "Geography"),
    (4, "History"),
    (5, "Entertainment"),
    (6, "Sports"),
];

// ============================================================================
// RECORDS
// ============================================================================

/// A persisted trivia question.
///
/// `category` is a plain foreign key; it is never checked against the
/// categories table, so a dangling reference is a valid state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    pub answer: String,
    pub category: CategoryId,
    pub difficulty: i64,
}

impl Question {
    /// Split a stored question back into the draft it was created from.
    pub fn draft(&self) -> QuestionDraft {
        QuestionDraft {
            question: self.question.clone(),
            answer: self.answer.clone(),
            category: self.category,
            difficulty: self.difficulty,
        }
    }

    /// Substring match of an already lowercased term against the question
    /// text, ignoring case. An empty term matches every question.
    pub fn matches_folded(&self, folded_term: &str) -> bool {
        folded_term.is_empty() || self.question.to_lowercase().contains(folded_term)
    }
}

/// Caller-supplied fields for a new question, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub question: String,
    pub answer: String,
    pub category: CategoryId,
    pub difficulty: i64,
}

impl QuestionDraft {
    pub fn new(question: &str, answer: &str, category: CategoryId, difficulty: i64) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            category,
            difficulty,
        }
    }

    /// Field-level rules applied before anything is persisted.
    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(TriviaError::invalid("question", "must not be empty"));
        }
        if self.answer.trim().is_empty() {
            return Err(TriviaError::invalid("answer", "must not be empty"));
        }
        if self.category < 1 {
            return Err(TriviaError::invalid(
                "category",
                format!("must be a positive id, got {}", self.category),
            ));
        }
        if self.difficulty < 0 {
            return Err(TriviaError::invalid(
                "difficulty",
                format!("must be >= 0, got {}", self.difficulty),
            ));
        }
        Ok(())
    }

    /// Build a draft from an untyped JSON body.
    ///
    /// Integers sent as numeric strings (`"3"`) are accepted, anything else
    /// that is not an integer is rejected with the offending field named.
    /// The result is validated before it is returned.
    pub fn from_json(body: &Value) -> Result<Self> {
        let draft = Self {
            question: text_field(body, "question")?,
            answer: text_field(body, "answer")?,
            category: integer_field(body, "category")?,
            difficulty: integer_field(body, "difficulty")?,
        };
        draft.validate()?;
        Ok(draft)
    }
}

fn text_field(body: &Value, field: &'static str) -> Result<String> {
    match body.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(TriviaError::invalid(field, "is required")),
        Some(other) => Err(TriviaError::invalid(field, format!("expected text, got {}", other))),
    }
}

fn integer_field(body: &Value, field: &'static str) -> Result<i64> {
    match body.get(field) {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| TriviaError::invalid(field, format!("expected an integer, got {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| TriviaError::invalid(field, format!("expected an integer, got {:?}", s))),
        Some(Value::Null) | None => Err(TriviaError::invalid(field, "is required")),
        Some(other) => Err(TriviaError::invalid(field, format!("expected an integer, got {}", other))),
    }
}

/// A category row: immutable id plus display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(rename = "type")]
    pub label: String,
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            type TEXT NOT NULL
        )",
        [],
    )?;

    // AUTOINCREMENT: ids of deleted questions are never handed out again
    conn.execute(
        "CREATE TABLE IF NOT EXISTS questions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            question TEXT NOT NULL,
            answer TEXT NOT NULL,
            category INTEGER NOT NULL,
            difficulty INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_questions_category ON questions(category)",
        [],
    )?;

    debug!("database schema ready");
    Ok(())
}

/// Insert the default categories; existing ids are left untouched.
pub fn seed_default_categories(conn: &Connection) -> Result<usize> {
    let mut inserted = 0;
    for (id, label) in DEFAULT_CATEGORIES {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO categories (id, type) VALUES (?1, ?2)",
            params![id, label],
        )?;
    }
    info!(inserted, "seeded default categories");
    Ok(inserted)
}

/// Insert or relabel a single category (administrative seeding only).
pub fn upsert_category(conn: &Connection, id: CategoryId, label: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO categories (id, type) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET type = excluded.type",
        params![id, label],
    )?;
    Ok(())
}

/// Read `question,answer,category,difficulty` rows into validated drafts.
pub fn load_questions_csv(csv_path: &Path) -> Result<Vec<QuestionDraft>> {
    let mut rdr = csv::Reader::from_path(csv_path)?;

    let mut drafts = Vec::new();
    for result in rdr.deserialize() {
        let draft: QuestionDraft = result?;
        draft.validate()?;
        drafts.push(draft);
    }

    debug!(count = drafts.len(), path = %csv_path.display(), "loaded question drafts");
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_setup_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        setup_database(&conn).unwrap();

        assert_eq!(seed_default_categories(&conn).unwrap(), 6);
        assert_eq!(seed_default_categories(&conn).unwrap(), 0);
    }

    #[test]
    fn test_schema_has_only_categories_and_questions() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        assert_eq!(tables, vec!["categories", "questions"]);
    }

    #[test]
    fn test_upsert_category_relabels() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        seed_default_categories(&conn).unwrap();

        upsert_category(&conn, 2, "Fine Art").unwrap();
        let label: String = conn
            .query_row("SELECT type FROM categories WHERE id = 2", [], |row| row.get(0))
            .unwrap();
        assert_eq!(label, "Fine Art");
    }

    #[test]
    fn test_draft_validation_rules() {
        assert!(QuestionDraft::new("Capital of Peru?", "Lima", 3, 2).validate().is_ok());
        assert!(QuestionDraft::new("Capital of Peru?", "Lima", 3, 0).validate().is_ok());

        let cases = [
            (QuestionDraft::new("  ", "Lima", 3, 2), "question"),
            (QuestionDraft::new("Capital of Peru?", "", 3, 2), "answer"),
            (QuestionDraft::new("Capital of Peru?", "Lima", 0, 2), "category"),
            (QuestionDraft::new("Capital of Peru?", "Lima", 3, -1), "difficulty"),
        ];
        for (draft, expected) in cases {
            match draft.validate() {
                Err(TriviaError::InvalidInput { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidInput for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_draft_from_json_accepts_numeric_strings() {
        let body = json!({
            "question": "What is the capital of Saudi Arabia?",
            "answer": "Riyadh",
            "category": "3",
            "difficulty": 1
        });
        let draft = QuestionDraft::from_json(&body).unwrap();
        assert_eq!(draft.category, 3);
        assert_eq!(draft.difficulty, 1);
    }

    #[test]
    fn test_draft_from_json_rejects_bad_fields() {
        let missing = json!({ "question": "Q?", "category": 1, "difficulty": 1 });
        assert!(matches!(
            QuestionDraft::from_json(&missing),
            Err(TriviaError::InvalidInput { field: "answer", .. })
        ));

        let null_question = json!({ "question": null, "answer": "A", "category": 1, "difficulty": 1 });
        assert!(matches!(
            QuestionDraft::from_json(&null_question),
            Err(TriviaError::InvalidInput { field: "question", .. })
        ));

        let float_category = json!({ "question": "Q?", "answer": "A", "category": 1.5, "difficulty": 1 });
        assert!(matches!(
            QuestionDraft::from_json(&float_category),
            Err(TriviaError::InvalidInput { field: "category", .. })
        ));

        let word_difficulty = json!({ "question": "Q?", "answer": "A", "category": 1, "difficulty": "hard" });
        assert!(matches!(
            QuestionDraft::from_json(&word_difficulty),
            Err(TriviaError::InvalidInput { field: "difficulty", .. })
        ));
    }

    #[test]
    fn test_matches_folded_ignores_question_case() {
        let q = Question {
            id: 1,
            question: "Which city is the capital of France?".to_string(),
            answer: "Paris".to_string(),
            category: 3,
            difficulty: 1,
        };
        assert!(q.matches_folded("capital"));
        assert!(q.matches_folded("france"));
        assert!(q.matches_folded(""));
        assert!(!q.matches_folded("paris"));
    }

    #[test]
    fn test_load_questions_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "question,answer,category,difficulty").unwrap();
        writeln!(file, "\"Who painted the Mona Lisa?\",Leonardo da Vinci,2,1").unwrap();
        writeln!(file, "What boxer's original name is Cassius Clay?,Muhammad Ali,4,1").unwrap();

        let drafts = load_questions_csv(file.path()).unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].answer, "Leonardo da Vinci");
        assert_eq!(drafts[1].category, 4);
    }

    #[test]
    fn test_load_questions_csv_rejects_invalid_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "question,answer,category,difficulty").unwrap();
        writeln!(file, "Q?,A,1,-4").unwrap();

        assert!(matches!(
            load_questions_csv(file.path()),
            Err(TriviaError::InvalidInput { field: "difficulty", .. })
        ));
    }
}
