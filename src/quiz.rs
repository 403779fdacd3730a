// 🎯 Quiz Selector - picks the next unseen question from a pool
//
// Stateless: the caller supplies the ids already asked on every call.
//
// Pool:
//   category 0  → Unscoped, every question
//   category N  → Scoped, questions with category == N
//
// Strategies:
//   FirstUnseen → lowest unseen id (deterministic, the default)
//   Random      → uniform among unseen candidates (opt-in)

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::db::{CategoryId, Question, QuestionId};
use crate::error::{Result, TriviaError};
use crate::repository::QuestionRepository;

/// Category id callers send to mean "any category".
pub const ANY_CATEGORY: CategoryId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizScope {
    Unscoped,
    Scoped(CategoryId),
}

impl QuizScope {
    pub fn from_category_id(id: CategoryId) -> Result<Self> {
        match id {
            ANY_CATEGORY => Ok(QuizScope::Unscoped),
            id if id > 0 => Ok(QuizScope::Scoped(id)),
            id => Err(TriviaError::invalid(
                "quiz_category",
                format!("expected 0 (any) or a category id, got {}", id),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    #[default]
    FirstUnseen,
    Random,
}

/// Result of asking for the next question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizOutcome {
    Found(Question),
    /// Every question in the pool has been asked already
    Exhausted,
}

impl QuizOutcome {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, QuizOutcome::Exhausted)
    }

    pub fn question(&self) -> Option<&Question> {
        match self {
            QuizOutcome::Found(q) => Some(q),
            QuizOutcome::Exhausted => None,
        }
    }

    pub fn into_question(self) -> Option<Question> {
        match self {
            QuizOutcome::Found(q) => Some(q),
            QuizOutcome::Exhausted => None,
        }
    }
}

#[derive(Clone, Copy)]
pub struct QuizSelector<'a> {
    repo: QuestionRepository<'a>,
    strategy: SelectionStrategy,
}

impl<'a> QuizSelector<'a> {
    pub fn new(repo: QuestionRepository<'a>) -> Self {
        Self {
            repo,
            strategy: SelectionStrategy::FirstUnseen,
        }
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    fn pool(&self, scope: QuizScope) -> Result<Vec<Question>> {
        match scope {
            QuizScope::Unscoped => self.repo.list_all(),
            QuizScope::Scoped(category) => self.repo.filter_by_category(category),
        }
    }

    pub fn next_question(&self, category: CategoryId, previous: &HashSet<QuestionId>) -> Result<QuizOutcome> {
        self.next_question_with_rng(category, previous, &mut rand::thread_rng())
    }

    /// Same as [`next_question`](Self::next_question) with a caller-supplied
    /// rng; only consulted by `SelectionStrategy::Random`.
    pub fn next_question_with_rng<R: Rng + ?Sized>(
        &self,
        category: CategoryId,
        previous: &HashSet<QuestionId>,
        rng: &mut R,
    ) -> Result<QuizOutcome> {
        let scope = QuizScope::from_category_id(category)?;
        let pool = self.pool(scope)?;
        let pool_size = pool.len();

        let picked = match self.strategy {
            SelectionStrategy::FirstUnseen => pool.into_iter().find(|q| !previous.contains(&q.id)),
            SelectionStrategy::Random => {
                let unseen: Vec<Question> = pool.into_iter().filter(|q| !previous.contains(&q.id)).collect();
                unseen.choose(rng).cloned()
            }
        };

        match picked {
            Some(question) => {
                debug!(?scope, id = question.id, "quiz question selected");
                Ok(QuizOutcome::Found(question))
            }
            None => {
                debug!(?scope, pool_size, asked = previous.len(), "quiz pool exhausted");
                Ok(QuizOutcome::Exhausted)
            }
        }
    }
}
