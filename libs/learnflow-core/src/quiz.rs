//! Quiz sessions over flashcards.
//!
//! A session is a random sample of cards, answered once each in order. In
//! multiple-choice mode every question offers the correct back plus the backs
//! of three other cards from the same session.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::matching::answers_match;
use crate::types::Card;

/// Questions in a standard quiz.
pub const QUIZ_SIZE: usize = 10;

/// Questions in a whole-unit test.
pub const UNIT_TEST_SIZE: usize = 20;

/// Options shown for a multiple-choice question.
pub const CHOICE_COUNT: usize = 4;

/// How answers are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    Written,
    MultipleChoice,
}

/// One recorded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub given: String,
    pub correct: String,
    pub is_correct: bool,
}

/// Final score of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

impl Score {
    /// Rounded percentage of correct answers; an empty session scores 0.
    pub fn new(correct: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (correct as f64 * 100.0 / total as f64).round() as u32
        };
        Self {
            correct,
            total,
            percentage,
        }
    }
}

/// A bounded quiz over a sample of cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSession {
    kind: TestKind,
    cards: Vec<Card>,
    cursor: usize,
    answers: HashMap<i64, AnswerRecord>,
    options: Vec<String>,
    complete: bool,
}

impl TestSession {
    /// Sample up to `limit` cards from the selected units.
    ///
    /// An empty `units` slice selects every card.
    pub fn start<R: Rng + ?Sized>(
        cards: &[Card],
        units: &[String],
        limit: usize,
        kind: TestKind,
        rng: &mut R,
    ) -> Result<Self> {
        if cards.is_empty() {
            return Err(ValidationError::NoCards);
        }

        let mut candidates: Vec<&Card> = cards
            .iter()
            .filter(|card| units.is_empty() || units.iter().any(|u| u == card.unit_label()))
            .collect();
        if candidates.is_empty() {
            return Err(ValidationError::NoCardsInUnits);
        }

        candidates.shuffle(rng);
        candidates.truncate(limit);

        if kind == TestKind::MultipleChoice && candidates.len() < CHOICE_COUNT {
            return Err(ValidationError::NotEnoughCards {
                required: CHOICE_COUNT,
                available: candidates.len(),
            });
        }

        let mut session = Self {
            kind,
            complete: candidates.is_empty(),
            cards: candidates.into_iter().cloned().collect(),
            cursor: 0,
            answers: HashMap::new(),
            options: Vec::new(),
        };
        session.refresh_options(rng);
        Ok(session)
    }

    pub fn kind(&self) -> TestKind {
        self.kind
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Card awaiting an answer.
    pub fn current(&self) -> Option<&Card> {
        if self.complete {
            None
        } else {
            self.cards.get(self.cursor)
        }
    }

    /// Options for the current multiple-choice question, empty otherwise.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn answer_for(&self, card_id: i64) -> Option<&AnswerRecord> {
        self.answers.get(&card_id)
    }

    /// Record an answer for the current card and move on.
    pub fn answer<R: Rng + ?Sized>(&mut self, given: &str, rng: &mut R) -> Result<AnswerRecord> {
        let card = self.current().ok_or(ValidationError::SessionComplete)?;
        let card_id = card.id;
        let record = AnswerRecord {
            given: given.to_string(),
            correct: card.back.clone(),
            is_correct: answers_match(given, &card.back),
        };
        self.answers.insert(card_id, record.clone());

        if self.cursor + 1 < self.cards.len() {
            self.cursor += 1;
            self.refresh_options(rng);
        } else {
            self.complete = true;
            self.options.clear();
        }
        Ok(record)
    }

    pub fn score(&self) -> Score {
        let correct = self.answers.values().filter(|a| a.is_correct).count();
        Score::new(correct, self.cards.len())
    }

    /// Every card with its recorded answer, in question order.
    pub fn review(&self) -> Vec<(&Card, Option<&AnswerRecord>)> {
        self.cards
            .iter()
            .map(|card| (card, self.answers.get(&card.id)))
            .collect()
    }

    fn refresh_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let options = match (self.kind, self.current()) {
            (TestKind::MultipleChoice, Some(card)) => choice_options(card, &self.cards, rng),
            _ => Vec::new(),
        };
        self.options = options;
    }
}

/// The correct back plus up to three backs of other cards in `pool`, shuffled.
pub fn choice_options<R: Rng + ?Sized>(card: &Card, pool: &[Card], rng: &mut R) -> Vec<String> {
    let mut others: Vec<&Card> = pool.iter().filter(|other| other.id != card.id).collect();
    others.shuffle(rng);

    let mut options: Vec<String> = std::iter::once(card.back.clone())
        .chain(
            others
                .into_iter()
                .take(CHOICE_COUNT - 1)
                .map(|other| other.back.clone()),
        )
        .collect();
    options.shuffle(rng);
    options
}
