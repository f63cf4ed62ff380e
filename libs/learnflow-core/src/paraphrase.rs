//! Practice sessions over paraphrases.

use std::collections::HashMap;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::matching::{answers_match, matches_any};
use crate::quiz::{AnswerRecord, Score};
use crate::types::Paraphrase;

/// What the learner has to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParaphraseMode {
    /// Shown the original, answer with any variation.
    RecallVariations,
    /// Shown a variation, answer with the original.
    RecallOriginal,
}

/// One prompt with the answers it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParaphraseQuestion {
    pub paraphrase_id: i64,
    pub prompt: String,
    pub accepted: Vec<String>,
}

impl ParaphraseQuestion {
    fn from_paraphrase<R: Rng + ?Sized>(
        paraphrase: &Paraphrase,
        mode: ParaphraseMode,
        rng: &mut R,
    ) -> Option<Self> {
        let variations: Vec<&str> = paraphrase.usable_variations().collect();
        match mode {
            ParaphraseMode::RecallVariations if !variations.is_empty() => Some(Self {
                paraphrase_id: paraphrase.id,
                prompt: paraphrase.original.clone(),
                accepted: variations.into_iter().map(str::to_string).collect(),
            }),
            ParaphraseMode::RecallOriginal => variations.choose(rng).map(|prompt| Self {
                paraphrase_id: paraphrase.id,
                prompt: prompt.to_string(),
                accepted: vec![paraphrase.original.clone()],
            }),
            _ => None,
        }
    }

    /// Accepted answers joined for display.
    pub fn expected(&self) -> String {
        self.accepted.join(" / ")
    }
}

/// A linear, single-pass paraphrase drill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParaphraseSession {
    mode: ParaphraseMode,
    questions: Vec<ParaphraseQuestion>,
    cursor: usize,
    answers: HashMap<i64, AnswerRecord>,
    complete: bool,
}

impl ParaphraseSession {
    /// Sample up to `limit` paraphrases that have at least one variation.
    pub fn start<R: Rng + ?Sized>(
        paraphrases: &[Paraphrase],
        limit: usize,
        mode: ParaphraseMode,
        rng: &mut R,
    ) -> Result<Self> {
        let mut candidates: Vec<&Paraphrase> = paraphrases
            .iter()
            .filter(|p| p.usable_variations().next().is_some())
            .collect();
        if candidates.is_empty() {
            return Err(ValidationError::NoParaphrases);
        }

        candidates.shuffle(rng);
        candidates.truncate(limit);

        let questions: Vec<ParaphraseQuestion> = candidates
            .into_iter()
            .filter_map(|p| ParaphraseQuestion::from_paraphrase(p, mode, rng))
            .collect();

        Ok(Self {
            mode,
            complete: questions.is_empty(),
            questions,
            cursor: 0,
            answers: HashMap::new(),
        })
    }

    pub fn mode(&self) -> ParaphraseMode {
        self.mode
    }

    pub fn questions(&self) -> &[ParaphraseQuestion] {
        &self.questions
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn current(&self) -> Option<&ParaphraseQuestion> {
        if self.complete {
            None
        } else {
            self.questions.get(self.cursor)
        }
    }

    pub fn answer_for(&self, paraphrase_id: i64) -> Option<&AnswerRecord> {
        self.answers.get(&paraphrase_id)
    }

    /// Record an answer for the current prompt and move on.
    pub fn answer(&mut self, given: &str) -> Result<AnswerRecord> {
        let question = self.current().ok_or(ValidationError::SessionComplete)?;
        let paraphrase_id = question.paraphrase_id;
        let is_correct = match self.mode {
            ParaphraseMode::RecallVariations => {
                matches_any(given, question.accepted.iter().map(String::as_str))
            }
            ParaphraseMode::RecallOriginal => question
                .accepted
                .first()
                .is_some_and(|original| answers_match(given, original)),
        };
        let record = AnswerRecord {
            given: given.to_string(),
            correct: question.expected(),
            is_correct,
        };
        self.answers.insert(paraphrase_id, record.clone());

        if self.cursor + 1 < self.questions.len() {
            self.cursor += 1;
        } else {
            self.complete = true;
        }
        Ok(record)
    }

    pub fn score(&self) -> Score {
        let correct = self.answers.values().filter(|a| a.is_correct).count();
        Score::new(correct, self.questions.len())
    }

    /// Every question with its recorded answer, in order.
    pub fn review(&self) -> Vec<(&ParaphraseQuestion, Option<&AnswerRecord>)> {
        self.questions
            .iter()
            .map(|q| (q, self.answers.get(&q.paraphrase_id)))
            .collect()
    }
}
