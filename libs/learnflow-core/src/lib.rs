//! Core library for the LearnFlow study tool.
//!
//! Provides:
//! - Card and paraphrase types with input validation
//! - Leitner box scheduling and the due-card study queue
//! - Quiz and paraphrase practice sessions
//! - Import and export in CSV, TSV, Quizlet and JSON formats
//! - Identity merge of local and remote collections

pub mod algorithm;
pub mod clock;
pub mod error;
pub mod export;
pub mod matching;
pub mod merge;
pub mod paraphrase;
pub mod parser;
pub mod queue;
pub mod quiz;
pub mod types;

pub use algorithm::{rate, Leitner, SpacedRepetitionAlgorithm};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, TransferError, ValidationError};
pub use export::export;
pub use matching::{answers_match, matches_any, normalize_answer};
pub use merge::{merge, Identified};
pub use paraphrase::{ParaphraseMode, ParaphraseQuestion, ParaphraseSession};
pub use parser::{parse, TransferFormat};
pub use queue::{QueueEntry, StudyQueue};
pub use quiz::{AnswerRecord, Score, TestKind, TestSession, CHOICE_COUNT, QUIZ_SIZE, UNIT_TEST_SIZE};
pub use types::{
    units, Card, CardEdit, DeckStats, NewCard, NewParaphrase, Paraphrase, DEFAULT_UNIT, MAX_BOX,
    MIN_BOX,
};
