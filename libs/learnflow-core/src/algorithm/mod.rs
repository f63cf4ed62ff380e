//! Spaced repetition scheduling.

pub mod leitner;

pub use leitner::Leitner;

use crate::types::Card;
use chrono::{DateTime, Duration, Utc};

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Delay before a card in `leitner_box` is due again.
    fn interval(&self, leitner_box: u8) -> Duration;

    /// Return the card as it stands after one review at `now`.
    fn schedule(&self, card: &Card, correct: bool, now: DateTime<Utc>) -> Card;
}

/// Rate a card with the default Leitner table.
pub fn rate(card: &Card, correct: bool, now: DateTime<Utc>) -> Card {
    Leitner::default().schedule(card, correct, now)
}
