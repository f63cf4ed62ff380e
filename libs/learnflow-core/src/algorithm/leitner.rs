//! Five-box Leitner scheduler.
//!
//! A correct answer moves a card up one box, a wrong answer sends it back to
//! box 1. Each box has a fixed review delay.

use super::SpacedRepetitionAlgorithm;
use crate::types::{Card, MAX_BOX, MIN_BOX};
use chrono::{DateTime, Duration, Utc};

/// Leitner scheduler with a per-box interval table.
#[derive(Debug, Clone)]
pub struct Leitner {
    /// Interval for boxes 1 through 5, in order.
    pub intervals: [Duration; MAX_BOX as usize],
}

impl Default for Leitner {
    fn default() -> Self {
        Self {
            intervals: [
                Duration::zero(),
                Duration::days(1),
                Duration::days(3),
                Duration::days(7),
                Duration::days(14),
            ],
        }
    }
}

impl Leitner {
    /// Box reached after one answer.
    pub fn next_box(current: u8, correct: bool) -> u8 {
        if correct {
            current.saturating_add(1).clamp(MIN_BOX, MAX_BOX)
        } else {
            MIN_BOX
        }
    }
}

impl SpacedRepetitionAlgorithm for Leitner {
    fn name(&self) -> &'static str {
        "leitner"
    }

    fn interval(&self, leitner_box: u8) -> Duration {
        let slot = leitner_box.clamp(MIN_BOX, MAX_BOX) - MIN_BOX;
        self.intervals[slot as usize]
    }

    fn schedule(&self, card: &Card, correct: bool, now: DateTime<Utc>) -> Card {
        let leitner_box = Self::next_box(card.leitner_box, correct);

        Card {
            leitner_box,
            reviews: card.reviews.saturating_add(1),
            last_review: Some(now),
            next_review: Some(now + self.interval(leitner_box)),
            ..card.clone()
        }
    }
}
