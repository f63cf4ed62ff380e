//! Study queue of due cards.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::Card;

/// A queued card: its id and position in the collection at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueEntry {
    pub card_id: i64,
    pub index: usize,
}

/// Ordered due cards for one review session, with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyQueue {
    entries: Vec<QueueEntry>,
    cursor: usize,
}

impl StudyQueue {
    /// Collect the due cards, order them by box, then shuffle the whole queue.
    ///
    /// The shuffle covers the entire due set, so the box ordering does not
    /// survive into the result.
    pub fn build<R: Rng + ?Sized>(cards: &[Card], now: DateTime<Utc>, rng: &mut R) -> Self {
        let mut due: Vec<(u8, QueueEntry)> = cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_due(now))
            .map(|(index, card)| {
                (
                    card.leitner_box,
                    QueueEntry {
                        card_id: card.id,
                        index,
                    },
                )
            })
            .collect();
        due.sort_by_key(|(leitner_box, _)| *leitner_box);

        let mut entries: Vec<QueueEntry> = due.into_iter().map(|(_, entry)| entry).collect();
        entries.shuffle(rng);

        Self { entries, cursor: 0 }
    }

    /// Shuffle the current entries again without re-checking due times.
    pub fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.entries.shuffle(rng);
        self.cursor = 0;
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<QueueEntry> {
        self.entries.get(self.cursor).copied()
    }

    /// Drop the current entry and keep the cursor in bounds.
    pub fn remove_current(&mut self) -> Option<QueueEntry> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(self.cursor);
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
        Some(removed)
    }

    /// Resolve the queued entries against the collection, in queue order.
    pub fn cards<'a>(&'a self, cards: &'a [Card]) -> impl Iterator<Item = &'a Card> + 'a {
        self.entries.iter().filter_map(move |entry| {
            cards
                .get(entry.index)
                .filter(|card| card.id == entry.card_id)
                .or_else(|| cards.iter().find(|card| card.id == entry.card_id))
        })
    }
}
