//! Core types for the flashcard collection.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Unit label used when a card has none.
pub const DEFAULT_UNIT: &str = "General";

/// Lowest Leitner box. Cards here are always due.
pub const MIN_BOX: u8 = 1;

/// Highest Leitner box. Cards here count as mastered.
pub const MAX_BOX: u8 = 5;

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

fn default_box() -> u8 {
    MIN_BOX
}

/// A flashcard together with its scheduling state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub example: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(rename = "box", default = "default_box")]
    pub leitner_box: u8,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub last_review: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_review: Option<DateTime<Utc>>,
    pub created: DateTime<Utc>,
}

impl Card {
    /// Create a fresh card in box 1 from validated input.
    pub fn new(id: i64, draft: NewCard, created: DateTime<Utc>) -> Self {
        Self {
            id,
            front: draft.front,
            back: draft.back,
            translation: draft.translation,
            example: draft.example,
            unit: draft.unit,
            leitner_box: MIN_BOX,
            reviews: 0,
            last_review: None,
            next_review: None,
            created,
        }
    }

    /// A card is due when it has no next review or that time has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.map_or(true, |next| next <= now)
    }

    /// Unit label, falling back to the default for blank units.
    pub fn unit_label(&self) -> &str {
        if self.unit.trim().is_empty() {
            DEFAULT_UNIT
        } else {
            &self.unit
        }
    }

    /// Drop all scheduling state.
    pub fn reset_progress(&mut self) {
        self.leitner_box = MIN_BOX;
        self.reviews = 0;
        self.last_review = None;
        self.next_review = None;
    }

    /// Apply an edit that has already been validated.
    pub fn apply_edit(&mut self, edit: CardEdit) {
        self.front = edit.front;
        self.back = edit.back;
        self.translation = edit.translation;
        self.example = edit.example;
    }
}

/// User input for a new card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub unit: String,
}

impl NewCard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            ..Default::default()
        }
    }

    /// Trim every field, require front and back, default the unit.
    pub fn validate(self) -> Result<Self> {
        let front = require(&self.front, "front")?;
        let back = require(&self.back, "back")?;
        let unit = match self.unit.trim() {
            "" => default_unit(),
            unit => unit.to_string(),
        };

        Ok(Self {
            front,
            back,
            translation: self.translation.trim().to_string(),
            example: self.example.trim().to_string(),
            unit,
        })
    }
}

/// Editable text fields of an existing card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEdit {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub example: String,
}

impl CardEdit {
    pub fn validate(self) -> Result<Self> {
        Ok(Self {
            front: require(&self.front, "front")?,
            back: require(&self.back, "back")?,
            translation: self.translation.trim().to_string(),
            example: self.example.trim().to_string(),
        })
    }
}

/// A phrase with alternative wordings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paraphrase {
    pub id: i64,
    pub original: String,
    #[serde(default)]
    pub variations: Vec<String>,
    pub created: DateTime<Utc>,
}

impl Paraphrase {
    pub fn new(id: i64, draft: NewParaphrase, created: DateTime<Utc>) -> Self {
        Self {
            id,
            original: draft.original,
            variations: draft.variations,
            created,
        }
    }

    /// Variations with blank entries skipped.
    pub fn usable_variations(&self) -> impl Iterator<Item = &str> {
        self.variations
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// User input for a new or edited paraphrase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParaphrase {
    pub original: String,
    pub variations: Vec<String>,
}

impl NewParaphrase {
    pub fn new<I, S>(original: impl Into<String>, variations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            original: original.into(),
            variations: variations.into_iter().map(Into::into).collect(),
        }
    }

    /// Trim the original and every variation, dropping blank variations.
    pub fn validate(self) -> Result<Self> {
        let original = require(&self.original, "original")?;
        let variations: Vec<String> = self
            .variations
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();

        if variations.is_empty() {
            return Err(ValidationError::NoVariations);
        }

        Ok(Self {
            original,
            variations,
        })
    }
}

fn require(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyField { field })
    } else {
        Ok(trimmed.to_string())
    }
}

/// Box distribution of a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStats {
    pub total: usize,
    pub mastered: usize,
    pub learning: usize,
    pub fresh: usize,
}

impl DeckStats {
    pub fn from_cards(cards: &[Card]) -> Self {
        cards.iter().fold(
            Self {
                total: cards.len(),
                ..Default::default()
            },
            |mut stats, card| {
                match card.leitner_box {
                    b if b >= MAX_BOX => stats.mastered += 1,
                    b if b > MIN_BOX => stats.learning += 1,
                    MIN_BOX => stats.fresh += 1,
                    _ => {}
                }
                stats
            },
        )
    }

    /// Share of mastered cards, 0.0 to 100.0.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.mastered as f64 / self.total as f64 * 100.0
        }
    }
}

/// Sorted, de-duplicated unit labels of a collection.
pub fn units(cards: &[Card]) -> Vec<String> {
    cards
        .iter()
        .map(|card| card.unit_label().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn card(id: i64, leitner_box: u8, unit: &str) -> Card {
        let mut card = Card::new(id, NewCard::new("q", "a"), Utc::now());
        card.leitner_box = leitner_box;
        card.unit = unit.to_string();
        card
    }

    #[test]
    fn new_card_starts_fresh() {
        let card = Card::new(7, NewCard::new("q", "a").validate().unwrap(), Utc::now());
        assert_eq!(card.leitner_box, 1);
        assert_eq!(card.reviews, 0);
        assert!(card.last_review.is_none());
        assert!(card.next_review.is_none());
        assert_eq!(card.unit, "General");
    }

    #[test]
    fn validate_trims_and_requires_front_and_back() {
        let draft = NewCard {
            front: "  bonjour ".into(),
            back: " hello".into(),
            translation: " hi ".into(),
            example: String::new(),
            unit: "  ".into(),
        };
        let valid = draft.validate().unwrap();
        assert_eq!(valid.front, "bonjour");
        assert_eq!(valid.back, "hello");
        assert_eq!(valid.translation, "hi");
        assert_eq!(valid.unit, "General");

        let err = NewCard::new("   ", "x").validate().unwrap_err();
        assert_eq!(err, ValidationError::EmptyField { field: "front" });
        let err = NewCard::new("x", "").validate().unwrap_err();
        assert_eq!(err, ValidationError::EmptyField { field: "back" });
    }

    #[test]
    fn paraphrase_drops_blank_variations() {
        let valid = NewParaphrase::new(" big ", ["large ", "", "  ", "huge"])
            .validate()
            .unwrap();
        assert_eq!(valid.original, "big");
        assert_eq!(valid.variations, vec!["large", "huge"]);
    }

    #[test]
    fn paraphrase_without_variations_is_rejected() {
        let err = NewParaphrase::new("big", ["", " "]).validate().unwrap_err();
        assert_eq!(err, ValidationError::NoVariations);
    }

    #[test]
    fn card_without_next_review_is_due() {
        let card = card(1, 1, "General");
        assert!(card.is_due(Utc::now()));
    }

    #[test]
    fn stats_split_by_box() {
        let cards = vec![
            card(1, 1, "A"),
            card(2, 2, "A"),
            card(3, 4, "B"),
            card(4, 5, "B"),
            card(5, 5, "B"),
        ];
        let stats = DeckStats::from_cards(&cards);
        assert_eq!(
            stats,
            DeckStats {
                total: 5,
                mastered: 2,
                learning: 2,
                fresh: 1,
            }
        );
        assert_eq!(stats.progress(), 40.0);
        assert_eq!(DeckStats::from_cards(&[]).progress(), 0.0);
    }

    #[test]
    fn units_are_sorted_and_unique() {
        let cards = vec![card(1, 1, "Verbs"), card(2, 1, ""), card(3, 1, "Verbs")];
        assert_eq!(units(&cards), vec!["General", "Verbs"]);
    }

    #[test]
    fn card_json_uses_box_key() {
        let card = card(3, 2, "General");
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["box"], 2);
        assert!(json["nextReview"].is_null());

        let back: Card = serde_json::from_value(json).unwrap();
        assert_eq!(back, card);
    }
}
