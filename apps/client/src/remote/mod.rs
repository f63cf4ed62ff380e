//! Remote store for shared cards and paraphrases.
//!
//! The store is a mirror of the local collections. Every call is allowed to
//! fail; callers keep their local state and surface a warning instead.

pub mod rest;

pub use rest::RestRemote;

use std::future::Future;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use learnflow_core::types::{Card, CardEdit, NewCard, NewParaphrase, Paraphrase, DEFAULT_UNIT};

/// Remote store errors.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Remote store is not configured")]
    NotConfigured,

    #[error("Remote store returned no rows")]
    EmptyResponse,
}

// === Wire types ===

/// Card fields sent on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardPayload {
    pub front: String,
    pub back: String,
    pub translation: String,
    pub example: String,
    pub unit: String,
}

impl From<&NewCard> for CardPayload {
    fn from(draft: &NewCard) -> Self {
        Self {
            front: draft.front.clone(),
            back: draft.back.clone(),
            translation: draft.translation.clone(),
            example: draft.example.clone(),
            unit: draft.unit.clone(),
        }
    }
}

/// Partial card update. Scheduling state is never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardPatch {
    pub front: String,
    pub back: String,
    pub translation: String,
    pub example: String,
}

impl From<&CardEdit> for CardPatch {
    fn from(edit: &CardEdit) -> Self {
        Self {
            front: edit.front.clone(),
            back: edit.back.clone(),
            translation: edit.translation.clone(),
            example: edit.example.clone(),
        }
    }
}

/// A card row as stored remotely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteCard {
    pub id: i64,
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RemoteCard {
    /// Convert to a card with fresh scheduling state.
    ///
    /// `now` stands in for a missing `created_at`.
    pub fn into_card(self, now: DateTime<Utc>) -> Card {
        let unit = self
            .unit
            .filter(|unit| !unit.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UNIT.to_string());
        let draft = NewCard {
            front: self.front.unwrap_or_default(),
            back: self.back.unwrap_or_default(),
            translation: self.translation.unwrap_or_default(),
            example: self.example.unwrap_or_default(),
            unit,
        };
        Card::new(self.id, draft, self.created_at.unwrap_or(now))
    }

    /// Convert the row returned for an insert of `draft`.
    ///
    /// Fields the row leaves out or blank are taken from the draft, so the
    /// stored card keeps a non-empty front and back.
    pub fn into_card_with(self, draft: &NewCard, now: DateTime<Utc>) -> Card {
        let merged = NewCard {
            front: filled_or(self.front, &draft.front),
            back: filled_or(self.back, &draft.back),
            translation: self.translation.unwrap_or_else(|| draft.translation.clone()),
            example: self.example.unwrap_or_else(|| draft.example.clone()),
            unit: filled_or(self.unit, &draft.unit),
        };
        Card::new(self.id, merged, self.created_at.unwrap_or(now))
    }
}

fn filled_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Paraphrase fields sent on insert and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParaphrasePayload {
    pub original: String,
    pub variations: Vec<String>,
}

impl From<&NewParaphrase> for ParaphrasePayload {
    fn from(draft: &NewParaphrase) -> Self {
        Self {
            original: draft.original.clone(),
            variations: draft.variations.clone(),
        }
    }
}

/// A paraphrase row as stored remotely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteParaphrase {
    pub id: i64,
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default, deserialize_with = "lenient_variations")]
    pub variations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RemoteParaphrase {
    pub fn into_paraphrase(self, now: DateTime<Utc>) -> Paraphrase {
        let draft = NewParaphrase {
            original: self.original.unwrap_or_default(),
            variations: self.variations,
        };
        Paraphrase::new(self.id, draft, self.created_at.unwrap_or(now))
    }

    /// Convert the row returned for an insert of `draft`.
    ///
    /// A row without a usable original or variation list falls back to the
    /// draft, so the stored paraphrase always has at least one variation.
    pub fn into_paraphrase_with(self, draft: &NewParaphrase, now: DateTime<Utc>) -> Paraphrase {
        let variations = if self.variations.iter().any(|v| !v.trim().is_empty()) {
            self.variations
        } else {
            draft.variations.clone()
        };
        let merged = NewParaphrase {
            original: filled_or(self.original, &draft.original),
            variations,
        };
        Paraphrase::new(self.id, merged, self.created_at.unwrap_or(now))
    }
}

/// Anything other than a list of strings becomes an empty list.
fn lenient_variations<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    })
}

/// Accept RFC 3339 timestamps and offset-less `timestamp` columns.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }))
}

// === Store contract ===

/// Operations the library needs from a remote store.
pub trait RemoteStore: Send + Sync {
    /// All cards, newest first.
    fn fetch_cards(&self) -> impl Future<Output = Result<Vec<RemoteCard>, RemoteError>> + Send;

    /// Insert one card and return the stored row.
    fn insert_card(
        &self,
        card: &CardPayload,
    ) -> impl Future<Output = Result<RemoteCard, RemoteError>> + Send;

    /// Insert many cards. An empty slice makes no request.
    fn insert_cards(
        &self,
        cards: &[CardPayload],
    ) -> impl Future<Output = Result<Vec<RemoteCard>, RemoteError>> + Send;

    fn update_card(
        &self,
        id: i64,
        patch: &CardPatch,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete_card(&self, id: i64) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// All paraphrases, newest first.
    fn fetch_paraphrases(
        &self,
    ) -> impl Future<Output = Result<Vec<RemoteParaphrase>, RemoteError>> + Send;

    fn insert_paraphrase(
        &self,
        paraphrase: &ParaphrasePayload,
    ) -> impl Future<Output = Result<RemoteParaphrase, RemoteError>> + Send;

    fn update_paraphrase(
        &self,
        id: i64,
        paraphrase: &ParaphrasePayload,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    fn delete_paraphrase(&self, id: i64) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// Store used when no remote is configured. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineRemote;

impl RemoteStore for OfflineRemote {
    async fn fetch_cards(&self) -> Result<Vec<RemoteCard>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn insert_card(&self, _card: &CardPayload) -> Result<RemoteCard, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn insert_cards(&self, _cards: &[CardPayload]) -> Result<Vec<RemoteCard>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn update_card(&self, _id: i64, _patch: &CardPatch) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn delete_card(&self, _id: i64) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn fetch_paraphrases(&self) -> Result<Vec<RemoteParaphrase>, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn insert_paraphrase(
        &self,
        _paraphrase: &ParaphrasePayload,
    ) -> Result<RemoteParaphrase, RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn update_paraphrase(
        &self,
        _id: i64,
        _paraphrase: &ParaphrasePayload,
    ) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }

    async fn delete_paraphrase(&self, _id: i64) -> Result<(), RemoteError> {
        Err(RemoteError::NotConfigured)
    }
}
