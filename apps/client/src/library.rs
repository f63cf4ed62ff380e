//! Application state and every operation on it.
//!
//! [`Library`] owns the card and paraphrase collections together with the
//! study queue and any running test. Writes are local-first: the collection
//! and the cache are updated whether or not the remote call succeeds, and a
//! failed remote call leaves a dismissible warning behind.

use std::future::Future;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use learnflow_core::algorithm::rate;
use learnflow_core::clock::{Clock, SystemClock};
use learnflow_core::export::export;
use learnflow_core::merge::merge;
use learnflow_core::paraphrase::{ParaphraseMode, ParaphraseSession};
use learnflow_core::parser::{parse, TransferFormat};
use learnflow_core::queue::StudyQueue;
use learnflow_core::quiz::{AnswerRecord, TestKind, TestSession, QUIZ_SIZE};
use learnflow_core::types::{
    units, Card, CardEdit, DeckStats, NewCard, NewParaphrase, Paraphrase,
};

use crate::cache::{LocalCache, CARDS_KEY, PARAPHRASES_KEY};
use crate::error::{LibraryError, Result};
use crate::remote::{CardPatch, CardPayload, ParaphrasePayload, RemoteError, RemoteStore};

/// The collections, study queue and running tests, backed by a cache and a remote store.
pub struct Library<R> {
    remote: R,
    cache: LocalCache,
    clock: Arc<dyn Clock>,
    rng: StdRng,
    cards: Vec<Card>,
    paraphrases: Vec<Paraphrase>,
    queue: StudyQueue,
    test: Option<TestSession>,
    paraphrase_test: Option<ParaphraseSession>,
    warning: Option<String>,
}

impl<R: RemoteStore> Library<R> {
    /// Library on wall-clock time with an OS-seeded random source.
    pub fn open(remote: R, cache: LocalCache) -> Self {
        Self::new(remote, cache, Arc::new(SystemClock), StdRng::from_os_rng())
    }

    /// Build a library from the cached collections.
    pub fn new(remote: R, cache: LocalCache, clock: Arc<dyn Clock>, rng: StdRng) -> Self {
        let cards = cache.load(CARDS_KEY).unwrap_or_default();
        let paraphrases = cache.load(PARAPHRASES_KEY).unwrap_or_default();

        let mut library = Self {
            remote,
            cache,
            clock,
            rng,
            cards,
            paraphrases,
            queue: StudyQueue::default(),
            test: None,
            paraphrase_test: None,
            warning: None,
        };
        library.rebuild_queue();
        library
    }

    // === Loading ===

    /// Merge the remote collections into the cached ones.
    ///
    /// Each collection is merged independently; a failed fetch keeps the
    /// cached copy.
    pub async fn load(&mut self) {
        self.warning = None;
        let now = self.clock.now();

        let fetched = optimistic(&mut self.warning, "load cards", self.remote.fetch_cards()).await;
        if let Some(rows) = fetched {
            let remote: Vec<Card> = rows.into_iter().map(|row| row.into_card(now)).collect();
            tracing::info!(remote = remote.len(), local = self.cards.len(), "Merging cards");
            self.cards = merge(remote, std::mem::take(&mut self.cards));
            self.persist_cards();
        }

        let fetched = optimistic(
            &mut self.warning,
            "load paraphrases",
            self.remote.fetch_paraphrases(),
        )
        .await;
        if let Some(rows) = fetched {
            let remote: Vec<Paraphrase> = rows
                .into_iter()
                .map(|row| row.into_paraphrase(now))
                .collect();
            self.paraphrases = merge(remote, std::mem::take(&mut self.paraphrases));
            self.persist_paraphrases();
        }

        self.rebuild_queue();
    }

    // === Accessors ===

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: i64) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn paraphrases(&self) -> &[Paraphrase] {
        &self.paraphrases
    }

    pub fn queue(&self) -> &StudyQueue {
        &self.queue
    }

    /// Cards in the study queue, in queue order.
    pub fn due_cards(&self) -> Vec<&Card> {
        self.queue.cards(&self.cards).collect()
    }

    /// Card under the queue cursor.
    pub fn current_card(&self) -> Option<&Card> {
        let entry = self.queue.current()?;
        self.card(entry.card_id)
    }

    pub fn stats(&self) -> DeckStats {
        DeckStats::from_cards(&self.cards)
    }

    pub fn units(&self) -> Vec<String> {
        units(&self.cards)
    }

    /// Message left by the last failed remote call.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    // === Study queue ===

    pub fn rebuild_queue(&mut self) {
        self.queue = StudyQueue::build(&self.cards, self.clock.now(), &mut self.rng);
    }

    pub fn reshuffle_queue(&mut self) {
        self.queue.reshuffle(&mut self.rng);
    }

    /// Rate the current card and drop it from the queue.
    ///
    /// Returns the rated card, or `None` when the queue is empty.
    pub fn rate_current(&mut self, correct: bool) -> Option<Card> {
        let entry = self.queue.current()?;
        let now = self.clock.now();

        let rated = match self.cards.iter_mut().find(|card| card.id == entry.card_id) {
            Some(card) => {
                *card = rate(card, correct, now);
                Some(card.clone())
            }
            None => None,
        };
        self.queue.remove_current();

        if let Some(card) = &rated {
            tracing::debug!(id = card.id, leitner_box = card.leitner_box, correct, "Card rated");
            self.persist_cards();
        }
        rated
    }

    /// Put every card back in box 1.
    pub fn reset_progress(&mut self) {
        for card in &mut self.cards {
            card.reset_progress();
        }
        tracing::info!(cards = self.cards.len(), "Progress reset");
        self.persist_cards();
        self.rebuild_queue();
    }

    // === Cards ===

    pub async fn add_card(&mut self, draft: NewCard) -> Result<Card> {
        let draft = draft.validate()?;
        self.warning = None;
        let now = self.clock.now();

        let payload = CardPayload::from(&draft);
        let stored = optimistic(&mut self.warning, "save card", self.remote.insert_card(&payload)).await;

        let card = match stored {
            Some(row) => row.into_card_with(&draft, now),
            None => Card::new(self.local_card_ids(1)[0], draft, now),
        };
        self.cards.push(card.clone());
        self.persist_cards();
        self.rebuild_queue();
        Ok(card)
    }

    /// Replace the text fields of a card. Scheduling state is kept.
    pub async fn update_card(&mut self, id: i64, edit: CardEdit) -> Result<()> {
        let edit = edit.validate()?;
        let card = self
            .cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or(LibraryError::CardNotFound(id))?;
        let patch = CardPatch::from(&edit);
        card.apply_edit(edit);
        self.persist_cards();

        self.warning = None;
        optimistic(&mut self.warning, "update card", self.remote.update_card(id, &patch)).await;
        Ok(())
    }

    pub async fn delete_card(&mut self, id: i64) -> Result<()> {
        let index = self
            .cards
            .iter()
            .position(|card| card.id == id)
            .ok_or(LibraryError::CardNotFound(id))?;
        self.cards.remove(index);
        self.persist_cards();
        self.rebuild_queue();

        self.warning = None;
        optimistic(&mut self.warning, "delete card", self.remote.delete_card(id)).await;
        Ok(())
    }

    /// Parse `content` and append every valid row. Returns the number added.
    pub async fn import_cards(&mut self, format: TransferFormat, content: &str) -> Result<usize> {
        let drafts = parse(content, format)?;
        self.warning = None;
        let now = self.clock.now();

        let payloads: Vec<CardPayload> = drafts.iter().map(CardPayload::from).collect();
        let stored =
            optimistic(&mut self.warning, "import cards", self.remote.insert_cards(&payloads)).await;

        // Stored rows come back in payload order; drafts without a row keep a local id.
        let mut rows = stored.unwrap_or_default().into_iter();
        let mut stored_cards = Vec::with_capacity(drafts.len());
        let mut unsaved = Vec::new();
        for draft in drafts {
            match rows.next() {
                Some(row) => stored_cards.push(row.into_card_with(&draft, now)),
                None => unsaved.push(draft),
            }
        }
        let local_ids = self.local_card_ids(unsaved.len());
        let imported: Vec<Card> = stored_cards
            .into_iter()
            .chain(
                local_ids
                    .into_iter()
                    .zip(unsaved)
                    .map(|(id, draft)| Card::new(id, draft, now)),
            )
            .collect();

        let count = imported.len();
        tracing::info!(count, format = %format, "Cards imported");
        self.cards.extend(imported);
        self.persist_cards();
        self.rebuild_queue();
        Ok(count)
    }

    pub fn export_cards(&self, format: TransferFormat) -> Result<String> {
        Ok(export(&self.cards, format)?)
    }

    // === Paraphrases ===

    pub async fn add_paraphrase(&mut self, draft: NewParaphrase) -> Result<Paraphrase> {
        let draft = draft.validate()?;
        self.warning = None;
        let now = self.clock.now();

        let payload = ParaphrasePayload::from(&draft);
        let stored = optimistic(
            &mut self.warning,
            "save paraphrase",
            self.remote.insert_paraphrase(&payload),
        )
        .await;

        let paraphrase = match stored {
            Some(row) => row.into_paraphrase_with(&draft, now),
            None => Paraphrase::new(self.local_paraphrase_id(), draft, now),
        };
        self.paraphrases.push(paraphrase.clone());
        self.persist_paraphrases();
        Ok(paraphrase)
    }

    pub async fn update_paraphrase(&mut self, id: i64, draft: NewParaphrase) -> Result<()> {
        let draft = draft.validate()?;
        let paraphrase = self
            .paraphrases
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(LibraryError::ParaphraseNotFound(id))?;
        let payload = ParaphrasePayload::from(&draft);
        paraphrase.original = draft.original;
        paraphrase.variations = draft.variations;
        self.persist_paraphrases();

        self.warning = None;
        optimistic(
            &mut self.warning,
            "update paraphrase",
            self.remote.update_paraphrase(id, &payload),
        )
        .await;
        Ok(())
    }

    pub async fn delete_paraphrase(&mut self, id: i64) -> Result<()> {
        let index = self
            .paraphrases
            .iter()
            .position(|p| p.id == id)
            .ok_or(LibraryError::ParaphraseNotFound(id))?;
        self.paraphrases.remove(index);
        self.persist_paraphrases();

        self.warning = None;
        optimistic(
            &mut self.warning,
            "delete paraphrase",
            self.remote.delete_paraphrase(id),
        )
        .await;
        Ok(())
    }

    // === Card tests ===

    /// Start a test over the given units, replacing any running one.
    ///
    /// On failure the running test, if any, is left untouched.
    pub fn start_test(&mut self, units: &[String], limit: usize, kind: TestKind) -> Result<&TestSession> {
        let session = TestSession::start(&self.cards, units, limit, kind, &mut self.rng)?;
        Ok(&*self.test.insert(session))
    }

    /// Standard ten-question test over the whole collection.
    pub fn start_quiz(&mut self, kind: TestKind) -> Result<&TestSession> {
        self.start_test(&[], QUIZ_SIZE, kind)
    }

    pub fn test_session(&self) -> Option<&TestSession> {
        self.test.as_ref()
    }

    pub fn answer_test(&mut self, given: &str) -> Result<AnswerRecord> {
        let session = self.test.as_mut().ok_or(LibraryError::NoActiveSession)?;
        Ok(session.answer(given, &mut self.rng)?)
    }

    pub fn reset_test(&mut self) {
        self.test = None;
    }

    // === Paraphrase tests ===

    pub fn start_paraphrase_test(&mut self, mode: ParaphraseMode) -> Result<&ParaphraseSession> {
        let session = ParaphraseSession::start(&self.paraphrases, QUIZ_SIZE, mode, &mut self.rng)?;
        Ok(&*self.paraphrase_test.insert(session))
    }

    pub fn paraphrase_session(&self) -> Option<&ParaphraseSession> {
        self.paraphrase_test.as_ref()
    }

    pub fn answer_paraphrase(&mut self, given: &str) -> Result<AnswerRecord> {
        let session = self
            .paraphrase_test
            .as_mut()
            .ok_or(LibraryError::NoActiveSession)?;
        Ok(session.answer(given)?)
    }

    pub fn reset_paraphrase_test(&mut self) {
        self.paraphrase_test = None;
    }

    // === Internals ===

    /// `count` unused ids counting up from the current millisecond timestamp.
    fn local_card_ids(&self, count: usize) -> Vec<i64> {
        let mut next = self.clock.now().timestamp_millis();
        let mut ids = Vec::with_capacity(count);
        while ids.len() < count {
            if !self.cards.iter().any(|card| card.id == next) {
                ids.push(next);
            }
            next += 1;
        }
        ids
    }

    fn local_paraphrase_id(&self) -> i64 {
        let mut id = self.clock.now().timestamp_millis();
        while self.paraphrases.iter().any(|p| p.id == id) {
            id += 1;
        }
        id
    }

    fn persist_cards(&self) {
        if let Err(e) = self.cache.store(CARDS_KEY, &self.cards) {
            tracing::warn!(error = %e, "Failed to cache cards");
        }
    }

    fn persist_paraphrases(&self) {
        if let Err(e) = self.cache.store(PARAPHRASES_KEY, &self.paraphrases) {
            tracing::warn!(error = %e, "Failed to cache paraphrases");
        }
    }
}

/// Await a remote call, turning failure into a warning.
///
/// An unconfigured remote is not a failure and leaves no warning.
async fn optimistic<T>(
    warning: &mut Option<String>,
    action: &str,
    call: impl Future<Output = std::result::Result<T, RemoteError>>,
) -> Option<T> {
    match call.await {
        Ok(value) => Some(value),
        Err(RemoteError::NotConfigured) => {
            tracing::debug!(action, "No remote configured");
            None
        }
        Err(e) => {
            tracing::warn!(action, error = %e, "Remote call failed, keeping local state");
            *warning = Some(format!("Could not {action} remotely ({e}); saved locally"));
            None
        }
    }
}
