//! Shared test infrastructure for library integration tests.
//!
//! Provides an in-memory [`FakeRemote`] that can be switched into a failing
//! state or into answering inserts with sparse rows, and helpers to open a
//! [`Library`] on a temporary cache with a fixed clock and seeded random
//! source.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use learnflow::cache::LocalCache;
use learnflow::library::Library;
use learnflow::remote::{
    CardPatch, CardPayload, ParaphrasePayload, RemoteCard, RemoteError, RemoteParaphrase,
    RemoteStore,
};
use learnflow_core::clock::FixedClock;

/// Fixed start time for every test.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub cards: Vec<RemoteCard>,
    pub paraphrases: Vec<RemoteParaphrase>,
    pub next_id: i64,
    pub requests: Vec<String>,
}

/// In-memory remote store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<FakeState>>,
    failing: Arc<AtomicBool>,
    sparse: Arc<AtomicBool>,
}

impl FakeRemote {
    pub fn new() -> Self {
        let remote = Self::default();
        remote.state().next_id = 1000;
        remote
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Answer inserts with rows that carry little more than an id.
    pub fn set_sparse(&self, sparse: bool) {
        self.sparse.store(sparse, Ordering::SeqCst);
    }

    fn is_sparse(&self) -> bool {
        self.sparse.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    /// Seed a stored card row.
    pub fn with_card(self, id: i64, front: &str, back: &str) -> Self {
        self.state().cards.push(RemoteCard {
            id,
            front: Some(front.into()),
            back: Some(back.into()),
            translation: None,
            example: None,
            unit: None,
            created_at: Some(t0()),
        });
        self
    }

    /// Seed a stored paraphrase row.
    pub fn with_paraphrase(self, id: i64, original: &str, variations: &[&str]) -> Self {
        self.state().paraphrases.push(RemoteParaphrase {
            id,
            original: Some(original.into()),
            variations: variations.iter().map(|v| v.to_string()).collect(),
            created_at: Some(t0()),
        });
        self
    }

    fn begin(&self, request: String) -> Result<MutexGuard<'_, FakeState>, RemoteError> {
        let mut state = self.state();
        state.requests.push(request);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("connection refused".into()));
        }
        Ok(state)
    }
}

fn card_row(id: i64, payload: &CardPayload) -> RemoteCard {
    RemoteCard {
        id,
        front: Some(payload.front.clone()),
        back: Some(payload.back.clone()),
        translation: Some(payload.translation.clone()),
        example: Some(payload.example.clone()),
        unit: Some(payload.unit.clone()),
        created_at: Some(t0()),
    }
}

fn sparse_card(id: i64) -> RemoteCard {
    RemoteCard {
        id,
        front: None,
        back: None,
        translation: None,
        example: None,
        unit: None,
        created_at: None,
    }
}

impl RemoteStore for FakeRemote {
    async fn fetch_cards(&self) -> Result<Vec<RemoteCard>, RemoteError> {
        let state = self.begin("fetch_cards".into())?;
        Ok(state.cards.clone())
    }

    async fn insert_card(&self, card: &CardPayload) -> Result<RemoteCard, RemoteError> {
        let mut state = self.begin("insert_card".into())?;
        let row = card_row(state.next_id, card);
        state.next_id += 1;
        state.cards.insert(0, row.clone());
        Ok(if self.is_sparse() { sparse_card(row.id) } else { row })
    }

    async fn insert_cards(&self, cards: &[CardPayload]) -> Result<Vec<RemoteCard>, RemoteError> {
        if cards.is_empty() {
            return Ok(Vec::new());
        }
        let mut state = self.begin(format!("insert_cards:{}", cards.len()))?;
        let mut rows = Vec::with_capacity(cards.len());
        for card in cards {
            let row = card_row(state.next_id, card);
            state.next_id += 1;
            state.cards.push(row.clone());
            rows.push(if self.is_sparse() { sparse_card(row.id) } else { row });
        }
        Ok(rows)
    }

    async fn update_card(&self, id: i64, patch: &CardPatch) -> Result<(), RemoteError> {
        let mut state = self.begin(format!("update_card:{id}"))?;
        if let Some(row) = state.cards.iter_mut().find(|row| row.id == id) {
            row.front = Some(patch.front.clone());
            row.back = Some(patch.back.clone());
            row.translation = Some(patch.translation.clone());
            row.example = Some(patch.example.clone());
        }
        Ok(())
    }

    async fn delete_card(&self, id: i64) -> Result<(), RemoteError> {
        let mut state = self.begin(format!("delete_card:{id}"))?;
        state.cards.retain(|row| row.id != id);
        Ok(())
    }

    async fn fetch_paraphrases(&self) -> Result<Vec<RemoteParaphrase>, RemoteError> {
        let state = self.begin("fetch_paraphrases".into())?;
        Ok(state.paraphrases.clone())
    }

    async fn insert_paraphrase(
        &self,
        paraphrase: &ParaphrasePayload,
    ) -> Result<RemoteParaphrase, RemoteError> {
        let mut state = self.begin("insert_paraphrase".into())?;
        let row = RemoteParaphrase {
            id: state.next_id,
            original: Some(paraphrase.original.clone()),
            variations: paraphrase.variations.clone(),
            created_at: Some(t0()),
        };
        state.next_id += 1;
        state.paraphrases.insert(0, row.clone());
        if self.is_sparse() {
            // A `variations` value that is not a list decodes as empty.
            return Ok(RemoteParaphrase {
                variations: Vec::new(),
                created_at: None,
                ..row
            });
        }
        Ok(row)
    }

    async fn update_paraphrase(
        &self,
        id: i64,
        paraphrase: &ParaphrasePayload,
    ) -> Result<(), RemoteError> {
        let mut state = self.begin(format!("update_paraphrase:{id}"))?;
        if let Some(row) = state.paraphrases.iter_mut().find(|row| row.id == id) {
            row.original = Some(paraphrase.original.clone());
            row.variations = paraphrase.variations.clone();
        }
        Ok(())
    }

    async fn delete_paraphrase(&self, id: i64) -> Result<(), RemoteError> {
        let mut state = self.begin(format!("delete_paraphrase:{id}"))?;
        state.paraphrases.retain(|row| row.id != id);
        Ok(())
    }
}

/// A library under test with handles to its collaborators.
pub struct TestContext {
    pub library: Library<FakeRemote>,
    pub remote: FakeRemote,
    pub clock: Arc<FixedClock>,
    pub dir: TempDir,
}

impl TestContext {
    pub fn new(remote: FakeRemote) -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::in_dir(remote, dir)
    }

    /// Open a library over an existing cache directory.
    pub fn in_dir(remote: FakeRemote, dir: TempDir) -> Self {
        let clock = Arc::new(FixedClock::new(t0()));
        let cache = LocalCache::open(dir.path()).unwrap();
        let library = Library::new(remote.clone(), cache, clock.clone(), StdRng::seed_from_u64(7));
        Self {
            library,
            remote,
            clock,
            dir,
        }
    }

    /// Drop the library and reopen it on the same cache.
    pub fn reopen(self) -> Self {
        Self::in_dir(self.remote, self.dir)
    }
}
