//! Reconciliation of the local cache with the remote record set.

use std::collections::HashSet;

use crate::types::{Card, Paraphrase};

/// Records with a stable identity.
pub trait Identified {
    fn id(&self) -> i64;
}

impl Identified for Card {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Paraphrase {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Merge two collections by identity, remote first.
///
/// Every remote record is kept as-is. Local records are appended in their
/// original order when their id is absent from `remote`; local copies of
/// remote records are discarded whole.
pub fn merge<T: Identified>(remote: Vec<T>, local: Vec<T>) -> Vec<T> {
    let remote_ids: HashSet<i64> = remote.iter().map(Identified::id).collect();

    let mut merged = remote;
    merged.extend(local.into_iter().filter(|item| !remote_ids.contains(&item.id())));
    merged
}
