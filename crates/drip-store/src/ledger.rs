//! Per-recipient delivery history.

use std::collections::{BTreeMap, BTreeSet};

use drip_core::RecipientId;
use serde::{Deserialize, Serialize};

static EMPTY: BTreeSet<u32> = BTreeSet::new();

/// Append-only record of which content ids each recipient has received.
///
/// A content id enters a recipient's set only after the transport confirmed
/// delivery, and never leaves it. Serialises 1:1 as the `delivered.json`
/// document (sets render as sorted arrays).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    sets: BTreeMap<RecipientId, BTreeSet<u32>>,
}

impl Ledger {
    /// Make sure `id` has an entry, creating an empty set if needed.
    pub fn ensure(&mut self, id: &RecipientId) {
        self.sets.entry(id.clone()).or_default();
    }

    /// Record a confirmed delivery. Returns `false` if the id was already
    /// present (the selector should have filtered it out).
    pub fn record(&mut self, id: &RecipientId, content_id: u32) -> bool {
        self.sets.entry(id.clone()).or_default().insert(content_id)
    }

    /// The delivered set for `id`; empty when the recipient has no history.
    pub fn delivered(&self, id: &RecipientId) -> &BTreeSet<u32> {
        self.sets.get(id).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, id: &RecipientId, content_id: u32) -> bool {
        self.delivered(id).contains(&content_id)
    }
}
