//! Server-side version vectors for the in-memory store.
//!
//! Clients never look inside these: the store serializes them into the
//! opaque [`VClock`] bytes it hands out, and parses them back when a write
//! or delete submits one.

use qrc_core::{Encoding, VClock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A version vector tracking the highest counter seen per actor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionVector {
    entries: BTreeMap<String, u64>,
}

impl VersionVector {
    /// An empty vector, dominated by everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the counter for an actor.
    pub fn get(&self, actor: &str) -> u64 {
        self.entries.get(actor).copied().unwrap_or(0)
    }

    /// Set the counter for an actor. Zero counters are not stored.
    pub fn set(&mut self, actor: impl Into<String>, counter: u64) {
        if counter > 0 {
            self.entries.insert(actor.into(), counter);
        }
    }

    /// True if for every actor, self[a] >= other[a].
    pub fn dominates(&self, other: &VersionVector) -> bool {
        other
            .entries
            .iter()
            .all(|(actor, &counter)| self.get(actor) >= counter)
    }

    /// Component-wise max.
    pub fn merge(&mut self, other: &VersionVector) {
        for (actor, &counter) in &other.entries {
            let current = self.entries.entry(actor.clone()).or_insert(0);
            *current = (*current).max(counter);
        }
    }

    /// Merge into a copy.
    pub fn merged_with(&self, other: &VersionVector) -> VersionVector {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// The opaque token form handed to clients.
    pub fn to_vclock(&self) -> Result<VClock, String> {
        let bytes = serde_json::to_vec(&self.entries).map_err(|e| e.to_string())?;
        VClock::decode_with(bytes, Encoding::Binary).map_err(|e| e.to_string())
    }

    /// Parse a token this store handed out earlier.
    pub fn from_vclock(vclock: &VClock) -> Result<Self, String> {
        serde_json::from_slice(vclock.as_bytes())
            .map(|entries| VersionVector { entries })
            .map_err(|e| format!("unrecognized vector clock {}: {}", vclock, e))
    }
}
