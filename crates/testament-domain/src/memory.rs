//! In-memory collaborators for tests and ephemeral registries

use crate::event::{RecordedEvent, TestamentEvent};
use crate::testament::{Testament, TestamentId};
use crate::traits::{ContentStore, TestamentStore};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

/// Volatile TestamentStore backed by maps
///
/// Nothing survives the process; use the SQLite store for that.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    testaments: BTreeMap<TestamentId, Testament>,
    events: HashMap<TestamentId, Vec<RecordedEvent>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl TestamentStore for InMemoryStore {
    type Error = Infallible;

    fn save(
        &mut self,
        testament: &Testament,
        events: &[TestamentEvent],
        recorded_at: u64,
    ) -> Result<(), Self::Error> {
        self.testaments.insert(testament.id, testament.clone());

        let log = self.events.entry(testament.id).or_default();
        for event in events {
            let sequence = log.len() as u64 + 1;
            log.push(RecordedEvent {
                testament_id: testament.id,
                sequence,
                recorded_at,
                event: event.clone(),
            });
        }
        Ok(())
    }

    fn get(&self, id: TestamentId) -> Result<Option<Testament>, Self::Error> {
        Ok(self.testaments.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<TestamentId>, Self::Error> {
        Ok(self.testaments.keys().copied().collect())
    }

    fn events_after(
        &self,
        id: TestamentId,
        after: u64,
    ) -> Result<Vec<RecordedEvent>, Self::Error> {
        Ok(self
            .events
            .get(&id)
            .map(|log| {
                log.iter()
                    .filter(|e| e.sequence > after)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Volatile content store keyed by SHA-256 hex digest
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl InMemoryContentStore {
    /// Create an empty content store
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentStore for InMemoryContentStore {
    type Error = Infallible;

    fn put(&mut self, bytes: &[u8]) -> Result<String, Self::Error> {
        let digest = Sha256::digest(bytes);
        let hash = hex::encode(digest);
        self.blobs.insert(hash.clone(), bytes.to_vec());
        Ok(hash)
    }

    fn fetch(&self, document_hash: &str) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.blobs.get(document_hash).cloned())
    }
}
