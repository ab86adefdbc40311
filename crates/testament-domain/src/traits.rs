//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the testament core and its
//! collaborators. Infrastructure implementations live in other crates.

use crate::event::{RecordedEvent, TestamentEvent};
use crate::identity::Address;
use crate::testament::{Testament, TestamentId};

/// Trait for persisting testaments and their event logs
///
/// Implemented by the infrastructure layer (testament-store)
pub trait TestamentStore {
    /// Error type for store operations
    type Error: std::fmt::Display;

    /// Write the testament and append its new events in one atomic step
    ///
    /// Inserts the testament if it is new, overwrites it otherwise. Events
    /// get the next sequence numbers of the testament's log.
    fn save(
        &mut self,
        testament: &Testament,
        events: &[TestamentEvent],
        recorded_at: u64,
    ) -> Result<(), Self::Error>;

    /// Get a testament by ID
    fn get(&self, id: TestamentId) -> Result<Option<Testament>, Self::Error>;

    /// List all testament IDs in creation order
    fn list(&self) -> Result<Vec<TestamentId>, Self::Error>;

    /// Get events of a testament with sequence greater than `after`
    fn events_after(&self, id: TestamentId, after: u64)
        -> Result<Vec<RecordedEvent>, Self::Error>;
}

/// Resolves the authenticated identity behind a request
///
/// The core never verifies signatures; whatever implements this has already
/// done so.
pub trait IdentityProvider {
    /// Error type when no identity can be established
    type Error;

    /// The caller's address
    fn caller(&self) -> Result<Address, Self::Error>;
}

/// Content-addressed storage for document bytes
///
/// The testament only ever holds the hash; heirs fetch bytes from here once
/// the testament hands them the reference.
pub trait ContentStore {
    /// Error type for content operations
    type Error;

    /// Store bytes and return their content reference
    fn put(&mut self, bytes: &[u8]) -> Result<String, Self::Error>;

    /// Fetch bytes by content reference
    fn fetch(&self, document_hash: &str) -> Result<Option<Vec<u8>>, Self::Error>;
}
