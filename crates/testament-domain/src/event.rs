//! Domain events - the append-only audit trail of every testament
//!
//! Each state change appends one event to its testament's log. Observers read
//! the log independently: each keeps its own sequence cursor and resumes with
//! `events_after`, so no observer can consume events away from another.

use crate::identity::Address;
use crate::testament::TestamentId;

/// A state change on a testament
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestamentEvent {
    /// Testament created
    TestamentCreated {
        /// Creator
        owner: Address,
        /// Initial heir
        heir: Address,
        /// Initial notary
        notary: Address,
        /// Earliest unlock time
        unlock_time: u64,
    },

    /// Notary confirmed the testator's death
    DeathConfirmed {
        /// Confirming notary
        notary: Address,
    },

    /// Heir unlocked the testament for the first time
    TestamentUnlocked {
        /// Unlocking heir
        heir: Address,
        /// Released document reference
        document_hash: String,
    },

    /// Owner reassigned the heir
    HeirUpdated {
        /// Heir before the change
        previous: Address,
        /// Heir after the change
        new: Address,
    },

    /// Owner reassigned the notary
    NotaryUpdated {
        /// Notary before the change
        previous: Address,
        /// Notary after the change
        new: Address,
    },
}

impl TestamentEvent {
    /// Event name as stored and displayed
    pub fn name(&self) -> &'static str {
        match self {
            TestamentEvent::TestamentCreated { .. } => "TestamentCreated",
            TestamentEvent::DeathConfirmed { .. } => "DeathConfirmed",
            TestamentEvent::TestamentUnlocked { .. } => "TestamentUnlocked",
            TestamentEvent::HeirUpdated { .. } => "HeirUpdated",
            TestamentEvent::NotaryUpdated { .. } => "NotaryUpdated",
        }
    }
}

/// An event as it sits in a testament's log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Testament the event belongs to
    pub testament_id: TestamentId,

    /// Position in the testament's log, starting at 1
    pub sequence: u64,

    /// Time the event was recorded (unix seconds)
    pub recorded_at: u64,

    /// The event itself
    pub event: TestamentEvent,
}

/// A finite, ordered view over part of a testament's event log
///
/// Produced by the registry; yields events in sequence order and ends at the
/// last event recorded when it was produced.
#[derive(Debug, Clone)]
pub struct EventStream {
    events: std::vec::IntoIter<RecordedEvent>,
}

impl EventStream {
    /// Wrap events already sorted by sequence
    pub fn new(events: Vec<RecordedEvent>) -> Self {
        Self {
            events: events.into_iter(),
        }
    }
}

impl Iterator for EventStream {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.events.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.events.size_hint()
    }
}

impl ExactSizeIterator for EventStream {}
