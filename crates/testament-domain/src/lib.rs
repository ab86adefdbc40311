//! Testament Domain Layer
//!
//! This crate contains the core of the testament system: a document-release
//! authorization with three roles and a time-locked, monotonic lifecycle.
//! Storage, transport and identity verification live in other crates and
//! meet this one through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Testament**: one document reference, one owner, one heir, one notary
//! - **Lifecycle**: alive → death confirmed → unlocked, never backwards
//! - **Unlock time**: creation time plus the configured delay
//! - **Events**: an append-only log per testament, read with independent cursors
//!
//! ## Architecture
//!
//! - Transitions are pure functions on [`Testament`]
//! - [`TestamentRegistry`] adds identity, time and persistence around them
//! - The clock is injected so the time-lock can be tested deterministically

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod error;
pub mod event;
pub mod identity;
pub mod memory;
pub mod registry;
pub mod testament;
pub mod traits;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::TestamentError;
pub use event::{EventStream, RecordedEvent, TestamentEvent};
pub use identity::{Address, Role};
pub use memory::{InMemoryContentStore, InMemoryStore};
pub use registry::TestamentRegistry;
pub use testament::{Lifecycle, Testament, TestamentId};
