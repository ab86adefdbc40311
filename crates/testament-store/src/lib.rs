//! Testament Storage Layer
//!
//! Implements the TestamentStore trait on SQLite.
//!
//! # Architecture
//!
//! - One row per testament, overwritten on every state change
//! - An append-only `events` table holding each testament's log
//! - A state change and its events commit in one transaction
//!
//! # Examples
//!
//! ```no_run
//! use testament_store::SqliteStore;
//!
//! let store = SqliteStore::new("testaments.db").unwrap();
//! // Store is now ready to back a TestamentRegistry
//! ```

#![warn(missing_docs)]

mod events;

pub use events::payload;

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use testament_domain::traits::TestamentStore;
use testament_domain::{Address, RecordedEvent, Testament, TestamentEvent, TestamentId};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Event payload could not be parsed
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of TestamentStore
///
/// # Thread Safety
///
/// SQLite connections are `Send` but not `Sync`. Share a store between
/// threads behind a `Mutex`, or give each thread its own SqliteStore.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Convert TestamentId to bytes for storage
    fn id_to_bytes(id: TestamentId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to TestamentId
    fn bytes_to_id(bytes: &[u8]) -> Result<TestamentId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for TestamentId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(TestamentId::from_value(u128::from_be_bytes(arr)))
    }

    fn row_to_testament(row: &Row<'_>) -> rusqlite::Result<Testament> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_id(&id_bytes).map_err(|e| conversion_error(0, e))?;

        Ok(Testament {
            id,
            owner: address_column(row, 1)?,
            heir: address_column(row, 2)?,
            notary: address_column(row, 3)?,
            document_hash: row.get(4)?,
            is_deceased: row.get(5)?,
            created_at: row.get::<_, i64>(6)? as u64,
            unlock_delay_secs: row.get::<_, i64>(7)? as u64,
            unlock_time: row.get::<_, i64>(8)? as u64,
            death_confirmed_at: row.get::<_, Option<i64>>(9)?.map(|t| t as u64),
            unlocked_at: row.get::<_, Option<i64>>(10)?.map(|t| t as u64),
        })
    }
}

fn conversion_error<E>(column: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

fn address_column(row: &Row<'_>, column: usize) -> rusqlite::Result<Address> {
    let text: String = row.get(column)?;
    Address::parse(&text).map_err(|e| conversion_error(column, e))
}

impl TestamentStore for SqliteStore {
    type Error = StoreError;

    fn save(
        &mut self,
        testament: &Testament,
        events: &[TestamentEvent],
        recorded_at: u64,
    ) -> Result<(), Self::Error> {
        let id_bytes = Self::id_to_bytes(testament.id);
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO testaments (id, owner, heir, notary, document_hash, is_deceased,
                created_at, unlock_delay_secs, unlock_time, death_confirmed_at, unlocked_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                heir = excluded.heir,
                notary = excluded.notary,
                is_deceased = excluded.is_deceased,
                death_confirmed_at = excluded.death_confirmed_at,
                unlocked_at = excluded.unlocked_at",
            params![
                &id_bytes,
                testament.owner.to_string(),
                testament.heir.to_string(),
                testament.notary.to_string(),
                &testament.document_hash,
                testament.is_deceased,
                testament.created_at as i64,
                testament.unlock_delay_secs as i64,
                testament.unlock_time as i64,
                testament.death_confirmed_at.map(|t| t as i64),
                testament.unlocked_at.map(|t| t as i64),
            ],
        )?;

        if !events.is_empty() {
            let last: i64 = tx.query_row(
                "SELECT COALESCE(MAX(sequence), 0) FROM events WHERE testament_id = ?1",
                params![&id_bytes],
                |row| row.get(0),
            )?;

            for (offset, event) in events.iter().enumerate() {
                let (kind, payload) = events::encode(event);
                tx.execute(
                    "INSERT INTO events (testament_id, sequence, recorded_at, kind, payload)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        &id_bytes,
                        last + offset as i64 + 1,
                        recorded_at as i64,
                        kind,
                        payload,
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn get(&self, id: TestamentId) -> Result<Option<Testament>, Self::Error> {
        let id_bytes = Self::id_to_bytes(id);

        let testament = self
            .conn
            .query_row(
                "SELECT id, owner, heir, notary, document_hash, is_deceased, created_at,
                    unlock_delay_secs, unlock_time, death_confirmed_at, unlocked_at
                 FROM testaments WHERE id = ?1",
                params![&id_bytes],
                Self::row_to_testament,
            )
            .optional()?;

        Ok(testament)
    }

    fn list(&self) -> Result<Vec<TestamentId>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM testaments ORDER BY created_at, id")?;

        let ids = stmt
            .query_map([], |row| {
                let bytes: Vec<u8> = row.get(0)?;
                Self::bytes_to_id(&bytes).map_err(|e| conversion_error(0, e))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ids)
    }

    fn events_after(
        &self,
        id: TestamentId,
        after: u64,
    ) -> Result<Vec<RecordedEvent>, Self::Error> {
        // Sequences are stored as i64; no log reaches past i64::MAX
        let Ok(after) = i64::try_from(after) else {
            return Ok(Vec::new());
        };
        let id_bytes = Self::id_to_bytes(id);

        let mut stmt = self.conn.prepare(
            "SELECT sequence, recorded_at, kind, payload
             FROM events WHERE testament_id = ?1 AND sequence > ?2
             ORDER BY sequence",
        )?;

        let rows = stmt
            .query_map(params![&id_bytes, after], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(sequence, recorded_at, kind, payload)| {
                Ok(RecordedEvent {
                    testament_id: id,
                    sequence: sequence as u64,
                    recorded_at: recorded_at as u64,
                    event: events::decode(&kind, &payload)?,
                })
            })
            .collect()
    }
}
