//! Testament module - the record and its lifecycle transitions
//!
//! Every transition is a pure function of the record, the caller and the
//! current time. Nothing here reads a clock or touches storage; the registry
//! supplies `now` and persists the result.

use crate::error::TestamentError;
use crate::event::TestamentEvent;
use crate::identity::{Address, Role};
use std::fmt;

/// Unique identifier for a testament based on UUIDv7
///
/// Identifiers sort by creation time, which keeps listings chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TestamentId(u128);

impl TestamentId {
    /// Generate a new UUIDv7-based TestamentId
    ///
    /// # Examples
    ///
    /// ```
    /// use testament_domain::TestamentId;
    ///
    /// let id = TestamentId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a TestamentId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a TestamentId from a UUID string
    pub fn from_string(s: &str) -> Result<Self, TestamentError> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| TestamentError::InvalidArgument(format!("Invalid testament id: {}", e)))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for TestamentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TestamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Lifecycle stage, derived from the record
///
/// Stages only move forward: Alive -> DeathConfirmed -> Unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lifecycle {
    /// No death has been attested
    Alive,

    /// The notary attested the testator's death
    DeathConfirmed,

    /// The heir retrieved the document reference at least once
    Unlocked,
}

impl Lifecycle {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Alive => "alive",
            Lifecycle::DeathConfirmed => "death_confirmed",
            Lifecycle::Unlocked => "unlocked",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A testament: one document reference released to one heir
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Testament {
    /// Unique identifier
    pub id: TestamentId,

    /// Creator; the only identity allowed to reassign heir and notary
    pub owner: Address,

    /// Identity allowed to unlock
    pub heir: Address,

    /// Identity allowed to confirm death
    pub notary: Address,

    /// Opaque content reference handed to the heir on unlock
    pub document_hash: String,

    /// Whether the notary has confirmed death
    pub is_deceased: bool,

    /// Creation time (unix seconds)
    pub created_at: u64,

    /// Waiting period configured at creation
    pub unlock_delay_secs: u64,

    /// Earliest unlock time, `created_at + unlock_delay_secs`
    pub unlock_time: u64,

    /// When death was first confirmed
    pub death_confirmed_at: Option<u64>,

    /// When the heir first unlocked
    pub unlocked_at: Option<u64>,
}

impl Testament {
    /// Create a new testament owned by `owner`
    ///
    /// The unlock time is measured from creation, not from the death
    /// confirmation.
    ///
    /// # Errors
    /// - `InvalidArgument` if the owner is zero, the document hash is blank,
    ///   or the unlock time overflows
    /// - `InvalidRole` if the heir or notary is the zero address
    pub fn create(
        id: TestamentId,
        owner: Address,
        heir: Address,
        notary: Address,
        document_hash: String,
        unlock_delay_secs: u64,
        now: u64,
    ) -> Result<Self, TestamentError> {
        if owner.is_zero() {
            return Err(TestamentError::InvalidArgument(
                "Owner must not be the zero address".to_string(),
            ));
        }
        if heir.is_zero() {
            return Err(TestamentError::InvalidRole { role: Role::Heir });
        }
        if notary.is_zero() {
            return Err(TestamentError::InvalidRole { role: Role::Notary });
        }
        if document_hash.trim().is_empty() {
            return Err(TestamentError::InvalidArgument(
                "Document hash cannot be empty".to_string(),
            ));
        }
        let unlock_time = now.checked_add(unlock_delay_secs).ok_or_else(|| {
            TestamentError::InvalidArgument(format!(
                "Unlock delay {} overflows the unlock time",
                unlock_delay_secs
            ))
        })?;

        Ok(Self {
            id,
            owner,
            heir,
            notary,
            document_hash,
            is_deceased: false,
            created_at: now,
            unlock_delay_secs,
            unlock_time,
            death_confirmed_at: None,
            unlocked_at: None,
        })
    }

    /// Current lifecycle stage
    pub fn lifecycle(&self) -> Lifecycle {
        if self.unlocked_at.is_some() {
            Lifecycle::Unlocked
        } else if self.is_deceased {
            Lifecycle::DeathConfirmed
        } else {
            Lifecycle::Alive
        }
    }

    /// Whether the heir has unlocked at least once
    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    /// Roles held by `address`, in testator / notary / heir order
    pub fn roles_of(&self, address: &Address) -> Vec<Role> {
        let mut roles = Vec::new();
        if self.owner == *address {
            roles.push(Role::Testator);
        }
        if self.notary == *address {
            roles.push(Role::Notary);
        }
        if self.heir == *address {
            roles.push(Role::Heir);
        }
        roles
    }

    /// Event recorded when the testament is created
    pub fn created_event(&self) -> TestamentEvent {
        TestamentEvent::TestamentCreated {
            owner: self.owner,
            heir: self.heir,
            notary: self.notary,
            unlock_time: self.unlock_time,
        }
    }

    /// Notary attests the testator's death
    ///
    /// Returns the event on the first confirmation; later confirmations by
    /// the notary change nothing and return `None`.
    pub fn confirm_death(
        &mut self,
        caller: &Address,
        now: u64,
    ) -> Result<Option<TestamentEvent>, TestamentError> {
        if *caller != self.notary {
            return Err(TestamentError::Unauthorized {
                required: Role::Notary,
            });
        }
        if self.is_deceased {
            return Ok(None);
        }

        self.is_deceased = true;
        self.death_confirmed_at = Some(now);
        Ok(Some(TestamentEvent::DeathConfirmed {
            notary: self.notary,
        }))
    }

    /// Heir retrieves the document reference
    ///
    /// Guards are checked in order: caller is heir, death confirmed, unlock
    /// time reached. Only the first success records an event.
    pub fn unlock(
        &mut self,
        caller: &Address,
        now: u64,
    ) -> Result<(String, Option<TestamentEvent>), TestamentError> {
        if *caller != self.heir {
            return Err(TestamentError::Unauthorized {
                required: Role::Heir,
            });
        }
        if !self.is_deceased {
            return Err(TestamentError::InvalidState {
                current: self.lifecycle(),
                reason: "testator still alive".to_string(),
            });
        }
        if now < self.unlock_time {
            return Err(TestamentError::InvalidState {
                current: self.lifecycle(),
                reason: format!(
                    "waiting period not elapsed (unlock time {}, now {})",
                    self.unlock_time, now
                ),
            });
        }

        if self.unlocked_at.is_some() {
            return Ok((self.document_hash.clone(), None));
        }

        self.unlocked_at = Some(now);
        let event = TestamentEvent::TestamentUnlocked {
            heir: self.heir,
            document_hash: self.document_hash.clone(),
        };
        Ok((self.document_hash.clone(), Some(event)))
    }

    /// Owner reassigns the heir
    pub fn update_heir(
        &mut self,
        new_heir: Address,
        caller: &Address,
    ) -> Result<TestamentEvent, TestamentError> {
        self.require_owner(caller)?;
        require_non_zero(&new_heir, Role::Heir)?;

        let previous = std::mem::replace(&mut self.heir, new_heir);
        Ok(TestamentEvent::HeirUpdated {
            previous,
            new: new_heir,
        })
    }

    /// Owner reassigns the notary
    pub fn update_notary(
        &mut self,
        new_notary: Address,
        caller: &Address,
    ) -> Result<TestamentEvent, TestamentError> {
        self.require_owner(caller)?;
        require_non_zero(&new_notary, Role::Notary)?;

        let previous = std::mem::replace(&mut self.notary, new_notary);
        Ok(TestamentEvent::NotaryUpdated {
            previous,
            new: new_notary,
        })
    }

    fn require_owner(&self, caller: &Address) -> Result<(), TestamentError> {
        if *caller != self.owner {
            return Err(TestamentError::Unauthorized {
                required: Role::Testator,
            });
        }
        Ok(())
    }
}

fn require_non_zero(address: &Address, role: Role) -> Result<(), TestamentError> {
    if address.is_zero() {
        return Err(TestamentError::InvalidArgument(format!(
            "New {} must not be the zero address",
            role
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_DAY: u64 = 24 * 60 * 60;
    const DEPLOYED_AT: u64 = 1_700_000_000;

    fn addr(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::from_bytes(bytes)
    }

    fn fixture() -> Testament {
        Testament::create(
            TestamentId::from_value(1),
            addr(1),
            addr(2),
            addr(3),
            "QmHash123456789".to_string(),
            ONE_DAY,
            DEPLOYED_AT,
        )
        .unwrap()
    }

    #[test]
    fn test_create_sets_roles_and_unlock_time() {
        let t = fixture();
        assert_eq!(t.owner, addr(1));
        assert_eq!(t.heir, addr(2));
        assert_eq!(t.notary, addr(3));
        assert_eq!(t.unlock_time, DEPLOYED_AT + ONE_DAY);
        assert!(!t.is_deceased);
        assert_eq!(t.lifecycle(), Lifecycle::Alive);
    }

    #[test]
    fn test_create_rejects_zero_roles() {
        let heir = Testament::create(
            TestamentId::new(),
            addr(1),
            Address::ZERO,
            addr(3),
            "QmHash".to_string(),
            0,
            0,
        );
        assert_eq!(heir.unwrap_err(), TestamentError::InvalidRole { role: Role::Heir });

        let notary = Testament::create(
            TestamentId::new(),
            addr(1),
            addr(2),
            Address::ZERO,
            "QmHash".to_string(),
            0,
            0,
        );
        assert_eq!(
            notary.unwrap_err(),
            TestamentError::InvalidRole { role: Role::Notary }
        );
    }

    #[test]
    fn test_create_allows_overlapping_roles() {
        let t = Testament::create(
            TestamentId::new(),
            addr(1),
            addr(1),
            addr(1),
            "QmHash".to_string(),
            0,
            0,
        )
        .unwrap();
        assert_eq!(
            t.roles_of(&addr(1)),
            vec![Role::Testator, Role::Notary, Role::Heir]
        );
    }

    #[test]
    fn test_create_rejects_blank_hash_and_overflow() {
        let blank = Testament::create(
            TestamentId::new(),
            addr(1),
            addr(2),
            addr(3),
            "  ".to_string(),
            0,
            0,
        );
        assert!(matches!(blank, Err(TestamentError::InvalidArgument(_))));

        let overflow = Testament::create(
            TestamentId::new(),
            addr(1),
            addr(2),
            addr(3),
            "QmHash".to_string(),
            u64::MAX,
            1,
        );
        assert!(matches!(overflow, Err(TestamentError::InvalidArgument(_))));
    }

    #[test]
    fn test_confirm_death_only_notary() {
        let mut t = fixture();
        for caller in [addr(1), addr(2), addr(9)] {
            assert_eq!(
                t.confirm_death(&caller, DEPLOYED_AT),
                Err(TestamentError::Unauthorized {
                    required: Role::Notary
                })
            );
        }
        assert!(!t.is_deceased);

        let event = t.confirm_death(&addr(3), DEPLOYED_AT + 5).unwrap();
        assert_eq!(event, Some(TestamentEvent::DeathConfirmed { notary: addr(3) }));
        assert!(t.is_deceased);
        assert_eq!(t.death_confirmed_at, Some(DEPLOYED_AT + 5));
    }

    #[test]
    fn test_confirm_death_is_idempotent() {
        let mut t = fixture();
        t.confirm_death(&addr(3), DEPLOYED_AT + 5).unwrap();
        let again = t.confirm_death(&addr(3), DEPLOYED_AT + 50).unwrap();
        assert_eq!(again, None);
        assert_eq!(t.death_confirmed_at, Some(DEPLOYED_AT + 5));
    }

    #[test]
    fn test_unlock_guards_in_order() {
        let mut t = fixture();

        // Wrong caller wins over every other guard
        assert_eq!(
            t.unlock(&addr(9), DEPLOYED_AT).unwrap_err(),
            TestamentError::Unauthorized {
                required: Role::Heir
            }
        );

        let alive = t.unlock(&addr(2), DEPLOYED_AT + 10 * ONE_DAY).unwrap_err();
        assert!(matches!(
            alive,
            TestamentError::InvalidState {
                current: Lifecycle::Alive,
                ..
            }
        ));

        t.confirm_death(&addr(3), DEPLOYED_AT).unwrap();
        let early = t.unlock(&addr(2), DEPLOYED_AT + ONE_DAY - 1).unwrap_err();
        assert!(matches!(
            early,
            TestamentError::InvalidState {
                current: Lifecycle::DeathConfirmed,
                ..
            }
        ));
        assert!(!t.is_unlocked());
    }

    #[test]
    fn test_unlock_measured_from_creation() {
        let mut t = fixture();
        // Death confirmed long after creation; the delay has already elapsed.
        t.confirm_death(&addr(3), DEPLOYED_AT + 2 * ONE_DAY).unwrap();
        let (hash, event) = t.unlock(&addr(2), DEPLOYED_AT + 2 * ONE_DAY).unwrap();
        assert_eq!(hash, "QmHash123456789");
        assert!(event.is_some());
    }

    #[test]
    fn test_repeat_unlock_returns_hash_without_event() {
        let mut t = fixture();
        t.confirm_death(&addr(3), DEPLOYED_AT).unwrap();
        let (_, first) = t.unlock(&addr(2), DEPLOYED_AT + ONE_DAY).unwrap();
        assert_eq!(
            first,
            Some(TestamentEvent::TestamentUnlocked {
                heir: addr(2),
                document_hash: "QmHash123456789".to_string(),
            })
        );

        let (hash, second) = t.unlock(&addr(2), DEPLOYED_AT + 3 * ONE_DAY).unwrap();
        assert_eq!(hash, "QmHash123456789");
        assert_eq!(second, None);
        assert_eq!(t.unlocked_at, Some(DEPLOYED_AT + ONE_DAY));
        assert_eq!(t.lifecycle(), Lifecycle::Unlocked);
    }

    #[test]
    fn test_updates_require_owner() {
        let mut t = fixture();
        let before = t.clone();

        assert_eq!(
            t.update_heir(addr(9), &addr(2)).unwrap_err(),
            TestamentError::Unauthorized {
                required: Role::Testator
            }
        );
        assert_eq!(
            t.update_notary(addr(9), &addr(3)).unwrap_err(),
            TestamentError::Unauthorized {
                required: Role::Testator
            }
        );
        assert_eq!(t, before);
    }

    #[test]
    fn test_updates_reject_zero_address() {
        let mut t = fixture();
        assert!(matches!(
            t.update_heir(Address::ZERO, &addr(1)),
            Err(TestamentError::InvalidArgument(_))
        ));
        assert!(matches!(
            t.update_notary(Address::ZERO, &addr(1)),
            Err(TestamentError::InvalidArgument(_))
        ));
        assert_eq!(t.heir, addr(2));
        assert_eq!(t.notary, addr(3));
    }

    #[test]
    fn test_updates_allowed_after_unlock() {
        let mut t = fixture();
        t.confirm_death(&addr(3), DEPLOYED_AT).unwrap();
        t.unlock(&addr(2), DEPLOYED_AT + ONE_DAY).unwrap();

        let event = t.update_heir(addr(9), &addr(1)).unwrap();
        assert_eq!(
            event,
            TestamentEvent::HeirUpdated {
                previous: addr(2),
                new: addr(9)
            }
        );
        assert_eq!(t.heir, addr(9));
    }

    #[test]
    fn test_testament_id_display_and_parse() {
        let id = TestamentId::new();
        let parsed = TestamentId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(TestamentId::from_string("not-a-uuid").is_err());
    }
}
