//! TestamentRegistry - commands and queries over persisted testaments
//!
//! Commands take `&mut self`, so a registry value is its own single writer;
//! callers that share one across threads wrap it in a lock. Every command
//! loads the record, applies one transition, and saves the record together
//! with its events in a single store call.

use crate::clock::Clock;
use crate::error::TestamentError;
use crate::event::{EventStream, RecordedEvent, TestamentEvent};
use crate::identity::{Address, Role};
use crate::testament::{Lifecycle, Testament, TestamentId};
use crate::traits::TestamentStore;
use tracing::{debug, info, warn};

/// Registry of testaments
pub struct TestamentRegistry<S, C> {
    store: S,
    clock: C,
}

impl<S, C> TestamentRegistry<S, C>
where
    S: TestamentStore,
    C: Clock,
{
    /// Create a registry over a store and a time source
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Current time according to the registry's clock
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Create a testament; the caller becomes its owner
    ///
    /// # Examples
    ///
    /// ```
    /// use testament_domain::{Address, InMemoryStore, ManualClock, TestamentRegistry};
    ///
    /// let clock = ManualClock::new(1_000);
    /// let mut registry = TestamentRegistry::new(InMemoryStore::new(), clock.clone());
    ///
    /// let owner = Address::parse("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap();
    /// let heir = Address::parse("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap();
    /// let notary = Address::parse("0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc").unwrap();
    ///
    /// let id = registry
    ///     .create(heir, notary, "QmHash123456789".to_string(), 86_400, owner)
    ///     .unwrap();
    /// registry.confirm_death(id, notary).unwrap();
    ///
    /// clock.advance(86_400);
    /// assert_eq!(registry.unlock_testament(id, heir).unwrap(), "QmHash123456789");
    /// ```
    pub fn create(
        &mut self,
        heir: Address,
        notary: Address,
        document_hash: String,
        unlock_delay_secs: u64,
        caller: Address,
    ) -> Result<TestamentId, TestamentError> {
        let now = self.clock.now();
        let testament = Testament::create(
            TestamentId::new(),
            caller,
            heir,
            notary,
            document_hash,
            unlock_delay_secs,
            now,
        )
        .inspect_err(|e| warn!(owner = %caller, error = %e, "Rejected testament creation"))?;

        self.persist(&testament, &[testament.created_event()], now)?;
        info!(
            id = %testament.id,
            owner = %testament.owner,
            unlock_time = testament.unlock_time,
            "Testament created"
        );
        Ok(testament.id)
    }

    /// Notary confirms the testator's death
    ///
    /// Repeated confirmations by the notary succeed without changing anything.
    pub fn confirm_death(
        &mut self,
        id: TestamentId,
        caller: Address,
    ) -> Result<(), TestamentError> {
        let now = self.clock.now();
        let mut testament = self.load(id)?;

        match testament.confirm_death(&caller, now) {
            Ok(Some(event)) => {
                self.persist(&testament, &[event], now)?;
                info!(id = %id, notary = %caller, "Death confirmed");
                Ok(())
            }
            Ok(None) => {
                debug!(id = %id, "Death already confirmed");
                Ok(())
            }
            Err(e) => {
                warn!(id = %id, caller = %caller, error = %e, "Rejected death confirmation");
                Err(e)
            }
        }
    }

    /// Heir unlocks the testament and receives the document hash
    pub fn unlock_testament(
        &mut self,
        id: TestamentId,
        caller: Address,
    ) -> Result<String, TestamentError> {
        let now = self.clock.now();
        let mut testament = self.load(id)?;

        let (document_hash, event) = testament
            .unlock(&caller, now)
            .inspect_err(|e| warn!(id = %id, caller = %caller, error = %e, "Rejected unlock"))?;

        if let Some(event) = event {
            self.persist(&testament, &[event], now)?;
            info!(id = %id, heir = %caller, "Testament unlocked");
        }
        Ok(document_hash)
    }

    /// Owner reassigns the heir
    pub fn update_heir(
        &mut self,
        id: TestamentId,
        new_heir: Address,
        caller: Address,
    ) -> Result<(), TestamentError> {
        self.update_role(id, caller, |t| t.update_heir(new_heir, &caller))
    }

    /// Owner reassigns the notary
    pub fn update_notary(
        &mut self,
        id: TestamentId,
        new_notary: Address,
        caller: Address,
    ) -> Result<(), TestamentError> {
        self.update_role(id, caller, |t| t.update_notary(new_notary, &caller))
    }

    fn update_role<F>(
        &mut self,
        id: TestamentId,
        caller: Address,
        apply: F,
    ) -> Result<(), TestamentError>
    where
        F: FnOnce(&mut Testament) -> Result<TestamentEvent, TestamentError>,
    {
        let now = self.clock.now();
        let mut testament = self.load(id)?;

        let event = apply(&mut testament).inspect_err(
            |e| warn!(id = %id, caller = %caller, error = %e, "Rejected role update"),
        )?;
        info!(id = %id, event = event.name(), "Role updated");
        self.persist(&testament, &[event], now)
    }

    /// Full snapshot of a testament
    pub fn testament(&self, id: TestamentId) -> Result<Testament, TestamentError> {
        self.load(id)
    }

    /// Owner (testator) of a testament
    pub fn owner(&self, id: TestamentId) -> Result<Address, TestamentError> {
        Ok(self.load(id)?.owner)
    }

    /// Current heir
    pub fn heir(&self, id: TestamentId) -> Result<Address, TestamentError> {
        Ok(self.load(id)?.heir)
    }

    /// Current notary
    pub fn notary(&self, id: TestamentId) -> Result<Address, TestamentError> {
        Ok(self.load(id)?.notary)
    }

    /// Whether death has been confirmed
    pub fn is_deceased(&self, id: TestamentId) -> Result<bool, TestamentError> {
        Ok(self.load(id)?.is_deceased)
    }

    /// Earliest time the heir may unlock
    pub fn unlock_time(&self, id: TestamentId) -> Result<u64, TestamentError> {
        Ok(self.load(id)?.unlock_time)
    }

    /// Document reference; readable by anyone, only the bytes are gated
    pub fn document_hash(&self, id: TestamentId) -> Result<String, TestamentError> {
        Ok(self.load(id)?.document_hash)
    }

    /// Current lifecycle stage
    pub fn lifecycle(&self, id: TestamentId) -> Result<Lifecycle, TestamentError> {
        Ok(self.load(id)?.lifecycle())
    }

    /// Roles `address` holds on a testament
    pub fn roles_of(&self, id: TestamentId, address: &Address) -> Result<Vec<Role>, TestamentError> {
        Ok(self.load(id)?.roles_of(address))
    }

    /// All testament IDs
    pub fn list(&self) -> Result<Vec<TestamentId>, TestamentError> {
        self.store.list().map_err(store_error)
    }

    /// The whole event log of a testament
    pub fn events(&self, id: TestamentId) -> Result<EventStream, TestamentError> {
        self.events_after(id, 0)
    }

    /// Events recorded after sequence number `after`
    ///
    /// An observer passes the last sequence it has seen to pick up where it
    /// left off.
    pub fn events_after(&self, id: TestamentId, after: u64) -> Result<EventStream, TestamentError> {
        // Distinguish an unknown testament from an empty tail
        self.load(id)?;
        let events: Vec<RecordedEvent> = self.store.events_after(id, after).map_err(store_error)?;
        Ok(EventStream::new(events))
    }

    fn load(&self, id: TestamentId) -> Result<Testament, TestamentError> {
        self.store
            .get(id)
            .map_err(store_error)?
            .ok_or(TestamentError::NotFound(id))
    }

    fn persist(
        &mut self,
        testament: &Testament,
        events: &[TestamentEvent],
        now: u64,
    ) -> Result<(), TestamentError> {
        self.store.save(testament, events, now).map_err(store_error)
    }
}

fn store_error<E: std::fmt::Display>(e: E) -> TestamentError {
    TestamentError::Store(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::memory::{InMemoryContentStore, InMemoryStore};
    use crate::traits::ContentStore;

    const ONE_DAY_IN_SECS: u64 = 24 * 60 * 60;
    const DEPLOYED_AT: u64 = 1_735_689_600;

    struct Fixture {
        registry: TestamentRegistry<InMemoryStore, ManualClock>,
        clock: ManualClock,
        id: TestamentId,
        owner: Address,
        heir: Address,
        notary: Address,
        other_account: Address,
        unlock_time: u64,
    }

    fn account(hex: &str) -> Address {
        Address::parse(hex).unwrap()
    }

    fn deploy_testament_fixture() -> Fixture {
        let clock = ManualClock::new(DEPLOYED_AT);
        let mut registry = TestamentRegistry::new(InMemoryStore::new(), clock.clone());

        let owner = account("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        let heir = account("0x70997970c51812dc3a010c7d01b50e0d17dc79c8");
        let notary = account("0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc");
        let other_account = account("0x90f79bf6eb2c4f870365e785982e1f101e93b906");

        let id = registry
            .create(
                heir,
                notary,
                "QmHash123456789".to_string(),
                ONE_DAY_IN_SECS,
                owner,
            )
            .unwrap();

        Fixture {
            registry,
            clock,
            id,
            owner,
            heir,
            notary,
            other_account,
            unlock_time: DEPLOYED_AT + ONE_DAY_IN_SECS,
        }
    }

    #[test]
    fn test_deployment_sets_roles() {
        let f = deploy_testament_fixture();
        assert_eq!(f.registry.owner(f.id).unwrap(), f.owner);
        assert_eq!(f.registry.heir(f.id).unwrap(), f.heir);
        assert_eq!(f.registry.notary(f.id).unwrap(), f.notary);
        assert_eq!(f.registry.unlock_time(f.id).unwrap(), f.unlock_time);
        assert_eq!(f.registry.document_hash(f.id).unwrap(), "QmHash123456789");
        assert!(!f.registry.is_deceased(f.id).unwrap());
    }

    #[test]
    fn test_deployment_emits_created_event() {
        let f = deploy_testament_fixture();
        let events: Vec<_> = f.registry.events(f.id).unwrap().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].event,
            TestamentEvent::TestamentCreated {
                owner: f.owner,
                heir: f.heir,
                notary: f.notary,
                unlock_time: f.unlock_time,
            }
        );
    }

    #[test]
    fn test_create_rejects_zero_heir_without_writing() {
        let mut f = deploy_testament_fixture();
        let result = f
            .registry
            .create(Address::ZERO, f.notary, "QmHash".to_string(), 0, f.owner);
        assert_eq!(result, Err(TestamentError::InvalidRole { role: Role::Heir }));
        assert_eq!(f.registry.list().unwrap(), vec![f.id]);
    }

    #[test]
    fn test_only_notary_confirms_death() {
        let mut f = deploy_testament_fixture();

        for caller in [f.owner, f.heir] {
            assert_eq!(
                f.registry.confirm_death(f.id, caller),
                Err(TestamentError::Unauthorized {
                    required: Role::Notary
                })
            );
        }

        f.registry.confirm_death(f.id, f.notary).unwrap();
        assert!(f.registry.is_deceased(f.id).unwrap());

        let last = f.registry.events(f.id).unwrap().last().unwrap();
        assert_eq!(last.event, TestamentEvent::DeathConfirmed { notary: f.notary });
    }

    #[test]
    fn test_repeated_confirmation_records_one_event() {
        let mut f = deploy_testament_fixture();
        f.registry.confirm_death(f.id, f.notary).unwrap();
        f.clock.advance(60);
        f.registry.confirm_death(f.id, f.notary).unwrap();

        let confirmations = f
            .registry
            .events(f.id)
            .unwrap()
            .filter(|e| matches!(e.event, TestamentEvent::DeathConfirmed { .. }))
            .count();
        assert_eq!(confirmations, 1);
        assert_eq!(
            f.registry.testament(f.id).unwrap().death_confirmed_at,
            Some(DEPLOYED_AT)
        );
    }

    #[test]
    fn test_heir_unlocks_after_unlock_period() {
        let mut f = deploy_testament_fixture();
        f.registry.confirm_death(f.id, f.notary).unwrap();
        f.clock.set(f.unlock_time);

        let hash = f.registry.unlock_testament(f.id, f.heir).unwrap();
        assert_eq!(hash, "QmHash123456789");

        let last = f.registry.events(f.id).unwrap().last().unwrap();
        assert_eq!(
            last.event,
            TestamentEvent::TestamentUnlocked {
                heir: f.heir,
                document_hash: "QmHash123456789".to_string(),
            }
        );
        assert_eq!(f.registry.lifecycle(f.id).unwrap(), Lifecycle::Unlocked);

        // A repeat call hands back the same hash and logs nothing new
        assert_eq!(
            f.registry.unlock_testament(f.id, f.heir).unwrap(),
            "QmHash123456789"
        );
        assert_eq!(f.registry.events(f.id).unwrap().len(), 3);
    }

    #[test]
    fn test_unlock_rejected_while_alive() {
        let mut f = deploy_testament_fixture();
        f.clock.set(f.unlock_time + 365 * ONE_DAY_IN_SECS);

        let err = f.registry.unlock_testament(f.id, f.heir).unwrap_err();
        assert!(matches!(
            err,
            TestamentError::InvalidState {
                current: Lifecycle::Alive,
                ..
            }
        ));
    }

    #[test]
    fn test_unlock_rejected_one_second_early() {
        let mut f = deploy_testament_fixture();
        f.registry.confirm_death(f.id, f.notary).unwrap();
        f.clock.set(f.unlock_time - 1);

        let err = f.registry.unlock_testament(f.id, f.heir).unwrap_err();
        assert!(matches!(err, TestamentError::InvalidState { .. }));
        assert_eq!(f.registry.lifecycle(f.id).unwrap(), Lifecycle::DeathConfirmed);
    }

    #[test]
    fn test_unlock_rejected_for_non_heir() {
        let mut f = deploy_testament_fixture();
        f.registry.confirm_death(f.id, f.notary).unwrap();
        f.clock.set(f.unlock_time);

        assert_eq!(
            f.registry.unlock_testament(f.id, f.other_account),
            Err(TestamentError::Unauthorized {
                required: Role::Heir
            })
        );
    }

    #[test]
    fn test_owner_updates_heir_and_notary() {
        let mut f = deploy_testament_fixture();

        f.registry
            .update_heir(f.id, f.other_account, f.owner)
            .unwrap();
        assert_eq!(f.registry.heir(f.id).unwrap(), f.other_account);

        f.registry
            .update_notary(f.id, f.other_account, f.owner)
            .unwrap();
        assert_eq!(f.registry.notary(f.id).unwrap(), f.other_account);
    }

    #[test]
    fn test_non_owner_updates_rejected() {
        let mut f = deploy_testament_fixture();

        assert_eq!(
            f.registry.update_heir(f.id, f.other_account, f.heir),
            Err(TestamentError::Unauthorized {
                required: Role::Testator
            })
        );
        assert_eq!(
            f.registry.update_notary(f.id, f.other_account, f.notary),
            Err(TestamentError::Unauthorized {
                required: Role::Testator
            })
        );

        assert_eq!(f.registry.heir(f.id).unwrap(), f.heir);
        assert_eq!(f.registry.notary(f.id).unwrap(), f.notary);
        assert_eq!(f.registry.events(f.id).unwrap().len(), 1);
    }

    #[test]
    fn test_reassigned_heir_takes_over_immediately() {
        let mut f = deploy_testament_fixture();
        f.registry.confirm_death(f.id, f.notary).unwrap();
        f.registry
            .update_heir(f.id, f.other_account, f.owner)
            .unwrap();
        f.clock.set(f.unlock_time);

        assert_eq!(
            f.registry.unlock_testament(f.id, f.heir),
            Err(TestamentError::Unauthorized {
                required: Role::Heir
            })
        );
        assert_eq!(
            f.registry.unlock_testament(f.id, f.other_account).unwrap(),
            "QmHash123456789"
        );
    }

    #[test]
    fn test_reassigned_notary_takes_over_immediately() {
        let mut f = deploy_testament_fixture();
        f.registry
            .update_notary(f.id, f.other_account, f.owner)
            .unwrap();

        assert!(f.registry.confirm_death(f.id, f.notary).is_err());
        f.registry.confirm_death(f.id, f.other_account).unwrap();
        assert!(f.registry.is_deceased(f.id).unwrap());
    }

    #[test]
    fn test_roles_of() {
        let f = deploy_testament_fixture();
        assert_eq!(f.registry.roles_of(f.id, &f.owner).unwrap(), vec![Role::Testator]);
        assert_eq!(f.registry.roles_of(f.id, &f.heir).unwrap(), vec![Role::Heir]);
        assert!(f.registry.roles_of(f.id, &f.other_account).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_testament() {
        let mut f = deploy_testament_fixture();
        let missing = TestamentId::from_value(42);

        assert_eq!(
            f.registry.heir(missing),
            Err(TestamentError::NotFound(missing))
        );
        assert_eq!(
            f.registry.confirm_death(missing, f.notary),
            Err(TestamentError::NotFound(missing))
        );
        assert!(f.registry.events(missing).is_err());
    }

    #[test]
    fn test_independent_event_cursors() {
        let mut f = deploy_testament_fixture();
        f.registry.confirm_death(f.id, f.notary).unwrap();

        let first_observer: Vec<_> = f.registry.events(f.id).unwrap().collect();
        let cursor = first_observer.last().unwrap().sequence;

        f.clock.set(f.unlock_time);
        f.registry.unlock_testament(f.id, f.heir).unwrap();

        // A second observer still sees the whole log
        assert_eq!(f.registry.events(f.id).unwrap().len(), 3);

        let resumed: Vec<_> = f.registry.events_after(f.id, cursor).unwrap().collect();
        assert_eq!(resumed.len(), 1);
        assert_eq!(resumed[0].sequence, 3);
        assert_eq!(resumed[0].recorded_at, f.unlock_time);
    }

    #[test]
    fn test_heir_fetches_document_with_released_hash() {
        let mut content = InMemoryContentStore::new();
        let hash = content.put(b"I leave everything to my cat").unwrap();

        let clock = ManualClock::new(DEPLOYED_AT);
        let mut registry = TestamentRegistry::new(InMemoryStore::new(), clock.clone());
        let owner = account("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        let heir = account("0x70997970c51812dc3a010c7d01b50e0d17dc79c8");
        let notary = account("0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc");

        let id = registry.create(heir, notary, hash, 20, owner).unwrap();
        registry.confirm_death(id, notary).unwrap();
        clock.advance(20);

        let released = registry.unlock_testament(id, heir).unwrap();
        assert_eq!(
            content.fetch(&released).unwrap(),
            Some(b"I leave everything to my cat".to_vec())
        );
    }
}
