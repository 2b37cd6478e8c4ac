//! In-memory [`EntityStore`] used by the CLI catalogue and by tests.
//!
//! Names written inside a transaction are staged and only become visible
//! when the transaction commits. The store enforces its own naming rules on
//! every write, independently of the engine's validation: names must not be
//! blank, must avoid the reserved characters, and must be unique within their
//! group once staged names are taken into account.
//!
//! Uniqueness is checked one write at a time against the names the group
//! holds at that moment. A swap (`A` to `B` while `B` becomes `A`) is
//! consistent once the batch commits, but each write meets the other's
//! current name, so the store refuses both as invalid names.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::store::{
    EntityId, EntityStore, GroupingKey, Ownership, StoreEntity, StoreError, StoreRejection,
    TransactionHandle,
};
use crate::validation::reserved_characters_in;

/// Entity record held by the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntity {
    /// Store identifier.
    pub id: EntityId,
    /// Committed name.
    pub name: String,
    /// Ownership under shared-write mode.
    #[serde(default = "default_ownership")]
    pub ownership: Ownership,
    /// Whether an unowned entity may be acquired.
    #[serde(default = "default_true")]
    pub acquirable: bool,
    /// Locked entities refuse every rename.
    #[serde(default)]
    pub locked: bool,
}

impl StoredEntity {
    /// Creates an unlocked entity with no ownership constraints.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ownership: Ownership::SelfOrNone,
            acquirable: true,
            locked: false,
        }
    }
}

const fn default_ownership() -> Ownership {
    Ownership::SelfOrNone
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone)]
struct OpenTransaction {
    id: u64,
    staged: HashMap<EntityId, String>,
}

/// A serialisable entity store kept entirely in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryStore {
    #[serde(default)]
    shared: bool,
    #[serde(default = "default_true")]
    write_access: bool,
    #[serde(default)]
    groups: BTreeMap<GroupingKey, Vec<StoredEntity>>,
    #[serde(skip)]
    open: Option<OpenTransaction>,
    #[serde(skip)]
    transactions_started: u64,
    #[serde(skip)]
    commits: usize,
    #[serde(skip)]
    rollbacks: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            shared: false,
            write_access: true,
            groups: BTreeMap::new(),
            open: None,
            transactions_started: 0,
            commits: 0,
            rollbacks: 0,
        }
    }
}

impl InMemoryStore {
    /// Creates an empty standalone store with write access.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity to `group`.
    #[must_use]
    pub fn with_entity(mut self, group: &str, entity: StoredEntity) -> Self {
        self.insert(GroupingKey::from(group), entity);
        self
    }

    /// Adds an entity to `group`.
    pub fn insert(&mut self, group: GroupingKey, entity: StoredEntity) {
        self.groups.entry(group).or_default().push(entity);
    }

    /// Switches shared, concurrent-editing mode on or off.
    pub const fn set_shared(&mut self, shared: bool) {
        self.shared = shared;
    }

    /// Grants or withdraws write access in shared mode.
    pub const fn set_write_access(&mut self, available: bool) {
        self.write_access = available;
    }

    /// Sets the ownership of an entity. Returns false for unknown ids.
    pub fn set_ownership(&mut self, id: EntityId, ownership: Ownership) -> bool {
        self.entity_mut(id)
            .map(|entity| entity.ownership = ownership)
            .is_some()
    }

    /// Makes acquisition of an entity fail. Returns false for unknown ids.
    pub fn refuse_acquisition(&mut self, id: EntityId) -> bool {
        self.entity_mut(id)
            .map(|entity| entity.acquirable = false)
            .is_some()
    }

    /// Locks an entity against renaming. Returns false for unknown ids.
    pub fn lock(&mut self, id: EntityId) -> bool {
        self.entity_mut(id)
            .map(|entity| entity.locked = true)
            .is_some()
    }

    /// Committed name of an entity.
    #[must_use]
    pub fn name_of(&self, id: EntityId) -> Option<&str> {
        self.locate(id).map(|(_, entity)| entity.name.as_str())
    }

    /// Grouping keys known to the store.
    pub fn groups(&self) -> impl Iterator<Item = &GroupingKey> {
        self.groups.keys()
    }

    /// Number of transactions committed since the store was created or loaded.
    #[must_use]
    pub const fn commits(&self) -> usize {
        self.commits
    }

    /// Number of transactions rolled back since the store was created or loaded.
    #[must_use]
    pub const fn rollbacks(&self) -> usize {
        self.rollbacks
    }

    /// Returns true while a transaction is open.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.open.is_some()
    }

    fn locate(&self, id: EntityId) -> Option<(&GroupingKey, &StoredEntity)> {
        self.groups.iter().find_map(|(key, entities)| {
            entities
                .iter()
                .find(|entity| entity.id == id)
                .map(|entity| (key, entity))
        })
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut StoredEntity> {
        self.groups
            .values_mut()
            .flat_map(|entities| entities.iter_mut())
            .find(|entity| entity.id == id)
    }

    fn open_transaction(&self, handle: &TransactionHandle) -> Option<&OpenTransaction> {
        self.open.as_ref().filter(|open| open.id == handle.id())
    }

    fn check_name(
        &self,
        group: &GroupingKey,
        id: EntityId,
        new_name: &str,
        staged: &HashMap<EntityId, String>,
    ) -> Result<(), StoreRejection> {
        if new_name.trim().is_empty() {
            return Err(StoreRejection::invalid_name("name must not be blank"));
        }
        let reserved = reserved_characters_in(new_name);
        if !reserved.is_empty() {
            let listed: String = reserved.into_iter().collect();
            return Err(StoreRejection::invalid_name(format!(
                "name contains reserved characters '{listed}'"
            )));
        }

        let taken = self
            .groups
            .get(group)
            .into_iter()
            .flatten()
            .filter(|other| other.id != id)
            .any(|other| {
                let effective = staged.get(&other.id).unwrap_or(&other.name);
                effective == new_name
            });
        if taken {
            return Err(StoreRejection::invalid_name(format!(
                "'{new_name}' is already used in '{group}'"
            )));
        }
        Ok(())
    }
}

impl EntityStore for InMemoryStore {
    fn enumerate(&self, key: &GroupingKey) -> Result<Vec<StoreEntity>, StoreError> {
        let entities = self.groups.get(key).ok_or_else(|| StoreError::Enumerate {
            key: key.clone(),
            message: "no such group".to_owned(),
        })?;
        let mut listed: Vec<StoreEntity> = entities
            .iter()
            .map(|entity| StoreEntity::new(entity.id, entity.name.clone()))
            .collect();
        listed.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(listed)
    }

    fn is_shared_write_mode(&self) -> bool {
        self.shared
    }

    fn is_write_access_available(&self) -> bool {
        self.write_access
    }

    fn ownership_of(&self, id: EntityId) -> Ownership {
        self.locate(id)
            .map_or(Ownership::SelfOrNone, |(_, entity)| entity.ownership)
    }

    fn acquire(&mut self, id: EntityId) -> Result<(), StoreError> {
        let entity = self.entity_mut(id).ok_or_else(|| StoreError::Acquire {
            id,
            message: "unknown entity".to_owned(),
        })?;
        match entity.ownership {
            Ownership::OwnedByOther => Err(StoreError::Acquire {
                id,
                message: "owned by another user".to_owned(),
            }),
            Ownership::Unowned if !entity.acquirable => Err(StoreError::Acquire {
                id,
                message: "acquisition refused".to_owned(),
            }),
            Ownership::Unowned | Ownership::SelfOrNone => {
                entity.ownership = Ownership::SelfOrNone;
                Ok(())
            }
        }
    }

    fn begin_transaction(&mut self, label: &str) -> Result<TransactionHandle, StoreError> {
        if self.open.is_some() {
            return Err(StoreError::TransactionStart {
                label: label.to_owned(),
                message: "another transaction is already open".to_owned(),
            });
        }
        if self.shared && !self.write_access {
            return Err(StoreError::TransactionStart {
                label: label.to_owned(),
                message: "write access is unavailable".to_owned(),
            });
        }
        self.transactions_started += 1;
        let id = self.transactions_started;
        self.open = Some(OpenTransaction {
            id,
            staged: HashMap::new(),
        });
        Ok(TransactionHandle::new(id, label))
    }

    fn set_name(
        &mut self,
        transaction: &TransactionHandle,
        id: EntityId,
        new_name: &str,
    ) -> Result<(), StoreRejection> {
        let Some(open) = self.open_transaction(transaction) else {
            return Err(StoreRejection::other("transaction is not open"));
        };
        let Some((group, entity)) = self.locate(id) else {
            return Err(StoreRejection::other(format!("unknown entity {id}")));
        };
        if entity.locked {
            return Err(StoreRejection::cannot_modify(format!(
                "'{}' is locked",
                entity.name
            )));
        }
        self.check_name(group, id, new_name, &open.staged)?;

        if let Some(open) = self.open.as_mut() {
            open.staged.insert(id, new_name.to_owned());
        }
        Ok(())
    }

    fn commit(&mut self, transaction: &TransactionHandle) -> Result<(), StoreError> {
        if self.open_transaction(transaction).is_none() {
            return Err(StoreError::TransactionCommit {
                message: format!("transaction {} is not open", transaction.id()),
            });
        }
        let Some(open) = self.open.take() else {
            return Err(StoreError::TransactionCommit {
                message: "no open transaction".to_owned(),
            });
        };
        for (id, name) in open.staged {
            if let Some(entity) = self.entity_mut(id) {
                entity.name = name;
            }
        }
        self.commits += 1;
        Ok(())
    }

    fn rollback(&mut self, transaction: &TransactionHandle) -> Result<(), StoreError> {
        if self.open_transaction(transaction).is_none() {
            return Err(StoreError::TransactionRollback {
                message: format!("transaction {} is not open", transaction.id()),
            });
        }
        self.open = None;
        self.rollbacks += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_entity("Walls", StoredEntity::new(2, "Generic"))
            .with_entity("Walls", StoredEntity::new(1, "Basic"))
            .with_entity("Doors", StoredEntity::new(3, "Single"))
    }

    #[rstest]
    fn enumerates_group_sorted_by_name(store: InMemoryStore) {
        let listed = store
            .enumerate(&GroupingKey::from("Walls"))
            .expect("group exists");
        let names: Vec<_> = listed.iter().map(|entity| entity.name.as_str()).collect();
        assert_eq!(names, vec!["Basic", "Generic"]);
    }

    #[rstest]
    fn unknown_group_is_an_enumeration_error(store: InMemoryStore) {
        let error = store
            .enumerate(&GroupingKey::from("Roofs"))
            .expect_err("group is missing");
        assert!(matches!(error, StoreError::Enumerate { .. }));
    }

    #[rstest]
    fn names_become_visible_only_on_commit(mut store: InMemoryStore) {
        let tx = store.begin_transaction("rename").expect("transaction opens");
        store
            .set_name(&tx, EntityId::new(1), "Exterior")
            .expect("rename staged");
        assert_eq!(store.name_of(EntityId::new(1)), Some("Basic"));

        store.commit(&tx).expect("commit succeeds");
        assert_eq!(store.name_of(EntityId::new(1)), Some("Exterior"));
        assert_eq!(store.commits(), 1);
        assert!(!store.in_transaction());
    }

    #[rstest]
    fn rollback_discards_staged_names(mut store: InMemoryStore) {
        let tx = store.begin_transaction("rename").expect("transaction opens");
        store
            .set_name(&tx, EntityId::new(1), "Exterior")
            .expect("rename staged");
        store.rollback(&tx).expect("rollback succeeds");

        assert_eq!(store.name_of(EntityId::new(1)), Some("Basic"));
        assert_eq!(store.rollbacks(), 1);
    }

    #[rstest]
    fn rejects_names_taken_in_the_same_group(mut store: InMemoryStore) {
        let tx = store.begin_transaction("rename").expect("transaction opens");
        let rejection = store
            .set_name(&tx, EntityId::new(1), "Generic")
            .expect_err("name is taken");
        assert!(matches!(rejection, StoreRejection::InvalidName { .. }));

        store
            .set_name(&tx, EntityId::new(1), "Single")
            .expect("names in other groups do not clash");
    }

    #[rstest]
    fn staged_names_count_towards_uniqueness(mut store: InMemoryStore) {
        let tx = store.begin_transaction("rename").expect("transaction opens");
        store
            .set_name(&tx, EntityId::new(2), "Partition")
            .expect("first rename staged");
        let rejection = store
            .set_name(&tx, EntityId::new(1), "Partition")
            .expect_err("staged name is taken");
        assert!(matches!(rejection, StoreRejection::InvalidName { .. }));
        store
            .set_name(&tx, EntityId::new(1), "Generic")
            .expect("released name can be reused");
    }

    #[rstest]
    fn swapping_two_names_is_refused_write_by_write(mut store: InMemoryStore) {
        let tx = store.begin_transaction("swap").expect("transaction opens");
        let first = store
            .set_name(&tx, EntityId::new(1), "Generic")
            .expect_err("'Generic' is still held");
        let second = store
            .set_name(&tx, EntityId::new(2), "Basic")
            .expect_err("'Basic' is still held");

        assert!(matches!(first, StoreRejection::InvalidName { .. }));
        assert!(matches!(second, StoreRejection::InvalidName { .. }));
    }

    #[rstest]
    #[case("   ")]
    #[case("a/b")]
    fn enforces_its_own_naming_rules(mut store: InMemoryStore, #[case] name: &str) {
        let tx = store.begin_transaction("rename").expect("transaction opens");
        let rejection = store
            .set_name(&tx, EntityId::new(1), name)
            .expect_err("name breaks store rules");
        assert!(matches!(rejection, StoreRejection::InvalidName { .. }));
    }

    #[rstest]
    fn locked_entities_cannot_be_modified(mut store: InMemoryStore) {
        assert!(store.lock(EntityId::new(3)));
        let tx = store.begin_transaction("rename").expect("transaction opens");
        let rejection = store
            .set_name(&tx, EntityId::new(3), "Double")
            .expect_err("entity is locked");
        assert!(matches!(rejection, StoreRejection::CannotModify { .. }));
    }

    #[rstest]
    fn only_one_transaction_may_be_open(mut store: InMemoryStore) {
        let _tx = store.begin_transaction("first").expect("transaction opens");
        let error = store
            .begin_transaction("second")
            .expect_err("nested transaction refused");
        assert!(matches!(error, StoreError::TransactionStart { .. }));
    }

    #[rstest]
    fn acquisition_follows_ownership_table(mut store: InMemoryStore) {
        assert!(store.set_ownership(EntityId::new(1), Ownership::Unowned));
        assert!(store.set_ownership(EntityId::new(2), Ownership::Unowned));
        assert!(store.refuse_acquisition(EntityId::new(2)));

        store.acquire(EntityId::new(1)).expect("unowned entity acquired");
        assert_eq!(store.ownership_of(EntityId::new(1)), Ownership::SelfOrNone);
        assert!(store.acquire(EntityId::new(2)).is_err());
        assert_eq!(store.ownership_of(EntityId::new(2)), Ownership::Unowned);
    }

    #[test]
    fn deserialises_catalogue_with_defaults() {
        let json = r#"{
            "shared": true,
            "groups": {
                "Walls": [
                    { "id": 1, "name": "Basic" },
                    { "id": 2, "name": "Generic", "ownership": "owned_by_other" }
                ]
            }
        }"#;
        let store: InMemoryStore = serde_json::from_str(json).expect("catalogue parses");

        assert!(store.is_shared_write_mode());
        assert!(store.is_write_access_available());
        assert_eq!(store.ownership_of(EntityId::new(2)), Ownership::OwnedByOther);
        assert_eq!(store.name_of(EntityId::new(1)), Some("Basic"));
    }
}
