//! Capability contract expected of the external entity store.
//!
//! The engine never holds live references to store objects. Entities are
//! addressed by an opaque [`EntityId`], and every interaction with the store
//! goes through the narrow [`EntityStore`] trait: enumeration, shared-write
//! queries, ownership, and a single transaction per commit.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque, stable identifier supplied by the store.
///
/// Identifiers are unique per entity and are never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wraps a raw store identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw store identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key selecting which entities are loaded into a batch, such as a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupingKey(String);

impl GroupingKey {
    /// Creates a grouping key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupingKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl fmt::Display for GroupingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entity as reported by [`EntityStore::enumerate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntity {
    /// Store-assigned identifier.
    pub id: EntityId,
    /// Current name held by the store.
    pub name: String,
}

impl StoreEntity {
    /// Builds an entity record.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Ownership state of an entity under shared-write mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    /// Already held by this session, or ownership does not apply.
    SelfOrNone,
    /// Held by another party; it cannot be modified from here.
    OwnedByOther,
    /// Nobody holds it; it must be acquired before modification.
    Unowned,
}

/// Handle to an open store transaction.
#[derive(Debug, PartialEq, Eq)]
pub struct TransactionHandle {
    id: u64,
    label: String,
}

impl TransactionHandle {
    /// Creates a handle. Stores mint these from [`EntityStore::begin_transaction`].
    #[must_use]
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// Store-assigned transaction number.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Label the transaction was opened with.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Authoritative refusal by the store to accept a name for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreRejection {
    /// The name breaks a store-level naming rule.
    #[error("name rejected by the store: {message}")]
    InvalidName {
        /// Store-provided explanation.
        message: String,
    },
    /// The entity cannot be modified (read-only, pinned, or similar).
    #[error("entity cannot be modified: {message}")]
    CannotModify {
        /// Store-provided explanation.
        message: String,
    },
    /// Any other store failure scoped to this entity.
    #[error("{message}")]
    Other {
        /// Store-provided explanation.
        message: String,
    },
}

impl StoreRejection {
    /// Creates an invalid-name rejection.
    #[must_use]
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::InvalidName {
            message: message.into(),
        }
    }

    /// Creates a cannot-modify rejection.
    #[must_use]
    pub fn cannot_modify(message: impl Into<String>) -> Self {
        Self::CannotModify {
            message: message.into(),
        }
    }

    /// Creates an uncategorised rejection.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Store failures that are not scoped to a single rename.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The entity set for a grouping key could not be listed.
    #[error("failed to enumerate entities for '{key}': {message}")]
    Enumerate {
        /// Grouping key that was requested.
        key: GroupingKey,
        /// Store-provided explanation.
        message: String,
    },
    /// Ownership of an entity could not be acquired.
    #[error("failed to acquire entity {id}: {message}")]
    Acquire {
        /// Entity that was requested.
        id: EntityId,
        /// Store-provided explanation.
        message: String,
    },
    /// A transaction could not be opened.
    #[error("failed to start transaction '{label}': {message}")]
    TransactionStart {
        /// Label the transaction was requested with.
        label: String,
        /// Store-provided explanation.
        message: String,
    },
    /// A transaction could not be committed.
    #[error("failed to commit transaction: {message}")]
    TransactionCommit {
        /// Store-provided explanation.
        message: String,
    },
    /// A transaction could not be rolled back.
    #[error("failed to roll back transaction: {message}")]
    TransactionRollback {
        /// Store-provided explanation.
        message: String,
    },
}

/// Narrow capability interface the engine requires from an entity store.
///
/// Every answer is treated as atomic and authoritative. Ownership and lock
/// bookkeeping stay entirely inside the store.
pub trait EntityStore {
    /// Lists the entities under `key`, ordered by name (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Enumerate`] when the store cannot list the group.
    fn enumerate(&self, key: &GroupingKey) -> Result<Vec<StoreEntity>, StoreError>;

    /// Returns true when the store is in shared, concurrent-editing mode.
    fn is_shared_write_mode(&self) -> bool;

    /// Returns true when write access is currently available.
    ///
    /// Only meaningful when [`EntityStore::is_shared_write_mode`] is true.
    fn is_write_access_available(&self) -> bool;

    /// Reports who holds the entity.
    fn ownership_of(&self, id: EntityId) -> Ownership;

    /// Acquires ownership of an unowned entity for this session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Acquire`] when the store refuses the request.
    fn acquire(&mut self, id: EntityId) -> Result<(), StoreError>;

    /// Opens a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TransactionStart`] when no transaction can be opened.
    fn begin_transaction(&mut self, label: &str) -> Result<TransactionHandle, StoreError>;

    /// Writes a new name for an entity inside the open transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreRejection`] describing why the store refused the name.
    fn set_name(
        &mut self,
        transaction: &TransactionHandle,
        id: EntityId,
        new_name: &str,
    ) -> Result<(), StoreRejection>;

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TransactionCommit`] when the store cannot commit.
    fn commit(&mut self, transaction: &TransactionHandle) -> Result<(), StoreError>;

    /// Discards the transaction, including any names written inside it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TransactionRollback`] when the store cannot roll back.
    fn rollback(&mut self, transaction: &TransactionHandle) -> Result<(), StoreError>;
}
