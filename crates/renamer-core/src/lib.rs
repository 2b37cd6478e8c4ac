//! Batch rename engine.
//!
//! The `renamer-core` crate turns an operator's transform settings into
//! candidate names for a batch of store entities, decides which candidates
//! are safe, and commits the safe ones against the store in a single
//! transaction that tolerates per-item rejection.
//!
//! # Architecture
//!
//! Data flows leaves first:
//!
//! - [`transform`] compiles a [`TransformSpec`] (find/replace with optional
//!   `?`/`*` wildcards, prefix, suffix) and applies it to each name.
//! - [`validation`] checks one candidate for emptiness and reserved characters.
//! - [`conflict`] marks candidates that would collide with another name the
//!   batch will hold after commit.
//! - [`RenameSet`] owns the batch, reruns the three passes on every operator
//!   event and publishes [`RenameStatistics`] to observers.
//! - [`ApplyCoordinator`] writes accepted renames inside one store transaction
//!   and returns a [`CommitReport`].
//!
//! The store itself is reached only through the [`EntityStore`] trait.
//! [`InMemoryStore`] is a serialisable implementation for tests and the CLI.
//!
//! # Example
//!
//! ```rust,no_run
//! use renamer_core::{
//!     ApplyCoordinator, GroupingKey, InMemoryStore, RenameSet, StoredEntity, TransformSpec,
//! };
//!
//! let mut store = InMemoryStore::new()
//!     .with_entity("Walls", StoredEntity::new(1, "Basic Wall"));
//! let mut batch = RenameSet::load(&store, GroupingKey::from("Walls")).expect("group exists");
//! batch.set_transform_spec(TransformSpec::new().with_find("Wall", "Partition"));
//! let report = batch
//!     .commit(&mut store, &ApplyCoordinator::new("Batch rename"))
//!     .expect("commit succeeds");
//! assert_eq!(report.committed_count(), 1);
//! ```

pub mod apply;
pub mod conflict;
pub mod item;
pub mod memory;
pub mod rename_set;
pub mod store;
pub mod transform;
pub mod validation;

#[cfg(test)]
mod tests;

pub use self::apply::{
    ApplyCoordinator, CommitError, CommitReport, FailureReason, ItemDetail, ItemOutcome,
    RenameRequest, SkipReason,
};
pub use self::item::RenameItem;
pub use self::memory::{InMemoryStore, StoredEntity};
pub use self::rename_set::{
    RenameEvent, RenameSet, RenameSetError, RenameSetState, RenameStatistics, StatisticsObserver,
};
pub use self::store::{
    EntityId, EntityStore, GroupingKey, Ownership, StoreEntity, StoreError, StoreRejection,
    TransactionHandle,
};
pub use self::transform::{CompiledTransform, TransformDiagnostic, TransformSpec};
pub use self::validation::{InvalidReason, Validity};
