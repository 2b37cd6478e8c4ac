//! The in-memory batch and its recomputation pass.
//!
//! A [`RenameSet`] holds one [`RenameItem`] per store entity. Every change of
//! transform or selection re-derives candidates, validity and statistics in a
//! single synchronous pass, then notifies subscribed observers.

mod observer;

use std::collections::HashMap;

use thiserror::Error;

pub use observer::{RenameStatistics, StatisticsObserver};

use crate::apply::{ApplyCoordinator, CommitError, CommitReport, RenameRequest};
use crate::conflict;
use crate::item::RenameItem;
use crate::store::{EntityId, EntityStore, GroupingKey, StoreEntity, StoreError};
use crate::transform::{CompiledTransform, TransformDiagnostic, TransformSpec};
use crate::validation::{self, Validity};

/// Errors raised while loading or committing a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameSetError {
    /// The store could not list the requested group.
    #[error("failed to load '{key}': {source}")]
    Load {
        /// Group that was requested.
        key: GroupingKey,
        /// Store failure.
        #[source]
        source: StoreError,
    },
    /// The store reported the same identifier twice.
    #[error("store reported entity {id} more than once")]
    DuplicateId {
        /// Repeated identifier.
        id: EntityId,
    },
    /// The store reported an entity without a name.
    #[error("store reported entity {id} with an empty name")]
    EmptyName {
        /// Offending identifier.
        id: EntityId,
    },
    /// Commit was requested while nothing would change or items are invalid.
    #[error("commit blocked: {will_change} item(s) would change, {invalid} invalid")]
    Blocked {
        /// Accepted items at the time of the request.
        will_change: usize,
        /// Invalid selected items at the time of the request.
        invalid: usize,
    },
    /// The coordinator aborted the batch.
    #[error(transparent)]
    Commit {
        /// Batch-level failure.
        #[from]
        source: CommitError,
    },
    /// The batch committed but the store could not be re-read afterwards.
    #[error("renames committed but reload failed: {source}")]
    Reload {
        /// Report of the commit that did take effect.
        report: Box<CommitReport>,
        /// Why the fresh listing could not be turned into a batch.
        #[source]
        source: Box<RenameSetError>,
    },
}

/// Lifecycle of a [`RenameSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameSetState {
    /// Freshly loaded; every candidate equals its original name.
    Loaded,
    /// Recomputed for the current transform and selection.
    Ready,
    /// A commit is in progress.
    Committing,
}

/// A change requested by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameEvent {
    /// Selects or deselects one item. Unknown ids are ignored.
    SetSelection {
        /// Target item.
        id: EntityId,
        /// New selection.
        selected: bool,
    },
    /// Selects every item.
    SelectAll,
    /// Deselects every item.
    DeselectAll,
    /// Replaces the transform configuration.
    SetTransform(TransformSpec),
}

/// One batch of renameable entities.
pub struct RenameSet {
    key: GroupingKey,
    items: Vec<RenameItem>,
    index: HashMap<EntityId, usize>,
    spec: TransformSpec,
    diagnostic: Option<TransformDiagnostic>,
    statistics: RenameStatistics,
    state: RenameSetState,
    observers: Vec<Box<dyn StatisticsObserver>>,
}

impl std::fmt::Debug for RenameSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenameSet")
            .field("key", &self.key)
            .field("items", &self.items)
            .field("spec", &self.spec)
            .field("statistics", &self.statistics)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl RenameSet {
    /// Builds a batch from entities already listed by a store.
    ///
    /// # Errors
    ///
    /// Returns [`RenameSetError::DuplicateId`] or [`RenameSetError::EmptyName`]
    /// when the listing is inconsistent.
    pub fn from_entities(
        key: GroupingKey,
        entities: Vec<StoreEntity>,
    ) -> Result<Self, RenameSetError> {
        let (items, index) = build_items(entities)?;
        let mut set = Self {
            key,
            items,
            index,
            spec: TransformSpec::default(),
            diagnostic: None,
            statistics: RenameStatistics::default(),
            state: RenameSetState::Loaded,
            observers: Vec::new(),
        };
        set.statistics = set.tally();
        Ok(set)
    }

    /// Loads the entities under `key` from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`RenameSetError::Load`] when enumeration fails, and the
    /// [`RenameSet::from_entities`] errors for inconsistent listings.
    pub fn load<S>(store: &S, key: GroupingKey) -> Result<Self, RenameSetError>
    where
        S: EntityStore + ?Sized,
    {
        let entities = enumerate(store, &key)?;
        let set = Self::from_entities(key, entities)?;
        tracing::info!(group = %set.key, items = set.items.len(), "batch loaded");
        Ok(set)
    }

    /// Replaces every item with a fresh listing from `store`.
    ///
    /// The transform resets to the identity and every item starts selected.
    /// Observers stay subscribed and receive the new statistics. On error the
    /// batch is left as it was.
    ///
    /// # Errors
    ///
    /// Same as [`RenameSet::load`].
    pub fn reload<S>(&mut self, store: &S) -> Result<RenameStatistics, RenameSetError>
    where
        S: EntityStore + ?Sized,
    {
        let entities = enumerate(store, &self.key)?;
        let (items, index) = build_items(entities)?;
        self.items = items;
        self.index = index;
        self.spec = TransformSpec::default();
        self.diagnostic = None;
        self.state = RenameSetState::Loaded;
        self.statistics = self.tally();
        self.notify();
        tracing::debug!(group = %self.key, items = self.items.len(), "batch reloaded");
        Ok(self.statistics)
    }

    /// Applies an operator event and returns the resulting statistics.
    pub fn apply(&mut self, event: RenameEvent) -> RenameStatistics {
        match event {
            RenameEvent::SetSelection { id, selected } => self.set_selection(id, selected),
            RenameEvent::SelectAll => self.select_all(),
            RenameEvent::DeselectAll => self.deselect_all(),
            RenameEvent::SetTransform(spec) => self.set_transform_spec(spec),
        }
    }

    /// Selects or deselects one item; unknown ids leave the batch untouched.
    pub fn set_selection(&mut self, id: EntityId, selected: bool) -> RenameStatistics {
        let Some(&position) = self.index.get(&id) else {
            tracing::debug!(%id, "selection change for unknown entity ignored");
            return self.statistics;
        };
        if let Some(item) = self.items.get_mut(position) {
            item.set_selected(selected);
        }
        self.revalidate()
    }

    /// Selects every item.
    pub fn select_all(&mut self) -> RenameStatistics {
        self.items.iter_mut().for_each(|item| item.set_selected(true));
        self.revalidate()
    }

    /// Deselects every item.
    pub fn deselect_all(&mut self) -> RenameStatistics {
        self.items.iter_mut().for_each(|item| item.set_selected(false));
        self.revalidate()
    }

    /// Installs `spec` and recomputes every candidate.
    pub fn set_transform_spec(&mut self, spec: TransformSpec) -> RenameStatistics {
        let compiled = CompiledTransform::compile(&spec);
        for item in &mut self.items {
            let candidate = compiled.apply(item.original_name());
            item.set_candidate(candidate);
        }
        self.diagnostic = compiled.diagnostic().cloned();
        self.spec = spec;
        self.revalidate()
    }

    /// Statistics of the last recomputation.
    #[must_use]
    pub const fn statistics(&self) -> RenameStatistics {
        self.statistics
    }

    /// Returns true when at least one item will change and none is invalid.
    #[must_use]
    pub const fn can_commit(&self) -> bool {
        self.statistics.permits_commit()
    }

    /// Items in store enumeration order.
    #[must_use]
    pub fn items(&self) -> &[RenameItem] {
        &self.items
    }

    /// Looks up one item.
    #[must_use]
    pub fn item(&self, id: EntityId) -> Option<&RenameItem> {
        self.index.get(&id).and_then(|&position| self.items.get(position))
    }

    /// Grouping key the batch was loaded with.
    #[must_use]
    pub const fn key(&self) -> &GroupingKey {
        &self.key
    }

    /// Transform currently in effect.
    #[must_use]
    pub const fn transform_spec(&self) -> &TransformSpec {
        &self.spec
    }

    /// Diagnostic from the last transform compilation, if the pattern was unusable.
    #[must_use]
    pub const fn diagnostic(&self) -> Option<&TransformDiagnostic> {
        self.diagnostic.as_ref()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RenameSetState {
        self.state
    }

    /// Renames that would be sent to the store, in batch order.
    #[must_use]
    pub fn accepted_requests(&self) -> Vec<RenameRequest> {
        self.items
            .iter()
            .filter(|item| item.is_accepted())
            .map(|item| RenameRequest::new(item.id(), item.original_name(), item.candidate_name()))
            .collect()
    }

    /// Registers an observer for statistics notifications.
    pub fn subscribe(&mut self, observer: Box<dyn StatisticsObserver>) {
        self.observers.push(observer);
    }

    /// Commits the accepted items and reloads the batch from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`RenameSetError::Blocked`] when [`RenameSet::can_commit`] is
    /// false, [`RenameSetError::Commit`] when the coordinator aborts the batch
    /// (the set returns to `Ready`), and [`RenameSetError::Reload`] when the
    /// commit succeeded but the store could not be re-read.
    pub fn commit<S>(
        &mut self,
        store: &mut S,
        coordinator: &ApplyCoordinator,
    ) -> Result<CommitReport, RenameSetError>
    where
        S: EntityStore + ?Sized,
    {
        if !self.can_commit() {
            return Err(RenameSetError::Blocked {
                will_change: self.statistics.will_change,
                invalid: self.statistics.invalid,
            });
        }

        self.state = RenameSetState::Committing;
        let requests = self.accepted_requests();
        let report = match coordinator.commit(&requests, store) {
            Ok(report) => report,
            Err(source) => {
                self.state = RenameSetState::Ready;
                return Err(source.into());
            }
        };

        if let Err(error) = self.reload(&*store) {
            self.state = RenameSetState::Ready;
            return Err(RenameSetError::Reload {
                report: Box::new(report),
                source: Box::new(error),
            });
        }
        Ok(report)
    }

    fn revalidate(&mut self) -> RenameStatistics {
        for item in &mut self.items {
            let validity = if item.has_pending_edit() {
                validation::validate(item.candidate_name())
            } else {
                Validity::Valid
            };
            item.set_validity(validity);
        }
        conflict::resolve(&mut self.items);

        self.state = RenameSetState::Ready;
        self.statistics = self.tally();
        self.notify();
        self.statistics
    }

    fn tally(&self) -> RenameStatistics {
        self.items.iter().fold(
            RenameStatistics {
                total: self.items.len(),
                ..RenameStatistics::default()
            },
            |mut stats, item| {
                if item.is_selected() {
                    stats.selected += 1;
                    if item.is_invalid() {
                        stats.invalid += 1;
                    }
                }
                if item.is_accepted() {
                    stats.will_change += 1;
                }
                stats
            },
        )
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.statistics_changed(&self.statistics);
        }
    }
}

fn enumerate<S>(store: &S, key: &GroupingKey) -> Result<Vec<StoreEntity>, RenameSetError>
where
    S: EntityStore + ?Sized,
{
    store
        .enumerate(key)
        .map_err(|source| RenameSetError::Load {
            key: key.clone(),
            source,
        })
}

fn build_items(
    entities: Vec<StoreEntity>,
) -> Result<(Vec<RenameItem>, HashMap<EntityId, usize>), RenameSetError> {
    let mut index = HashMap::with_capacity(entities.len());
    let mut items = Vec::with_capacity(entities.len());
    for entity in entities {
        if entity.name.is_empty() {
            return Err(RenameSetError::EmptyName { id: entity.id });
        }
        if index.insert(entity.id, items.len()).is_some() {
            return Err(RenameSetError::DuplicateId { id: entity.id });
        }
        items.push(RenameItem::from(entity));
    }
    Ok((items, index))
}
