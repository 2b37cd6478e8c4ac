//! One renameable entity within a batch.

use crate::store::{EntityId, StoreEntity};
use crate::validation::{InvalidReason, Validity};

/// An entity in the batch, with its current candidate name and validity.
///
/// `original_name` is a snapshot taken at load time. The candidate name and
/// validity are owned by the recomputation pass in [`crate::RenameSet`];
/// only selection is operator-controlled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameItem {
    id: EntityId,
    original_name: String,
    candidate_name: String,
    selected: bool,
    validity: Validity,
}

impl RenameItem {
    /// Creates a selected item whose candidate equals its original name.
    #[must_use]
    pub fn new(id: EntityId, original_name: impl Into<String>) -> Self {
        let original_name = original_name.into();
        Self {
            id,
            candidate_name: original_name.clone(),
            original_name,
            selected: true,
            validity: Validity::Valid,
        }
    }

    /// Store identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Name at load time.
    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Name the entity would receive under the current transform.
    #[must_use]
    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    /// Operator selection.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Current validity.
    #[must_use]
    pub const fn validity(&self) -> Validity {
        self.validity
    }

    /// Returns true when the item is invalid.
    #[must_use]
    pub const fn is_invalid(&self) -> bool {
        self.validity.is_invalid()
    }

    /// Reason the item is invalid, if any.
    #[must_use]
    pub const fn invalid_reason(&self) -> Option<InvalidReason> {
        self.validity.reason()
    }

    /// Selected, with a non-empty candidate that differs from the original.
    #[must_use]
    pub fn will_change(&self) -> bool {
        self.selected && !self.candidate_name.is_empty() && self.candidate_name != self.original_name
    }

    /// Selected with a candidate that differs from the original, even if empty.
    ///
    /// These are the items structural validation looks at.
    #[must_use]
    pub fn has_pending_edit(&self) -> bool {
        self.selected && self.candidate_name != self.original_name
    }

    /// Will change and is not invalid; these items are sent to the store.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.will_change() && !self.is_invalid()
    }

    /// Name this item occupies once the batch commits as configured.
    #[must_use]
    pub fn occupied_name(&self) -> &str {
        if self.will_change() {
            &self.candidate_name
        } else {
            &self.original_name
        }
    }

    pub(crate) fn set_candidate(&mut self, candidate: String) {
        self.candidate_name = candidate;
    }

    pub(crate) const fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) const fn set_validity(&mut self, validity: Validity) {
        self.validity = validity;
    }
}

impl From<StoreEntity> for RenameItem {
    fn from(entity: StoreEntity) -> Self {
        Self::new(entity.id, entity.name)
    }
}
