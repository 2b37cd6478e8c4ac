//! Per-item classification and the batch summary returned by a commit.

use std::fmt;

use serde::Serialize;

use crate::store::{EntityId, StoreRejection};

/// One rename the coordinator is asked to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRequest {
    /// Entity to rename.
    pub id: EntityId,
    /// Name the entity held when the batch was loaded.
    pub current_name: String,
    /// Name to write.
    pub new_name: String,
}

impl RenameRequest {
    /// Builds a request.
    #[must_use]
    pub fn new(id: EntityId, current_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            id,
            current_name: current_name.into(),
            new_name: new_name.into(),
        }
    }
}

/// Why an entity was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another party holds the entity.
    OwnedElsewhere,
    /// The entity was unowned but could not be acquired.
    CannotAcquire,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OwnedElsewhere => "owned by another user",
            Self::CannotAcquire => "could not be acquired",
        })
    }
}

/// Why the store refused a rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    /// The store's naming rules reject the new name.
    InvalidName(String),
    /// The entity cannot be modified.
    CannotModify(String),
    /// Any other store rejection.
    Other(String),
}

impl From<StoreRejection> for FailureReason {
    fn from(rejection: StoreRejection) -> Self {
        match rejection {
            StoreRejection::InvalidName { message } => Self::InvalidName(message),
            StoreRejection::CannotModify { message } => Self::CannotModify(message),
            StoreRejection::Other { message } => Self::Other(message),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(message) => write!(f, "invalid name: {message}"),
            Self::CannotModify(message) => write!(f, "cannot modify: {message}"),
            Self::Other(message) => f.write_str(message),
        }
    }
}

/// Classification of one attempted rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The store accepted the new name.
    Committed,
    /// The rename was not attempted.
    Skipped(SkipReason),
    /// The store refused the new name.
    Failed(FailureReason),
}

/// A skipped or failed rename together with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDetail<R> {
    /// Entity concerned.
    pub id: EntityId,
    /// Name the entity keeps.
    pub name: String,
    /// Name that was requested.
    pub requested_name: String,
    /// Why the rename did not happen.
    pub reason: R,
}

/// Summary of one commit attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    committed: Vec<RenameRequest>,
    skipped: Vec<ItemDetail<SkipReason>>,
    failed: Vec<ItemDetail<FailureReason>>,
}

impl CommitReport {
    /// Records the outcome for `request`.
    pub fn record(&mut self, request: RenameRequest, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Committed => self.committed.push(request),
            ItemOutcome::Skipped(reason) => self.skipped.push(detail(request, reason)),
            ItemOutcome::Failed(reason) => self.failed.push(detail(request, reason)),
        }
    }

    /// Renames the store accepted.
    #[must_use]
    pub fn committed(&self) -> &[RenameRequest] {
        &self.committed
    }

    /// Renames that were not attempted.
    #[must_use]
    pub fn skipped(&self) -> &[ItemDetail<SkipReason>] {
        &self.skipped
    }

    /// Renames the store refused.
    #[must_use]
    pub fn failed(&self) -> &[ItemDetail<FailureReason>] {
        &self.failed
    }

    /// Number of accepted renames.
    #[must_use]
    pub const fn committed_count(&self) -> usize {
        self.committed.len()
    }

    /// Number of skipped renames.
    #[must_use]
    pub const fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Number of refused renames.
    #[must_use]
    pub const fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Total number of requests classified.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.committed_count() + self.skipped_count() + self.failed_count()
    }

    /// Returns true when nothing was skipped or refused.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

impl fmt::Display for CommitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} renamed, {} skipped, {} failed",
            self.committed_count(),
            self.skipped_count(),
            self.failed_count()
        )
    }
}

fn detail<R>(request: RenameRequest, reason: R) -> ItemDetail<R> {
    ItemDetail {
        id: request.id,
        name: request.current_name,
        requested_name: request.new_name,
        reason,
    }
}
