//! Transactional commit of accepted renames against the entity store.
//!
//! The coordinator opens exactly one store transaction per batch, walks every
//! accepted rename in order, and classifies each one as committed, skipped or
//! failed. A skipped or failed item never stops the walk. Once the walk ends
//! the transaction is committed, however many items were refused.
//!
//! Only batch-level problems are errors: write access being unavailable in
//! shared mode, or the store refusing to open or close the transaction. In
//! the first two cases nothing has been written.

mod report;

use thiserror::Error;

pub use report::{
    CommitReport, FailureReason, ItemDetail, ItemOutcome, RenameRequest, SkipReason,
};

use crate::store::{EntityStore, Ownership, StoreError, TransactionHandle};

/// Batch-level failures that abort a commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The store is in shared mode and write access is not available.
    #[error("write access to the shared store is unavailable")]
    WriteAccessUnavailable,
    /// The store refused to open a transaction; nothing was written.
    #[error("could not open the rename transaction: {source}")]
    TransactionStart {
        /// Store failure.
        #[source]
        source: StoreError,
    },
    /// The store refused to commit the transaction and it was rolled back.
    #[error("could not commit the rename transaction: {source}")]
    TransactionCommit {
        /// Store failure.
        #[source]
        source: StoreError,
        /// Outcomes recorded before the commit was refused; none took effect.
        attempted: Box<CommitReport>,
    },
}

/// Drives a batch of renames through one store transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyCoordinator {
    label: String,
}

impl ApplyCoordinator {
    /// Creates a coordinator that labels its transactions with `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Transaction label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Commits `requests` against `store`.
    ///
    /// An empty batch returns an empty report without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError::WriteAccessUnavailable`] or
    /// [`CommitError::TransactionStart`] before anything is written, and
    /// [`CommitError::TransactionCommit`] when the store refuses to close the
    /// transaction.
    pub fn commit<S>(
        &self,
        requests: &[RenameRequest],
        store: &mut S,
    ) -> Result<CommitReport, CommitError>
    where
        S: EntityStore + ?Sized,
    {
        let span = tracing::info_span!("commit", label = %self.label, requested = requests.len());
        let _entered = span.enter();

        if requests.is_empty() {
            tracing::debug!("nothing to commit");
            return Ok(CommitReport::default());
        }

        let shared = store.is_shared_write_mode();
        if shared && !store.is_write_access_available() {
            tracing::warn!("shared store has no write access; batch aborted");
            return Err(CommitError::WriteAccessUnavailable);
        }

        let transaction = store
            .begin_transaction(&self.label)
            .map_err(|source| CommitError::TransactionStart { source })?;

        let mut report = CommitReport::default();
        for request in requests {
            let outcome = attempt(store, &transaction, request, shared);
            log_outcome(request, &outcome);
            report.record(request.clone(), outcome);
        }

        if let Err(source) = store.commit(&transaction) {
            tracing::error!(error = %source, "store refused to commit; rolling back");
            if let Err(rollback) = store.rollback(&transaction) {
                tracing::error!(error = %rollback, "rollback after failed commit also failed");
            }
            return Err(CommitError::TransactionCommit {
                source,
                attempted: Box::new(report),
            });
        }

        tracing::info!(
            committed = report.committed_count(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "batch committed"
        );
        Ok(report)
    }
}

fn attempt<S>(
    store: &mut S,
    transaction: &TransactionHandle,
    request: &RenameRequest,
    shared: bool,
) -> ItemOutcome
where
    S: EntityStore + ?Sized,
{
    if shared {
        match store.ownership_of(request.id) {
            Ownership::OwnedByOther => return ItemOutcome::Skipped(SkipReason::OwnedElsewhere),
            Ownership::Unowned => {
                if let Err(error) = store.acquire(request.id) {
                    tracing::debug!(id = %request.id, %error, "acquisition refused");
                    return ItemOutcome::Skipped(SkipReason::CannotAcquire);
                }
            }
            Ownership::SelfOrNone => {}
        }
    }

    match store.set_name(transaction, request.id, &request.new_name) {
        Ok(()) => ItemOutcome::Committed,
        Err(rejection) => ItemOutcome::Failed(rejection.into()),
    }
}

fn log_outcome(request: &RenameRequest, outcome: &ItemOutcome) {
    match outcome {
        ItemOutcome::Committed => tracing::debug!(
            id = %request.id,
            from = %request.current_name,
            to = %request.new_name,
            "renamed"
        ),
        ItemOutcome::Skipped(reason) => tracing::warn!(
            id = %request.id,
            name = %request.current_name,
            %reason,
            "rename skipped"
        ),
        ItemOutcome::Failed(reason) => tracing::warn!(
            id = %request.id,
            name = %request.current_name,
            to = %request.new_name,
            %reason,
            "rename refused by store"
        ),
    }
}
