//! Statistics notifications for front-ends.

use std::sync::mpsc::Sender;

/// Counts summarising a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameStatistics {
    /// Items in the batch.
    pub total: usize,
    /// Items the operator has selected.
    pub selected: usize,
    /// Selected items that will change and are valid.
    pub will_change: usize,
    /// Selected items currently marked invalid.
    pub invalid: usize,
}

impl RenameStatistics {
    /// Returns true when a commit would do something and nothing blocks it.
    #[must_use]
    pub const fn permits_commit(&self) -> bool {
        self.will_change > 0 && self.invalid == 0
    }
}

/// Receives fresh statistics after every recomputation.
pub trait StatisticsObserver {
    /// Called with the statistics of the batch as it now stands.
    fn statistics_changed(&self, statistics: &RenameStatistics);
}

impl StatisticsObserver for Sender<RenameStatistics> {
    fn statistics_changed(&self, statistics: &RenameStatistics) {
        // A dropped receiver only means nobody is listening any more.
        if self.send(*statistics).is_err() {
            tracing::trace!("statistics receiver dropped");
        }
    }
}
