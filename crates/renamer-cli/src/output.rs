//! Rendering of previews and commit reports.

use std::io::Write;

use renamer_core::{CommitReport, RenameItem, RenameSet, RenameStatistics};
use serde::Serialize;

use crate::AppError;
use crate::cli::OutputFormat;

/// Status shown for one item in a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ItemStatus {
    Unchanged,
    Rename,
    Excluded,
    Empty,
    IllegalCharacters,
    Duplicate,
}

impl ItemStatus {
    pub(crate) fn of(item: &RenameItem) -> Self {
        use renamer_core::InvalidReason;

        if !item.is_selected() {
            return Self::Excluded;
        }
        match item.invalid_reason() {
            Some(InvalidReason::Empty) => Self::Empty,
            Some(InvalidReason::IllegalCharacters) => Self::IllegalCharacters,
            Some(InvalidReason::Duplicate) => Self::Duplicate,
            None if item.will_change() => Self::Rename,
            None => Self::Unchanged,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Rename => "rename",
            Self::Excluded => "excluded",
            Self::Empty => "empty",
            Self::IllegalCharacters => "illegal_characters",
            Self::Duplicate => "duplicate",
        }
    }
}

#[derive(Serialize)]
struct PreviewItem<'a> {
    id: u64,
    original: &'a str,
    candidate: &'a str,
    status: ItemStatus,
}

#[derive(Serialize)]
struct Statistics {
    total: usize,
    selected: usize,
    will_change: usize,
    invalid: usize,
}

impl From<RenameStatistics> for Statistics {
    fn from(stats: RenameStatistics) -> Self {
        Self {
            total: stats.total,
            selected: stats.selected,
            will_change: stats.will_change,
            invalid: stats.invalid,
        }
    }
}

#[derive(Serialize)]
struct PreviewDocument<'a> {
    group: &'a str,
    items: Vec<PreviewItem<'a>>,
    statistics: Statistics,
    can_commit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<String>,
}

pub(crate) fn write_preview<W: Write>(
    out: &mut W,
    batch: &RenameSet,
    format: OutputFormat,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            let document = PreviewDocument {
                group: batch.key().as_str(),
                items: batch
                    .items()
                    .iter()
                    .map(|item| PreviewItem {
                        id: item.id().get(),
                        original: item.original_name(),
                        candidate: item.candidate_name(),
                        status: ItemStatus::of(item),
                    })
                    .collect(),
                statistics: batch.statistics().into(),
                can_commit: batch.can_commit(),
                diagnostic: batch.diagnostic().map(ToString::to_string),
            };
            serde_json::to_writer_pretty(&mut *out, &document)?;
            writeln!(out)?;
        }
        OutputFormat::Human => {
            let width = batch
                .items()
                .iter()
                .map(|item| item.original_name().chars().count())
                .max()
                .unwrap_or(0);
            for item in batch.items() {
                writeln!(
                    out,
                    "{:>6}  {:<width$}  ->  {}  [{}]",
                    item.id().get(),
                    item.original_name(),
                    item.candidate_name(),
                    ItemStatus::of(item).label(),
                )?;
            }
            let stats = batch.statistics();
            writeln!(
                out,
                "{} items, {} selected, {} will change, {} invalid",
                stats.total, stats.selected, stats.will_change, stats.invalid
            )?;
        }
    }
    Ok(())
}

pub(crate) fn write_report<W: Write>(
    out: &mut W,
    report: &CommitReport,
    format: OutputFormat,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Human => {
            for request in report.committed() {
                writeln!(
                    out,
                    "renamed {}: {} -> {}",
                    request.id, request.current_name, request.new_name
                )?;
            }
            for detail in report.skipped() {
                writeln!(out, "skipped {}: {} ({})", detail.id, detail.name, detail.reason)?;
            }
            for detail in report.failed() {
                writeln!(
                    out,
                    "failed {}: {} -> {} ({})",
                    detail.id, detail.name, detail.requested_name, detail.reason
                )?;
            }
            writeln!(out, "{report}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use renamer_core::{
        EntityId, FailureReason, GroupingKey, ItemOutcome, RenameRequest, SkipReason, StoreEntity,
        TransformSpec,
    };

    use super::*;

    fn batch() -> RenameSet {
        let mut batch = RenameSet::from_entities(
            GroupingKey::from("Walls"),
            vec![
                StoreEntity::new(1, "Basic Wall"),
                StoreEntity::new(2, "Generic"),
                StoreEntity::new(3, "Curtain Wall"),
            ],
        )
        .expect("valid listing");
        batch.set_transform_spec(TransformSpec::new().with_find("Wall", "Partition"));
        batch.set_selection(EntityId::new(3), false);
        batch
    }

    fn render_preview(format: OutputFormat) -> String {
        let mut out = Vec::new();
        write_preview(&mut out, &batch(), format).expect("preview renders");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn human_preview_lists_every_item_with_status() {
        let text = render_preview(OutputFormat::Human);
        assert!(text.contains("Basic Wall    ->  Basic Partition  [rename]"));
        assert!(text.contains("Generic       ->  Generic  [unchanged]"));
        assert!(text.contains("[excluded]"));
        assert!(text.ends_with("3 items, 2 selected, 1 will change, 0 invalid\n"));
    }

    #[test]
    fn json_preview_carries_statistics() {
        let text = render_preview(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["group"], "Walls");
        assert_eq!(value["statistics"]["will_change"], 1);
        assert_eq!(value["items"][2]["status"], "excluded");
        assert_eq!(value["can_commit"], true);
        assert!(value.get("diagnostic").is_none());
    }

    #[test]
    fn human_report_lists_outcomes_and_summary() {
        let mut report = CommitReport::default();
        report.record(
            RenameRequest::new(EntityId::new(1), "A", "B"),
            ItemOutcome::Committed,
        );
        report.record(
            RenameRequest::new(EntityId::new(2), "C", "D"),
            ItemOutcome::Skipped(SkipReason::OwnedElsewhere),
        );
        report.record(
            RenameRequest::new(EntityId::new(3), "E", "F"),
            ItemOutcome::Failed(FailureReason::CannotModify("locked".to_owned())),
        );

        let mut out = Vec::new();
        write_report(&mut out, &report, OutputFormat::Human).expect("report renders");
        let text = String::from_utf8(out).expect("utf8 output");

        assert!(text.contains("renamed 1: A -> B"));
        assert!(text.contains("skipped 2: C (owned by another user)"));
        assert!(text.contains("failed 3: E -> F (cannot modify: locked)"));
        assert!(text.ends_with("1 renamed, 1 skipped, 1 failed\n"));
    }
}
