//! Command-line argument definitions for the `renamer` binary.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use renamer_core::TransformSpec;

/// Output format for previews and commit reports.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for terminals.
    #[default]
    Human,
    /// A single JSON document.
    Json,
}

/// Batch renaming for entities held in a JSON catalogue.
#[derive(Parser, Debug)]
#[command(name = "renamer", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Operation to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Structured subcommands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Shows the candidate name and status of every entity in the group.
    Preview(BatchArgs),
    /// Commits the accepted renames and saves the catalogue.
    ///
    /// The catalogue checks each write against the names it holds at that
    /// moment, so swapping two names fails for both entities.
    Apply(BatchArgs),
}

impl CliCommand {
    pub(crate) const fn batch(&self) -> &BatchArgs {
        match self {
            Self::Preview(args) | Self::Apply(args) => args,
        }
    }
}

/// Arguments shared by `preview` and `apply`.
#[derive(Args, Debug, Clone)]
pub(crate) struct BatchArgs {
    /// JSON catalogue standing in for the entity store.
    #[arg(long, value_name = "FILE")]
    pub(crate) catalogue: Utf8PathBuf,
    /// Group whose entities form the batch.
    #[arg(long, value_name = "KEY")]
    pub(crate) group: String,
    /// Text to find; `?` and `*` act as wildcards.
    #[arg(long, default_value = "")]
    pub(crate) find: String,
    /// Replacement for every match of `--find`.
    #[arg(long, default_value = "")]
    pub(crate) replace: String,
    /// Text prepended to every name that does not already start with it.
    #[arg(long, default_value = "")]
    pub(crate) prefix: String,
    /// Text appended to every name that does not already end with it.
    #[arg(long, default_value = "")]
    pub(crate) suffix: String,
    /// Matches `--find` without regard to case.
    #[arg(long)]
    pub(crate) ignore_case: bool,
    /// Leaves the entity with this id out of the batch. Repeatable.
    #[arg(long = "exclude", value_name = "ID")]
    pub(crate) excluded: Vec<u64>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub(crate) format: OutputFormat,
}

impl BatchArgs {
    pub(crate) fn transform_spec(&self) -> TransformSpec {
        TransformSpec::new()
            .with_find(self.find.as_str(), self.replace.as_str())
            .with_prefix(self.prefix.as_str())
            .with_suffix(self.suffix.as_str())
            .ignoring_case(self.ignore_case)
    }
}
