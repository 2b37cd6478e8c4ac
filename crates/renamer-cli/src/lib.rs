//! Command-line runtime for the batch rename engine.
//!
//! The runtime splits configuration flags from the command tokens, loads
//! [`renamer_config::Config`], installs telemetry, and then drives a
//! [`renamer_core::RenameSet`] against a JSON catalogue that stands in for the
//! entity store. `preview` renders the batch; `apply` commits it through the
//! [`renamer_core::ApplyCoordinator`] and saves the catalogue. IO streams and
//! the configuration loader can be substituted so tests exercise the same
//! path as the binary.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use renamer_config::Config;
use renamer_core::{
    ApplyCoordinator, EntityId, GroupingKey, InMemoryStore, RenameSet, RenameSetError,
};

pub mod catalogue;
mod cli;
mod config;
mod errors;
mod output;
pub mod telemetry;

pub use catalogue::CatalogueError;
pub use cli::OutputFormat;
pub use telemetry::TelemetryError;

use cli::{BatchArgs, Cli, CliCommand};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
pub(crate) use errors::AppError;
use output::{write_preview, write_report};

/// Bundles the output streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(&split.command_arguments) {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = write!(io.stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(io.stderr, "{}", AppError::CliUsage(error));
            return ExitCode::FAILURE;
        }
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| execute(&cli.command, &config, io));

    match result {
        Ok(exit_code) => exit_code,
        Err(error) => {
            tracing::error!(%error, "command failed");
            let _ = writeln!(io.stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W, E>(
    command: &CliCommand,
    config: &Config,
    io: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError>
where
    W: Write,
    E: Write,
{
    telemetry::initialise(config)?;

    let args = command.batch();
    let mut store = catalogue::load(&args.catalogue)?;
    let batch = prepare_batch(&store, args, io)?;

    match command {
        CliCommand::Preview(_) => {
            write_preview(&mut *io.stdout, &batch, args.format)?;
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Apply(_) => {
            let coordinator = ApplyCoordinator::new(config.transaction_label());
            apply(batch, &mut store, &coordinator, args, io)
        }
    }
}

fn prepare_batch<W, E>(
    store: &InMemoryStore,
    args: &BatchArgs,
    io: &mut IoStreams<'_, W, E>,
) -> Result<RenameSet, AppError>
where
    W: Write,
    E: Write,
{
    let mut batch = RenameSet::load(store, GroupingKey::new(args.group.as_str()))?;
    for raw in &args.excluded {
        let id = EntityId::new(*raw);
        if batch.item(id).is_none() {
            writeln!(io.stderr, "warning: no entity {id} in group '{}'", args.group)?;
        }
        batch.set_selection(id, false);
    }
    batch.set_transform_spec(args.transform_spec());
    if let Some(diagnostic) = batch.diagnostic() {
        writeln!(io.stderr, "warning: {diagnostic}")?;
    }
    Ok(batch)
}

fn apply<W, E>(
    mut batch: RenameSet,
    store: &mut InMemoryStore,
    coordinator: &ApplyCoordinator,
    args: &BatchArgs,
    io: &mut IoStreams<'_, W, E>,
) -> Result<ExitCode, AppError>
where
    W: Write,
    E: Write,
{
    match batch.commit(store, coordinator) {
        Ok(report) => {
            catalogue::save(&args.catalogue, store)?;
            write_report(&mut *io.stdout, &report, args.format)?;
            if report.failed_count() == 0 {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Err(RenameSetError::Reload { report, source }) => {
            catalogue::save(&args.catalogue, store)?;
            write_report(&mut *io.stdout, &report, args.format)?;
            Err(RenameSetError::Reload { report, source }.into())
        }
        Err(error @ RenameSetError::Blocked { .. }) => {
            write_preview(&mut *io.stdout, &batch, args.format)?;
            Err(error.into())
        }
        Err(error) => Err(error.into()),
    }
}
