//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use renamer_core::RenameSetError;
use thiserror::Error;

use crate::catalogue::CatalogueError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
    #[error(transparent)]
    Batch(#[from] RenameSetError),
    #[error("failed to serialise output: {0}")]
    Serialise(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}
