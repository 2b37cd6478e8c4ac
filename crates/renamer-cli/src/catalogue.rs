//! JSON catalogue files standing in for the entity store.
//!
//! A catalogue is the serialised form of [`InMemoryStore`]. Saving writes a
//! sibling temporary file and renames it over the original, so a failed write
//! never leaves a truncated catalogue behind.

use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use renamer_core::InMemoryStore;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Failures reading or writing a catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// The catalogue could not be read.
    #[error("failed to read catalogue {path}: {source}")]
    Read {
        /// Catalogue path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
    /// The catalogue is not valid JSON for a store.
    #[error("failed to parse catalogue {path}: {source}")]
    Parse {
        /// Catalogue path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },
    /// The catalogue could not be written.
    #[error("failed to write catalogue {path}: {source}")]
    Write {
        /// Catalogue path.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
}

/// Reads the store held in the catalogue at `path`.
///
/// # Errors
///
/// Returns [`CatalogueError::Read`] or [`CatalogueError::Parse`].
pub fn load(path: &Utf8Path) -> Result<InMemoryStore, CatalogueError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogueError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CatalogueError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Replaces the catalogue at `path` with `store`.
///
/// # Errors
///
/// Returns [`CatalogueError::Write`] when the temporary file cannot be
/// created, written or moved into place.
pub fn save(path: &Utf8Path, store: &InMemoryStore) -> Result<(), CatalogueError> {
    let write_error = |source: io::Error| CatalogueError::Write {
        path: path.to_owned(),
        source,
    };

    let directory = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let mut file = NamedTempFile::new_in(directory).map_err(write_error)?;
    serde_json::to_writer_pretty(&mut file, store).map_err(|error| write_error(error.into()))?;
    file.write_all(b"\n").map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|error| write_error(error.error))?;

    tracing::debug!(%path, "catalogue saved");
    Ok(())
}
