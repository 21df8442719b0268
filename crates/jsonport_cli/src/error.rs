// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line errors.

use jsonport_import::ImportError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for the command line front end
pub type CliResult<T> = Result<T, CliError>;

/// Errors that end a command line run
#[derive(Debug, Error)]
pub enum CliError {
    /// Input path does not exist
    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// A `--select` asset could not be created
    #[error("Cannot select {path}: unknown class {class}")]
    Selection {
        /// Requested class
        class: String,
        /// Requested content path
        path: String,
    },

    /// Settings or import failure
    #[error(transparent)]
    Import(#[from] ImportError),

    /// RON dump failure
    #[error("Failed to write dump: {0}")]
    Dump(#[from] ron::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
