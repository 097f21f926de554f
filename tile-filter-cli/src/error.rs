//! Error types emitted by the tile filter CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use tile_filter_core::{FilterError, RegionError};

/// Errors emitted by the tile filter CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing <{field}> (pass it as an argument or set {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the GeoJSON file failed.
    #[error("failed to open geometry at {path:?}: {source}")]
    OpenGeometry {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The GeoJSON file could not be turned into a region.
    #[error("failed to load geometry from {path:?}: {source}")]
    LoadGeometry {
        path: Utf8PathBuf,
        #[source]
        source: RegionError,
    },
    /// Reading, parsing or writing the tile stream failed.
    #[error(transparent)]
    Filter(#[from] FilterError),
}
