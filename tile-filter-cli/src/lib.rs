//! Command-line interface for filtering tile streams against a GeoJSON region.
//!
//! The binary reads `[x, y, z]` tiles from standard input, one per line, and
//! writes back the tiles whose bounds intersect the region. It is meant to
//! sit in a shell pipeline, e.g. after `mercantile tiles`.
#![forbid(unsafe_code)]

use std::io::{BufRead, BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use log::{debug, info};
use ortho_config::figment::providers::Env;
use ortho_config::{ConfigDiscovery, OrthoConfig, OrthoMergeExt, OrthoResult, sanitized_provider};
use serde::{Deserialize, Serialize};
use tile_filter_core::{Region, TileFilter};

mod error;
mod fs;

pub use error::CliError;

const APP_NAME: &str = "tile-filter";
const ARG_GEOMETRY: &str = "geometry";
const ENV_PREFIX: &str = "TILE_FILTER_";
const ENV_CONFIG_PATH: &str = "TILE_FILTER_CONFIG_PATH";
const ENV_GEOMETRY: &str = "TILE_FILTER_GEOMETRY";

/// Run the tile filter with the current process arguments, environment and
/// standard streams.
pub fn run() -> Result<(), CliError> {
    let args = FilterArgs::try_parse().map_err(CliError::ArgumentParsing)?;
    let config = args.into_config()?;
    let stdin = std::io::stdin().lock();
    let mut stdout = std::io::stdout().lock();
    run_filter_with(&config, stdin, &mut stdout)
}

/// CLI arguments for the tile filter.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "tile-filter",
    about = "Keep the tiles that intersect a GeoJSON region",
    long_about = "Read tile IDs as JSON arrays [x, y, z] from standard input, \
                 one per line, and write to standard output the ones whose \
                 bounds intersect the geometry in the given GeoJSON file. \
                 The geometry path can also come from configuration files or \
                 environment variables.",
    version
)]
#[ortho_config(prefix = "TILE_FILTER")]
struct FilterArgs {
    /// Path to a GeoJSON Geometry, Feature or FeatureCollection.
    #[arg(value_name = "path")]
    #[serde(default)]
    geometry: Option<Utf8PathBuf>,
}

impl FilterArgs {
    fn into_config(self) -> Result<FilterConfig, CliError> {
        let merged = self.merge_config_layers().map_err(CliError::Configuration)?;
        FilterConfig::try_from(merged)
    }

    /// Layer the first discovered configuration file, then `TILE_FILTER_*`
    /// environment variables, then the parsed arguments.
    fn merge_config_layers(&self) -> OrthoResult<Self> {
        let discovery = ConfigDiscovery::builder(APP_NAME)
            .env_var(ENV_CONFIG_PATH)
            .build();
        let file = discovery.load_first()?.unwrap_or_default();
        file.merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(sanitized_provider(self)?)
            .extract()
            .into_ortho_merge()
    }
}

/// Resolved tile filter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterConfig {
    /// Path to the GeoJSON region of interest.
    geometry: Utf8PathBuf,
}

impl FilterConfig {
    fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.geometry, ARG_GEOMETRY)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<FilterArgs> for FilterConfig {
    type Error = CliError;

    fn try_from(args: FilterArgs) -> Result<Self, Self::Error> {
        let geometry = args.geometry.ok_or(CliError::MissingArgument {
            field: ARG_GEOMETRY,
            env: ENV_GEOMETRY,
        })?;
        Ok(Self { geometry })
    }
}

/// Loads the GeoJSON region at `path` and wraps it in a filter.
fn load_filter(path: &Utf8Path) -> Result<TileFilter, CliError> {
    let file = fs::open_utf8_file(path).map_err(|source| CliError::OpenGeometry {
        path: path.to_path_buf(),
        source,
    })?;
    let region =
        Region::from_reader(BufReader::new(file)).map_err(|source| CliError::LoadGeometry {
            path: path.to_path_buf(),
            source,
        })?;
    info!("loaded region from {path}");
    Ok(TileFilter::new(region))
}

fn run_filter_with<R, W>(config: &FilterConfig, input: R, output: &mut W) -> Result<(), CliError>
where
    R: BufRead,
    W: Write + ?Sized,
{
    config.validate_sources()?;
    let filter = load_filter(&config.geometry)?;
    match filter.filter_stream(input, output) {
        Ok(_) => Ok(()),
        // Downstream stopped reading, e.g. `| head`.
        Err(err) if err.is_broken_pipe() => {
            debug!("output closed early: {err}");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<FilterConfig, CliError> {
    let merged = FilterArgs::merge_from_layers(layers).map_err(CliError::from)?;
    FilterConfig::try_from(merged)
}

#[cfg(test)]
mod tests;
