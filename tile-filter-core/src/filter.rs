//! The tile filter and its line-oriented stream loop.

use std::io::{self, BufRead, Write};

use log::{debug, trace};
use thiserror::Error;

use crate::{Region, TileCoord};

/// Errors that stop [`TileFilter::filter_stream`].
#[derive(Debug, Error)]
pub enum FilterError {
    /// Reading an input line failed.
    #[error("failed to read input line {line}: {source}")]
    Read {
        /// 1-based number of the line being read.
        line: usize,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// An input line is not a `[x, y, z]` tile.
    #[error("malformed tile on input line {line}: {source}")]
    Parse {
        /// 1-based number of the offending line.
        line: usize,
        /// Decoder error returned by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Writing or flushing a kept tile failed.
    #[error("failed to write tile: {0}")]
    Write(#[source] io::Error),
}

impl FilterError {
    /// Whether the downstream reader went away while tiles were being written.
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Write(source) if source.kind() == io::ErrorKind::BrokenPipe)
    }
}

/// Counts reported once the input stream is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    /// Tiles parsed from the input.
    pub read: u64,
    /// Tiles written to the output.
    pub kept: u64,
}

impl FilterSummary {
    /// Tiles that were read but not written.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.read.saturating_sub(self.kept)
    }
}

/// Keeps the tiles whose bounds intersect a [`Region`].
///
/// # Examples
///
/// ```
/// use tile_filter_core::{Region, TileCoord, TileFilter};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let region = Region::from_geojson_str(
///     r#"{"type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]}"#,
/// )?;
/// let filter = TileFilter::new(region);
///
/// let input = "[0, 0, 1]\n[1, 0, 5]\n[1, 1, 1]\n";
/// let mut output = Vec::new();
/// let summary = filter.filter_stream(input.as_bytes(), &mut output)?;
///
/// assert_eq!(String::from_utf8(output)?, "[0, 0, 1]\n[1, 1, 1]\n");
/// assert_eq!(summary.dropped(), 1);
/// assert!(!filter.should_keep(&TileCoord::new(1, 0, 5)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TileFilter {
    region: Region,
}

impl TileFilter {
    /// Wrap a prepared region.
    #[must_use]
    pub const fn new(region: Region) -> Self {
        Self { region }
    }

    /// The region tiles are tested against.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Whether the tile's bounds share at least one point with the region.
    #[must_use]
    pub fn should_keep(&self, tile: &TileCoord) -> bool {
        self.region.intersects(&tile.bounds())
    }

    /// Copy the tiles in `input` that intersect the region to `output`.
    ///
    /// Input is consumed one line at a time and kept tiles are written in
    /// input order. The writer is flushed after every kept tile so
    /// downstream consumers see results before the input ends.
    ///
    /// # Errors
    /// Stops at the first unreadable or malformed line, or at the first
    /// failed write. Tiles emitted before the error remain valid.
    pub fn filter_stream<R, W>(&self, input: R, output: &mut W) -> Result<FilterSummary, FilterError>
    where
        R: BufRead,
        W: Write + ?Sized,
    {
        let mut summary = FilterSummary::default();
        for (index, read) in input.lines().enumerate() {
            let line = index.saturating_add(1);
            let raw = read.map_err(|source| FilterError::Read { line, source })?;
            let tile = TileCoord::from_json_line(&raw)
                .map_err(|source| FilterError::Parse { line, source })?;
            summary.read = summary.read.saturating_add(1);

            if self.should_keep(&tile) {
                tile.write_json_line(output).map_err(FilterError::Write)?;
                output.flush().map_err(FilterError::Write)?;
                summary.kept = summary.kept.saturating_add(1);
            } else {
                trace!("dropping tile {tile}");
            }
        }
        debug!(
            "filtered {} tile(s): kept {}, dropped {}",
            summary.read,
            summary.kept,
            summary.dropped()
        );
        Ok(summary)
    }
}
