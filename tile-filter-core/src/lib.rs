//! Core types for filtering slippy-map tiles against a region of interest.
//!
//! A [`Region`] is loaded once from GeoJSON and indexed for repeated
//! queries. A [`TileFilter`] then projects each [`TileCoord`] to its
//! longitude/latitude bounds and keeps the tiles whose bounds intersect the
//! region, boundary contact included.

#![forbid(unsafe_code)]

mod filter;
mod region;
mod tile;

pub use filter::{FilterError, FilterSummary, TileFilter};
pub use region::{Region, RegionError};
pub use tile::TileCoord;
