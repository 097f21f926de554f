//! Filter slippy-map tiles down to those that intersect a GeoJSON region.
//!
//! This crate re-exports [`tile_filter_core`]; the `tile-filter` binary lives
//! in the `tile-filter-cli` workspace member.
#![forbid(unsafe_code)]

pub use tile_filter_core::*;
