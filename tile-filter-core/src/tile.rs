//! Slippy-map tile coordinates and their geographic bounds.

use std::f64::consts::PI;
use std::fmt;
use std::io::{self, Write};

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, Serializer};

/// A tile in the web-mercator pyramid.
///
/// Tiles travel through the filter as JSON arrays `[x, y, z]`, which is also
/// the serde representation of this type.
///
/// # Examples
///
/// ```
/// use tile_filter_core::TileCoord;
///
/// # fn main() -> Result<(), serde_json::Error> {
/// let tile = TileCoord::from_json_line("[1, 0, 1]")?;
/// assert_eq!(tile, TileCoord::new(1, 0, 1));
///
/// let bounds = tile.bounds();
/// assert_eq!(bounds.min().x, 0.0);
/// assert_eq!(bounds.max().x, 180.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32, u8)", into = "(u32, u32, u8)")]
pub struct TileCoord {
    /// Tile column, counted eastwards from the antimeridian.
    pub x: u32,
    /// Tile row, counted southwards from the northern edge of the projection.
    pub y: u32,
    /// Zoom level; the grid at level `z` holds `2^z × 2^z` tiles.
    pub z: u8,
}

impl TileCoord {
    /// Construct a tile from its column, row and zoom level.
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Parse a single input line holding a JSON array `[x, y, z]`.
    ///
    /// Surrounding whitespace is ignored. Anything other than exactly three
    /// non-negative integers (with `z` at most 255) is rejected.
    ///
    /// # Errors
    /// Returns the [`serde_json::Error`] describing why the line is not a
    /// tile.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Write the tile as `[x, y, z]` followed by a newline.
    ///
    /// Array elements are separated by `", "` so the output matches what
    /// `mercantile` and `json.dumps` emit for the same tiles.
    ///
    /// # Errors
    /// Propagates failures from the underlying writer.
    pub fn write_json_line<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        let mut serializer = Serializer::with_formatter(&mut *writer, SpacedArrayFormatter);
        self.serialize(&mut serializer).map_err(io::Error::from)?;
        writer.write_all(b"\n")
    }

    /// Geographic bounds of the tile as a longitude/latitude rectangle.
    ///
    /// The rectangle spans `west..=east` on the x axis and `south..=north` on
    /// the y axis. Columns and rows beyond the grid for the zoom level are
    /// projected with the same formula rather than rejected.
    #[must_use]
    pub fn bounds(&self) -> Rect<f64> {
        let west = tile_longitude(f64::from(self.x), self.z);
        let east = tile_longitude(next_index(self.x), self.z);
        let north = tile_latitude(f64::from(self.y), self.z);
        let south = tile_latitude(next_index(self.y), self.z);
        Rect::new(Coord { x: west, y: south }, Coord { x: east, y: north })
    }
}

impl From<(u32, u32, u8)> for TileCoord {
    fn from((x, y, z): (u32, u32, u8)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<TileCoord> for (u32, u32, u8) {
    fn from(tile: TileCoord) -> Self {
        (tile.x, tile.y, tile.z)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Compact JSON with a space after each array separator.
struct SpacedArrayFormatter;

impl Formatter for SpacedArrayFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "the far edge of a tile is the next index, which may exceed u32"
)]
fn next_index(index: u32) -> f64 {
    f64::from(index) + 1.0
}

fn tiles_per_axis(z: u8) -> f64 {
    f64::from(z).exp2()
}

#[expect(
    clippy::float_arithmetic,
    reason = "tile projection is defined in floating-point degrees"
)]
fn tile_longitude(x: f64, z: u8) -> f64 {
    x / tiles_per_axis(z) * 360.0 - 180.0
}

#[expect(
    clippy::float_arithmetic,
    reason = "inverse spherical-mercator projection"
)]
fn tile_latitude(y: f64, z: u8) -> f64 {
    let n = PI * (1.0 - 2.0 * y / tiles_per_axis(z));
    n.sinh().atan().to_degrees()
}
