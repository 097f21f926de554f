//! Prepared query region built from a GeoJSON document.
//!
//! The region is split into parts (one per polygon, collection member or
//! feature) which are bulk-loaded into an R\*-tree keyed by their bounding
//! rectangles. A query first narrows the parts by envelope and only then runs
//! the exact intersection test, so large multi-polygons stay cheap to query
//! once per tile.

use std::io::Read;

use geo::{BoundingRect, Coord, Geometry, Intersects, Rect};
use geojson::GeoJson;
use log::{info, warn};
use rstar::{AABB, RTree, RTreeObject};
use thiserror::Error;

/// Errors raised while loading a [`Region`].
#[derive(Debug, Error)]
pub enum RegionError {
    /// The GeoJSON source could not be read.
    #[error("failed to read GeoJSON: {0}")]
    Read(#[source] std::io::Error),
    /// The source is not a valid GeoJSON document.
    #[error("invalid GeoJSON: {0}")]
    Parse(#[source] geojson::Error),
    /// A GeoJSON geometry could not be converted into `geo` types.
    #[error("unsupported GeoJSON geometry: {0}")]
    Convert(#[source] geojson::Error),
}

/// One indexed piece of the region.
#[derive(Debug, Clone)]
struct RegionPart {
    geometry: Geometry<f64>,
    envelope: AABB<[f64; 2]>,
}

impl RegionPart {
    fn new(geometry: Geometry<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        let envelope = envelope_of(&rect);
        Some(Self { geometry, envelope })
    }
}

impl RTreeObject for RegionPart {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// An immutable geometry prepared for repeated intersection queries.
///
/// # Examples
///
/// ```
/// use geo::{Coord, Rect};
/// use tile_filter_core::Region;
///
/// # fn main() -> Result<(), tile_filter_core::RegionError> {
/// let region = Region::from_geojson_str(
///     r#"{"type": "Polygon", "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]]}"#,
/// )?;
/// let inside = Rect::new(Coord { x: 2.0, y: 2.0 }, Coord { x: 3.0, y: 3.0 });
/// let outside = Rect::new(Coord { x: 20.0, y: 20.0 }, Coord { x: 30.0, y: 30.0 });
/// assert!(region.intersects(&inside));
/// assert!(!region.intersects(&outside));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Region {
    index: RTree<RegionPart>,
}

impl Region {
    /// Read a GeoJSON document and prepare its geometry.
    ///
    /// # Errors
    /// Returns [`RegionError::Read`] when the reader fails, otherwise the
    /// errors of [`Region::from_geojson_str`].
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, RegionError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw).map_err(RegionError::Read)?;
        Self::from_geojson_str(&raw)
    }

    /// Parse a GeoJSON document and prepare its geometry.
    ///
    /// # Errors
    /// Returns [`RegionError::Parse`] for invalid GeoJSON and
    /// [`RegionError::Convert`] when a geometry cannot be represented.
    pub fn from_geojson_str(raw: &str) -> Result<Self, RegionError> {
        let geojson = raw.parse::<GeoJson>().map_err(RegionError::Parse)?;
        Self::from_geojson(geojson)
    }

    /// Prepare the effective geometry of a parsed GeoJSON document.
    ///
    /// A `Geometry` is used as is, a `Feature` contributes its geometry and a
    /// `FeatureCollection` the geometries of all its features. Features
    /// without a geometry contribute nothing.
    ///
    /// # Errors
    /// Returns [`RegionError::Convert`] when a geometry cannot be represented.
    pub fn from_geojson(geojson: GeoJson) -> Result<Self, RegionError> {
        let geometries: Vec<geojson::Geometry> = match geojson {
            GeoJson::Geometry(geometry) => vec![geometry],
            GeoJson::Feature(feature) => feature.geometry.into_iter().collect(),
            GeoJson::FeatureCollection(collection) => collection
                .features
                .into_iter()
                .filter_map(|feature| feature.geometry)
                .collect(),
        };

        let mut parts = Vec::new();
        for geometry in geometries {
            let converted =
                Geometry::<f64>::try_from(geometry.value).map_err(RegionError::Convert)?;
            collect_parts(converted, &mut parts);
        }
        Ok(Self::from_parts(parts))
    }

    /// Prepare an in-memory geometry.
    #[must_use]
    pub fn from_geometry(geometry: Geometry<f64>) -> Self {
        let mut parts = Vec::new();
        collect_parts(geometry, &mut parts);
        Self::from_parts(parts)
    }

    fn from_parts(parts: Vec<RegionPart>) -> Self {
        let region = Self {
            index: RTree::bulk_load(parts),
        };
        match region.bounding_rect() {
            Some(rect) => info!(
                "prepared region with {} part(s) spanning ({}, {}) to ({}, {})",
                region.len(),
                rect.min().x,
                rect.min().y,
                rect.max().x,
                rect.max().y,
            ),
            None => warn!("region has no geometry; every tile will be dropped"),
        }
        region
    }

    /// Whether the region shares at least one point with `rect`.
    ///
    /// Boundary-only contact counts as an intersection.
    #[must_use]
    pub fn intersects(&self, rect: &Rect<f64>) -> bool {
        let envelope = envelope_of(rect);
        self.index
            .locate_in_envelope_intersecting(&envelope)
            .any(|part| part.geometry.intersects(rect))
    }

    /// Number of indexed parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.size()
    }

    /// Whether the region holds no geometry at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.size() == 0
    }

    /// Smallest rectangle covering every part, or `None` for an empty region.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        if self.is_empty() {
            return None;
        }
        let envelope = self.index.root().envelope();
        let [min_x, min_y] = envelope.lower();
        let [max_x, max_y] = envelope.upper();
        Some(Rect::new(
            Coord { x: min_x, y: min_y },
            Coord { x: max_x, y: max_y },
        ))
    }
}

fn envelope_of(rect: &Rect<f64>) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

/// Flatten collections and multi-polygons so each polygon is indexed alone.
fn collect_parts(geometry: Geometry<f64>, parts: &mut Vec<RegionPart>) {
    match geometry {
        Geometry::GeometryCollection(collection) => {
            for member in collection.0 {
                collect_parts(member, parts);
            }
        }
        Geometry::MultiPolygon(multi) => {
            for polygon in multi.0 {
                collect_parts(Geometry::Polygon(polygon), parts);
            }
        }
        other => parts.extend(RegionPart::new(other)),
    }
}
