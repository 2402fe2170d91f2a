//! Grid geometry: coordinates, bounds and fractional pixel indexing.

use terradem_raster::GeoTransform;

use crate::{DemError, Result};

/// A geographic coordinate in decimal degrees.
///
/// Fields are private so [`Coordinate::new`] stays the only public entry
/// point; a value that exists is in range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside lat [-90, 90] and
    /// lon [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DemError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a coordinate from values already known to be in range, such as
    /// interpolants between two validated coordinates.
    pub(crate) fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in decimal degrees, positive north.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees, positive east.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Fractional pixel address of a coordinate, or the out-of-bounds marker.
///
/// Callers branch on the variant instead of comparing against a sentinel
/// value smuggled through the nodata channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PixelIndex {
    /// The coordinate falls inside the grid at this fractional address.
    Found {
        /// Fractional row, 0 at the north edge, increasing south.
        row: f64,
        /// Fractional column, 0 at the west edge, increasing east.
        column: f64,
    },
    /// The coordinate is outside the grid bounds.
    OutOfBounds,
}

/// The derived geometry of one raster grid: extent, resolution and the
/// coordinate-to-pixel mapping.
///
/// Works in whatever planar units the geotransform is expressed in; for
/// geographic rasters that is degrees, for projected ones meters. The grid is
/// treated as north-up and axis-aligned.
#[derive(Debug, Clone, Copy)]
pub struct GridGeometry {
    /// Row count.
    pub rows: usize,
    /// Column count.
    pub columns: usize,
    /// West edge.
    pub x_min: f64,
    /// East edge.
    pub x_max: f64,
    /// South edge.
    pub y_min: f64,
    /// North edge.
    pub y_max: f64,
    /// Signed east-west cell size.
    pub x_resolution: f64,
    /// Signed north-south cell size (negative for north-up grids).
    pub y_resolution: f64,
}

impl GridGeometry {
    /// Derive the geometry of a `rows x columns` grid under `transform`.
    pub fn new(transform: &GeoTransform, rows: usize, columns: usize) -> Self {
        let (far_x, far_y) = transform.far_corner(rows, columns);
        Self {
            rows,
            columns,
            x_min: transform.origin_x,
            x_max: far_x,
            y_min: far_y,
            y_max: transform.origin_y,
            x_resolution: transform.pixel_width,
            y_resolution: transform.pixel_height,
        }
    }

    /// Containment test, half-open on the north and east edges: a point
    /// exactly on the south or west edge is inside, a point exactly on the
    /// north or east edge is not.
    pub fn contains(&self, y: f64, x: f64) -> bool {
        y >= self.y_min && y < self.y_max && x >= self.x_min && x < self.x_max
    }

    /// Map a world coordinate to its fractional pixel address.
    pub fn to_pixel(&self, y: f64, x: f64) -> PixelIndex {
        if self.contains(y, x) {
            PixelIndex::Found {
                row: (y - self.y_max) / self.y_resolution,
                column: (x - self.x_min) / self.x_resolution,
            }
        } else {
            PixelIndex::OutOfBounds
        }
    }

    /// Map a world coordinate to the integer cell read by single-sample
    /// queries: round half away from zero, then clamp an index that landed
    /// exactly on the row/column count back by one.
    pub fn nearest_cell(&self, y: f64, x: f64) -> Option<(usize, usize)> {
        match self.to_pixel(y, x) {
            PixelIndex::Found { row, column } => {
                let mut r = row.round() as usize;
                let mut c = column.round() as usize;
                if r == self.rows {
                    r -= 1;
                }
                if c == self.columns {
                    c -= 1;
                }
                Some((r, c))
            }
            PixelIndex::OutOfBounds => None,
        }
    }

    /// World coordinate of a fractional pixel address (the inverse of
    /// [`GridGeometry::to_pixel`]).
    pub fn to_world(&self, row: f64, column: f64) -> (f64, f64) {
        (
            self.y_max + row * self.y_resolution,
            self.x_min + column * self.x_resolution,
        )
    }
}

/// The four corner coordinates of a grid, derived once per raster.
///
/// Invariant: the rectangle is axis-aligned. NW/NE share a latitude, SW/SE
/// share a latitude, NW/SW share a longitude, NE/SE share a longitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// North-west corner.
    pub nw: Coordinate,
    /// North-east corner.
    pub ne: Coordinate,
    /// South-west corner.
    pub sw: Coordinate,
    /// South-east corner.
    pub se: Coordinate,
}

impl Bounds {
    /// Build the corner set of a geographic grid. Fails with
    /// `InvalidCoordinate` when the grid extends outside the geographic
    /// range, which catches projected rasters handed to the geographic API.
    pub fn from_geometry(geometry: &GridGeometry) -> Result<Self> {
        Ok(Self {
            nw: Coordinate::new(geometry.y_max, geometry.x_min)?,
            ne: Coordinate::new(geometry.y_max, geometry.x_max)?,
            sw: Coordinate::new(geometry.y_min, geometry.x_min)?,
            se: Coordinate::new(geometry.y_min, geometry.x_max)?,
        })
    }

    /// Containment test, half-open on the north and east edges.
    pub fn within(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.sw.latitude()
            && latitude < self.ne.latitude()
            && longitude >= self.sw.longitude()
            && longitude < self.ne.longitude()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_grid() -> GridGeometry {
        // Bounds NW = (10, 0), SE = (0, 10), 10x10 cells of 1 degree.
        GridGeometry::new(&GeoTransform::north_up(0.0, 10.0, 1.0, -1.0), 10, 10)
    }

    #[test]
    fn test_coordinate_range_validation() {
        assert!(Coordinate::new(45.0, -122.0).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(matches!(
            Coordinate::new(90.5, 0.0),
            Err(DemError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            Coordinate::new(0.0, -180.5),
            Err(DemError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_coordinate_accessors() {
        let c = Coordinate::new(47.5, -122.25).unwrap();
        assert_eq!(c.latitude(), 47.5);
        assert_eq!(c.longitude(), -122.25);
    }

    #[test]
    fn test_within_excludes_north_and_east_edges() {
        let bounds = Bounds::from_geometry(&unit_grid()).unwrap();
        assert!(!bounds.within(10.0, 5.0)); // north edge out
        assert!(bounds.within(0.0, 5.0)); // south edge in
        assert!(!bounds.within(5.0, 10.0)); // east edge out
        assert!(bounds.within(5.0, 0.0)); // west edge in
        assert!(bounds.within(9.999, 9.999));
        assert!(!bounds.within(-0.001, 5.0));
    }

    #[test]
    fn test_to_pixel_fractional_address() {
        let g = unit_grid();
        match g.to_pixel(9.5, 0.5) {
            PixelIndex::Found { row, column } => {
                assert_relative_eq!(row, 0.5);
                assert_relative_eq!(column, 0.5);
            }
            PixelIndex::OutOfBounds => panic!("point is inside the grid"),
        }
    }

    #[test]
    fn test_to_pixel_out_of_bounds() {
        let g = unit_grid();
        assert_eq!(g.to_pixel(10.0, 5.0), PixelIndex::OutOfBounds);
        assert_eq!(g.to_pixel(5.0, -0.1), PixelIndex::OutOfBounds);
    }

    #[test]
    fn test_to_pixel_round_trip_within_half_pixel() {
        let g = GridGeometry::new(
            &GeoTransform::north_up(-123.0, 48.0, 0.01, -0.01),
            100,
            100,
        );
        for &(lat, lon) in &[(47.995, -122.995), (47.5, -122.5), (47.005, -122.005)] {
            match g.to_pixel(lat, lon) {
                PixelIndex::Found { row, column } => {
                    let (back_lat, back_lon) = g.to_world(row, column);
                    assert!((back_lat - lat).abs() <= 0.005);
                    assert!((back_lon - lon).abs() <= 0.005);
                }
                PixelIndex::OutOfBounds => panic!("interior point"),
            }
        }
    }

    #[test]
    fn test_nearest_cell_clamps_boundary() {
        let g = unit_grid();
        // South-west corner is inside; rounding lands on row == rows and is
        // clamped back to the last row.
        assert_eq!(g.nearest_cell(0.0, 0.0), Some((9, 0)));
        // A point just east of center of the last column.
        assert_eq!(g.nearest_cell(9.9, 9.9), Some((0, 9)));
        assert_eq!(g.nearest_cell(10.0, 0.0), None);
    }

    #[test]
    fn test_geometry_of_projected_grid_rejected_as_bounds() {
        // A projected grid in meters cannot form geographic corner coordinates.
        let g = GridGeometry::new(
            &GeoTransform::north_up(500_000.0, 4_100_000.0, 10.0, -10.0),
            100,
            100,
        );
        assert!(matches!(
            Bounds::from_geometry(&g),
            Err(DemError::InvalidCoordinate { .. })
        ));
    }
}
