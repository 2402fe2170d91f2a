//! Affine geotransform model.

/// The six-coefficient affine geotransform of a raster grid.
///
/// Coefficients follow the usual GeoTIFF/GDAL ordering: the world coordinate
/// of the grid origin (top-left corner for north-up rasters), the signed pixel
/// sizes, and the two rotation terms. For north-up rasters `pixel_height` is
/// negative and both rotation terms are zero.
///
/// The rotation terms are read and carried through, but only used additively
/// when extrapolating the far corner of the grid. Fully rotated rasters are
/// not supported and will index incorrectly; this is a known limitation of the
/// axis-aligned bounds model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// World X of the grid origin (coefficient 0).
    pub origin_x: f64,
    /// Signed pixel width (coefficient 1). Never zero.
    pub pixel_width: f64,
    /// Row rotation term (coefficient 2). Usually zero.
    pub row_rotation: f64,
    /// World Y of the grid origin (coefficient 3).
    pub origin_y: f64,
    /// Column rotation term (coefficient 4). Usually zero.
    pub col_rotation: f64,
    /// Signed pixel height (coefficient 5). Negative for north-up rasters.
    /// Never zero.
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Build a north-up, axis-aligned transform with no rotation.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        }
    }

    /// Build a transform from the six coefficients in container order.
    pub fn from_coefficients(c: [f64; 6]) -> Self {
        Self {
            origin_x: c[0],
            pixel_width: c[1],
            row_rotation: c[2],
            origin_y: c[3],
            col_rotation: c[4],
            pixel_height: c[5],
        }
    }

    /// The six coefficients in container order.
    pub fn coefficients(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Both pixel sizes are nonzero, so coordinate-to-pixel division is defined.
    pub fn is_valid(&self) -> bool {
        self.pixel_width != 0.0 && self.pixel_height != 0.0
    }

    /// World coordinate of the grid corner opposite the origin, with the
    /// rotation terms applied additively.
    pub fn far_corner(&self, rows: usize, columns: usize) -> (f64, f64) {
        let x = self.origin_x + columns as f64 * self.pixel_width + rows as f64 * self.row_rotation;
        let y = self.origin_y + columns as f64 * self.col_rotation + rows as f64 * self.pixel_height;
        (x, y)
    }

    /// Shift the origin to the pixel at `(row, column)`, keeping pixel sizes
    /// and rotation terms. Used when cutting a window out of a grid.
    pub fn shifted(&self, row: i64, column: i64) -> Self {
        Self {
            origin_x: self.origin_x + column as f64 * self.pixel_width,
            origin_y: self.origin_y + row as f64 * self.pixel_height,
            ..*self
        }
    }
}
