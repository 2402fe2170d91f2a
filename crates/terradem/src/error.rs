//! Error types for the DEM crate.

use thiserror::Error;

/// Errors that can occur when constructing DEMs or densifying paths.
#[derive(Debug, Error)]
pub enum DemError {
    /// Latitude or longitude outside the valid geographic range.
    #[error("invalid coordinates ({latitude}:{longitude})")]
    InvalidCoordinate {
        /// Offending latitude.
        latitude: f64,
        /// Offending longitude.
        longitude: f64,
    },

    /// A path needs at least two points to densify.
    #[error("insufficient points for a path: got {found}, need at least 2")]
    InsufficientPoints {
        /// Number of points supplied.
        found: usize,
    },

    /// Error from the raster storage collaborator.
    #[error(transparent)]
    Raster(#[from] terradem_raster::RasterError),
}
