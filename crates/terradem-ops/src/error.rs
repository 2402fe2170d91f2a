//! Error types for bulk raster operations.

use thiserror::Error;

/// Errors that can occur during bulk raster operations.
#[derive(Debug, Error)]
pub enum OpsError {
    /// An operation over a set of rasters received none.
    #[error("no input rasters given")]
    EmptyInput,

    /// Clip window does not overlap the source raster.
    #[error("invalid clip region: clipped window is {width}x{height}")]
    InvalidClipRegion {
        /// Clamped window width (may be zero or negative before the check).
        width: i64,
        /// Clamped window height.
        height: i64,
    },

    /// Error from the raster storage collaborator.
    #[error(transparent)]
    Raster(#[from] terradem_raster::RasterError),
}
