//! Error types for the raster crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading, writing or addressing raster data.
#[derive(Debug, Error)]
pub enum RasterError {
    /// File does not exist on disk.
    #[error("file '{0}' not found")]
    FileNotFound(PathBuf),

    /// Raster container could not be opened or decoded.
    #[error("failed to open raster: {0}")]
    OpenFailed(String),

    /// Output raster could not be created.
    #[error("failed to create raster: {0}")]
    CreateFailed(String),

    /// No affine geotransform could be read from the container.
    #[error("failed to read raster geotransform")]
    TransformUnavailable,

    /// Requested band index exceeds the raster's band count.
    #[error("invalid raster band {requested} (raster has {available})")]
    InvalidBand {
        /// Requested 1-based band index.
        requested: usize,
        /// Number of bands actually present.
        available: usize,
    },

    /// Sample read outside the raster grid.
    #[error("failed to read sample at band {band}, row {row}, column {column}")]
    ReadFailed {
        /// 1-based band index.
        band: usize,
        /// Row offset.
        row: usize,
        /// Column offset.
        column: usize,
    },

    /// Sample write outside the raster grid.
    #[error("failed to write sample at band {band}, row {row}, column {column}")]
    WriteFailed {
        /// 1-based band index.
        band: usize,
        /// Row offset.
        row: usize,
        /// Column offset.
        column: usize,
    },
}
