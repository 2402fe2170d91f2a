//! # terradem-ops
//!
//! Bulk geometric operations over GeoTIFF rasters: median-compositing merge,
//! pixel-window clip, extent-preserving resample, bounding-box coverage
//! scans, and a metadata-level WGS84 reproject.
//!
//! Every operation takes inputs as [`terradem_raster::RasterSource`] (a file
//! path or a raster the caller already holds) and writes its output as a new
//! GeoTIFF at a caller-supplied destination. Setup problems (no inputs, empty
//! clip window) are hard errors; nothing is retried and no partial output is
//! meaningful on failure.

mod clip;
mod coverage;
mod error;
mod merge;
mod reproject;
mod resample;

pub use clip::clip;
pub use coverage::coverage;
pub use error::OpsError;
pub use merge::{merge, MedianPolicy};
pub use reproject::{reproject, WGS84_WKT};
pub use resample::resample;

/// Result type for bulk raster operations.
pub type Result<T> = std::result::Result<T, OpsError>;
