//! # terradem-raster
//!
//! In-memory raster model and GeoTIFF container I/O for the terradem crates.
//!
//! This crate is the raster storage collaborator for the rest of the
//! workspace: it knows how to open a GeoTIFF into a [`Raster`] (dimensions,
//! affine geotransform, per-band samples, declared nodata, projection
//! descriptor), how to write one back out with its georeferencing tags, and
//! how to shrink a grid with the median resampling kernel. Everything
//! geographic (coordinates, bounds checks, elevation queries) lives in the
//! `terradem` crate on top of this one.
//!
//! ## Example
//!
//! ```no_run
//! use terradem_raster::Raster;
//!
//! let raster = Raster::open("dem_data/n48w123.tif")?;
//! println!("{} rows x {} columns", raster.rows(), raster.columns());
//! let value = raster.sample(1, 0, 0)?;
//! # Ok::<(), terradem_raster::RasterError>(())
//! ```

mod error;
mod geotiff;
mod raster;
mod resample;
mod transform;

pub use error::RasterError;
pub use raster::{Raster, RasterSource, SampleType, DEFAULT_NODATA_FALLBACK};
pub use resample::{median, resample_median};
pub use transform::GeoTransform;

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;
