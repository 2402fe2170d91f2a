//! # terradem
//!
//! Nodata-aware elevation queries and grid indexing over GeoTIFF DEM rasters.
//!
//! A [`Dem`] wraps one band of a raster behind a typed altitude interface:
//! geographic coordinates go in, elevations come out, and everything the
//! underlying grid cannot answer (out of bounds, missing data, failed reads)
//! degrades to the dataset's nodata value instead of an error. The fractional
//! indexing and bilinear interpolation live here; container I/O is the
//! `terradem-raster` crate's job.
//!
//! ## Example
//!
//! ```no_run
//! use terradem::{Dem, DemOptions};
//!
//! let dem = Dem::open("dem_data/n48w123.tif", DemOptions::default())?;
//! let elevation = dem.altitude(47.6062, -122.3321);
//! let smooth = dem.interpolated_altitude(47.6062, -122.3321);
//! println!("nearest {elevation} m, interpolated {smooth} m");
//! # Ok::<(), terradem::DemError>(())
//! ```
//!
//! Grids are assumed north-up and axis-aligned. The two rotation terms of the
//! geotransform are carried through bounds extrapolation but not inverted;
//! genuinely rotated rasters will index incorrectly.

mod dem;
mod error;
pub mod geo;
mod path;

pub use dem::{Dem, DemOptions};
pub use error::DemError;
pub use geo::{Bounds, Coordinate, GridGeometry, PixelIndex};
pub use path::coordinates_along_path;

/// Result type for DEM operations.
pub type Result<T> = std::result::Result<T, DemError>;
